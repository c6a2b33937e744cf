//! Implementation of `slipway new` and `slipway init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::project::{Project, ProjectKind, ProjectModel, PROJECT_FILENAME};

/// What `slipway new` should create.
#[derive(Debug, Clone)]
pub struct NewOptions {
    /// Name for the new project
    pub name: String,

    /// What the project builds
    pub kind: ProjectKind,

    /// Name of the library the project is built against
    pub library: String,

    /// Initialize in an existing directory
    pub init: bool,
}

/// Create a new slipway project. Returns the path of the project file.
pub fn new_project(path: &Path, opts: &NewOptions) -> Result<PathBuf> {
    if path.exists() && !opts.init {
        bail!(
            "destination `{}` already exists; use `slipway init` to initialize \
             an existing directory",
            path.display()
        );
    }
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let project_file = path.join(PROJECT_FILENAME);
    if project_file.exists() {
        bail!("`{}` already exists in `{}`", PROJECT_FILENAME, path.display());
    }

    // Running the starter model through validation catches bad names before
    // anything lands on disk.
    let model = ProjectModel::starter(&opts.name, opts.kind, &opts.library);
    let project = Project::from_model(model, project_file.clone())?;

    let text = toml::to_string_pretty(project.model())
        .with_context(|| "failed to serialize starter project")?;
    fs::write(&project_file, text)
        .with_context(|| format!("failed to write {}", PROJECT_FILENAME))?;

    if opts.kind == ProjectKind::Application {
        let src_dir = path.join("Source");
        fs::create_dir_all(&src_dir).with_context(|| "failed to create Source directory")?;

        let main_content = r#"#include "../GeneratedCode/AppHeader.h"

int main (int argc, char* argv[])
{
    return 0;
}
"#;
        fs::write(src_dir.join("Main.cpp"), main_content)
            .with_context(|| "failed to write Source/Main.cpp")?;
    }

    let gitignore = "# Native project files regenerated by `slipway export`\nBuilds/\n";
    fs::write(path.join(".gitignore"), gitignore)?;

    Ok(project_file)
}

/// Initialize a slipway project in an existing directory.
pub fn init_project(path: &Path, opts: &NewOptions) -> Result<PathBuf> {
    let mut opts = opts.clone();
    opts.init = true;
    new_project(path, &opts)
}
