//! `slipway export` command

use std::env;
use std::error::Error as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cli::ExportArgs;
use slipway::ops::{ProjectSaver, SaveError, SaveOptions};
use slipway::util::config::config_for_project;
use slipway::util::diagnostic::{self, suggestions, Diagnostic};
use slipway::{find_project_file, Project, PROJECT_FILENAME};

pub fn execute(args: ExportArgs, no_color: bool) -> Result<()> {
    let color = !no_color;
    let project_file = locate_project(args.project.as_deref(), color)?;
    let mut project = Project::load(&project_file)?;

    let user_config = config_for_project(project.dir());
    let options = SaveOptions {
        verify_model_roundtrip: args.verify_model || user_config.export.verify_model,
        user_config,
    };

    if project.model().exporters.is_empty() {
        let diag = Diagnostic::warning("project declares no build targets")
            .with_suggestion(suggestions::NO_EXPORTERS);
        diagnostic::emit(&diag, color);
    }

    let report = ProjectSaver::new(&mut project, args.save_as).save(&options);

    if !report.success() {
        for error in report.errors() {
            let suggestion = match error {
                SaveError::ToolchainExport { .. } => suggestions::TOOL_MISSING,
                _ => suggestions::EXPORT_FAILED,
            };
            let diag = Diagnostic::error(render_error(error)).with_suggestion(suggestion);
            diagnostic::emit(&diag, color);
        }
        bail!("export failed with {} error(s)", report.errors().len());
    }

    println!(
        "Finished: {} generated file(s) written, {} target(s) exported",
        report.written().len(),
        report.exported().len()
    );

    Ok(())
}

/// Resolve the project file from `--project` or by searching upward from the
/// current directory.
fn locate_project(explicit: Option<&Path>, color: bool) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_dir() => {
            let candidate = path.join(PROJECT_FILENAME);
            if candidate.is_file() {
                Ok(candidate)
            } else {
                bail!("no {} in {}", PROJECT_FILENAME, path.display());
            }
        }
        Some(path) => Ok(path.to_path_buf()),
        None => {
            let cwd = env::current_dir().with_context(|| "failed to get current directory")?;
            match find_project_file(&cwd) {
                Some(path) => Ok(path),
                None => {
                    let diag = Diagnostic::error(format!(
                        "no {} found in {} or any parent directory",
                        PROJECT_FILENAME,
                        cwd.display()
                    ))
                    .with_suggestion(suggestions::NO_PROJECT);
                    diagnostic::emit(&diag, color);
                    bail!("cannot export without a project file");
                }
            }
        }
    }
}

/// Render a save error with its cause chain on one line.
fn render_error(error: &SaveError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    text
}
