//! Implementation of `slipway targets`: inspect and edit the toolchain
//! targets a project declares.
//!
//! Edits go through `toml_edit` so user formatting and comments in the
//! project file survive.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use toml_edit::{value, ArrayOfTables, DocumentMut, Item, Table};

use crate::core::project::{ExporterKind, Project};
use crate::util::fs;

/// One row of `slipway targets list`.
#[derive(Debug, Serialize)]
pub struct TargetRow {
    /// Machine name, as written in the project file
    pub kind: ExporterKind,

    /// Human-readable toolchain name
    pub name: String,

    /// Folder for the native project files, relative to the project dir
    pub folder: String,
}

/// The targets a project declares, in declaration order.
pub fn list_targets(project: &Project) -> Vec<TargetRow> {
    project
        .model()
        .exporters
        .iter()
        .map(|spec| {
            let folder = spec
                .target_folder
                .clone()
                .unwrap_or_else(|| PathBuf::from(spec.kind.default_target_folder()));
            TargetRow {
                kind: spec.kind,
                name: spec.kind.display_name().to_string(),
                folder: fs::forward_slashes(&folder),
            }
        })
        .collect()
}

/// Append a `[[exporters]]` entry to the project file.
pub fn add_target(
    project_file: &Path,
    kind: ExporterKind,
    folder: Option<&Path>,
) -> Result<()> {
    let mut doc = load_document(project_file)?;

    if declared_kinds(&doc).contains(&kind) {
        bail!(
            "target `{}` is already declared in {}",
            kind,
            project_file.display()
        );
    }

    let mut table = Table::new();
    table["kind"] = value(kind.to_string());
    if let Some(folder) = folder {
        table["target_folder"] = value(fs::forward_slashes(folder));
    }

    let exporters = doc
        .entry("exporters")
        .or_insert(Item::ArrayOfTables(ArrayOfTables::new()));
    match exporters.as_array_of_tables_mut() {
        Some(tables) => tables.push(table),
        None => bail!(
            "`exporters` in {} is not an array of tables",
            project_file.display()
        ),
    }

    store_document(project_file, &doc)
}

/// Remove every `[[exporters]]` entry of the given kind. Returns how many
/// entries were removed.
pub fn remove_target(project_file: &Path, kind: ExporterKind) -> Result<usize> {
    let mut doc = load_document(project_file)?;

    let removed = match doc
        .get_mut("exporters")
        .and_then(Item::as_array_of_tables_mut)
    {
        Some(tables) => {
            let before = tables.len();
            tables.retain(|table| table_kind(table) != Some(kind));
            let removed = before - tables.len();
            if tables.is_empty() {
                doc.remove("exporters");
            }
            removed
        }
        None => 0,
    };

    if removed > 0 {
        store_document(project_file, &doc)?;
    }
    Ok(removed)
}

fn load_document(project_file: &Path) -> Result<DocumentMut> {
    let text = fs::read_to_string(project_file)?;
    text.parse()
        .with_context(|| format!("failed to parse project file: {}", project_file.display()))
}

fn store_document(project_file: &Path, doc: &DocumentMut) -> Result<()> {
    fs::write_string(project_file, &doc.to_string())
}

fn declared_kinds(doc: &DocumentMut) -> Vec<ExporterKind> {
    doc.get("exporters")
        .and_then(Item::as_array_of_tables)
        .map(|tables| tables.iter().filter_map(table_kind).collect())
        .unwrap_or_default()
}

fn table_kind(table: &Table) -> Option<ExporterKind> {
    table
        .get("kind")
        .and_then(Item::as_str)
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::core::project::{ProjectKind, ProjectModel};

    fn write_demo_project(tmp: &TempDir) -> PathBuf {
        let model = ProjectModel::starter("Demo", ProjectKind::Application, "acme");
        let file = tmp.path().join("Slipway.toml");
        std::fs::write(&file, toml::to_string_pretty(&model).unwrap()).unwrap();
        file
    }

    #[test]
    fn test_add_and_list_targets() {
        let tmp = TempDir::new().unwrap();
        let file = write_demo_project(&tmp);

        add_target(&file, ExporterKind::Msvc, None).unwrap();

        let project = Project::load(&file).unwrap();
        let rows = list_targets(&project);
        assert_eq!(rows.last().unwrap().name, "Visual Studio");
        assert_eq!(rows.last().unwrap().folder, "Builds/VisualStudio");
    }

    #[test]
    fn test_add_duplicate_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = write_demo_project(&tmp);

        add_target(&file, ExporterKind::Msvc, None).unwrap();
        let err = add_target(&file, ExporterKind::Msvc, None).unwrap_err();
        assert!(err.to_string().contains("already declared"));
    }

    #[test]
    fn test_add_with_explicit_folder() {
        let tmp = TempDir::new().unwrap();
        let file = write_demo_project(&tmp);

        add_target(&file, ExporterKind::Msvc, Some(Path::new("Out/VS"))).unwrap();

        let project = Project::load(&file).unwrap();
        let spec = project.model().exporters.last().unwrap();
        assert_eq!(spec.target_folder.as_deref(), Some(Path::new("Out/VS")));
    }

    #[test]
    fn test_remove_target() {
        let tmp = TempDir::new().unwrap();
        let file = write_demo_project(&tmp);
        add_target(&file, ExporterKind::Msvc, None).unwrap();

        assert_eq!(remove_target(&file, ExporterKind::Msvc).unwrap(), 1);
        assert_eq!(remove_target(&file, ExporterKind::Msvc).unwrap(), 0);

        let project = Project::load(&file).unwrap();
        assert!(list_targets(&project)
            .iter()
            .all(|row| row.kind != ExporterKind::Msvc));
    }

    #[test]
    fn test_edit_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        let file = write_demo_project(&tmp);
        let mut text = std::fs::read_to_string(&file).unwrap();
        text.insert_str(0, "# hands off\n");
        std::fs::write(&file, text).unwrap();

        add_target(&file, ExporterKind::Msvc, None).unwrap();

        let text = std::fs::read_to_string(&file).unwrap();
        assert!(text.starts_with("# hands off\n"));
    }
}
