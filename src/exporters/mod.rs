//! Toolchain exporters.
//!
//! Each configured exporter turns the generated artifact set into one build
//! toolchain's native project description. The saver drives every exporter
//! through this one trait and never learns the concrete family, so a failing
//! exporter loses only its own output.

pub mod linux_make;
pub mod mac_make;
pub mod msvc;

pub use linux_make::LinuxMakeExporter;
pub use mac_make::MacMakeExporter;
pub use msvc::MsvcExporter;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::project::{ExporterKind, ExporterSpec, Project};
use crate::util::config::UserConfig;
use crate::util::fs;

/// A build toolchain slipway can emit native project files for.
pub trait ToolchainExporter {
    /// Human-readable toolchain name, used in progress output.
    fn name(&self) -> &str;

    /// Preprocessor macro identifying this toolchain in generated guard
    /// chains. Also defined by the emitted native project, so compiled code
    /// takes the matching branch.
    fn identifier_macro(&self) -> &str;

    /// Folder receiving the native project files.
    fn target_folder(&self) -> &Path;

    /// Map a library-root-relative path to the include text generated files
    /// should use for this toolchain.
    fn map_include_path(&self, logical_path: &str) -> String;

    /// Whether shims are handed over with the alternate `.mm` extension.
    fn uses_alternate_source_extension(&self) -> bool {
        false
    }

    /// Record the generated artifacts (paths relative to the target folder)
    /// the native project should reference.
    fn receive_generated_artifacts(&mut self, artifacts: Vec<PathBuf>);

    /// Write the native project description into the target folder.
    fn export(&self, project: &Project) -> Result<()>;
}

/// Instantiate the exporter for one `[[exporters]]` entry.
pub fn create_exporter(
    project: &Project,
    spec: &ExporterSpec,
    config: &UserConfig,
) -> Box<dyn ToolchainExporter> {
    let target_folder = project.exporter_target_folder(spec);
    let include_base = project.include_base_for(spec, config);

    match spec.kind {
        ExporterKind::LinuxMake => Box::new(LinuxMakeExporter::new(target_folder, include_base)),
        ExporterKind::MacMake => Box::new(MacMakeExporter::new(target_folder, include_base)),
        ExporterKind::Msvc => Box::new(MsvcExporter::new(target_folder, include_base)),
    }
}

/// Instantiate every exporter the project declares, in declaration order.
pub fn create_all(project: &Project, config: &UserConfig) -> Vec<Box<dyn ToolchainExporter>> {
    project
        .model()
        .exporters
        .iter()
        .map(|spec| create_exporter(project, spec, config))
        .collect()
}

/// Join an include base with a logical path, in forward-slash form.
pub(crate) fn map_from_base(include_base: &Path, logical_path: &str) -> String {
    fs::forward_slashes(&include_base.join(logical_path))
}

/// Project name reduced to characters that are safe in file names on every
/// supported toolchain.
pub(crate) fn sanitized_stem(project: &Project) -> String {
    project
        .name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Product file name for the project, derived from its name and kind.
pub(crate) fn product_name(project: &Project) -> String {
    let stem = sanitized_stem(project);
    match project.kind() {
        crate::core::project::ProjectKind::Application => stem,
        crate::core::project::ProjectKind::Library => format!("lib{}.a", stem),
        crate::core::project::ProjectKind::AudioPlugin => format!("{}.plugin", stem),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::project::{ProjectKind, ProjectModel};

    fn demo_project(exporters: Vec<ExporterSpec>) -> Project {
        let mut model = ProjectModel::starter("Demo", ProjectKind::Application, "acme");
        model.exporters = exporters;
        Project::from_model(model, PathBuf::from("/p/Slipway.toml")).unwrap()
    }

    #[test]
    fn test_create_all_follows_declaration_order() {
        let project = demo_project(vec![
            ExporterSpec::new(ExporterKind::Msvc),
            ExporterSpec::new(ExporterKind::LinuxMake),
            ExporterSpec::new(ExporterKind::MacMake),
        ]);
        let exporters = create_all(&project, &UserConfig::default());

        let macros: Vec<&str> = exporters.iter().map(|e| e.identifier_macro()).collect();
        assert_eq!(
            macros,
            vec!["SLIPWAY_MSVC", "SLIPWAY_LINUX_MAKE", "SLIPWAY_MAC_MAKE"]
        );
    }

    #[test]
    fn test_only_mac_uses_alternate_extension() {
        let project = demo_project(vec![
            ExporterSpec::new(ExporterKind::LinuxMake),
            ExporterSpec::new(ExporterKind::MacMake),
            ExporterSpec::new(ExporterKind::Msvc),
        ]);
        let exporters = create_all(&project, &UserConfig::default());

        assert!(!exporters[0].uses_alternate_source_extension());
        assert!(exporters[1].uses_alternate_source_extension());
        assert!(!exporters[2].uses_alternate_source_extension());
    }

    #[test]
    fn test_include_mapping_uses_spec_override() {
        let mut spec = ExporterSpec::new(ExporterKind::LinuxMake);
        spec.library_path = Some(PathBuf::from("/opt/acme"));
        let project = demo_project(vec![spec]);
        let exporters = create_all(&project, &UserConfig::default());

        assert_eq!(
            exporters[0].map_include_path("acme_amalgamated.h"),
            "/opt/acme/acme_amalgamated.h"
        );
    }

    #[test]
    fn test_product_name_by_kind() {
        let app = demo_project(vec![]);
        assert_eq!(product_name(&app), "Demo");

        let mut model = ProjectModel::starter("My Lib", ProjectKind::Library, "acme");
        model.exporters.clear();
        let lib = Project::from_model(model, PathBuf::from("/p/Slipway.toml")).unwrap();
        assert_eq!(product_name(&lib), "libMy_Lib.a");
    }
}
