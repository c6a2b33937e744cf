//! Implementation of `slipway export`: the project save pipeline.
//!
//! A save regenerates everything derived from the model: the project file
//! itself, the generated sources, and one native build project per declared
//! toolchain. Phases run in a fixed order and each phase only starts if the
//! previous ones recorded no errors; inside the toolchain phase every
//! exporter is attempted so one broken toolchain cannot block the rest. A
//! failed save rolls the project's recorded location back, so a bad save-as
//! leaves the project pointing at its previous file.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::codegen::{headers, ResourceBundle};
use crate::core::plan::ArtifactPlan;
use crate::core::project::{shim_stem, Project, ProjectModel};
use crate::exporters::{self, ToolchainExporter};
use crate::util::config::UserConfig;
use crate::util::fs;

/// One failure recorded during a save.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The model could not be serialized, or did not survive round-trip
    /// verification.
    #[error("failed to save project file {}: {message}", path.display())]
    Serialization { path: PathBuf, message: String },

    /// A file could not be written or removed.
    #[error("failed to update {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One toolchain exporter failed. Others may still have succeeded.
    #[error("exporter `{exporter}` failed: {message}")]
    ToolchainExport { exporter: String, message: String },
}

/// Options for a save run.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Re-parse the serialized project file and compare it against the live
    /// model before anything is written
    pub verify_model_roundtrip: bool,

    /// User-level configuration, consulted for the default library location
    pub user_config: UserConfig,
}

/// What a save run did: files whose content changed, toolchains exported,
/// and every error recorded along the way.
#[derive(Debug, Default)]
pub struct SaveReport {
    errors: Vec<SaveError>,
    written: Vec<PathBuf>,
    exported: Vec<String>,
}

impl SaveReport {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SaveError] {
        &self.errors
    }

    pub fn first_error(&self) -> Option<&SaveError> {
        self.errors.first()
    }

    /// Files whose on-disk content actually changed. A resave of an
    /// unchanged project reports none.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Display names of the toolchains exported without error.
    pub fn exported(&self) -> &[String] {
        &self.exported
    }
}

/// Save `project` in place.
pub fn save_project(project: &mut Project, options: &SaveOptions) -> SaveReport {
    ProjectSaver::new(project, None).save(options)
}

/// Drives one save run over a project.
pub struct ProjectSaver<'a> {
    project: &'a mut Project,
    save_as: Option<PathBuf>,
    report: SaveReport,
}

impl<'a> ProjectSaver<'a> {
    /// A saver for `project`, optionally re-homing it to `save_as`.
    pub fn new(project: &'a mut Project, save_as: Option<PathBuf>) -> ProjectSaver<'a> {
        ProjectSaver {
            project,
            save_as,
            report: SaveReport::default(),
        }
    }

    pub fn save(mut self, options: &SaveOptions) -> SaveReport {
        let old_file = self.project.file().to_path_buf();
        if let Some(new_file) = self.save_as.take() {
            self.project.set_file(new_file);
        }
        tracing::info!("saving project {}", self.project.file().display());

        let bundle = self.collect_resources();
        let plan = ArtifactPlan::compute(
            self.project.linkage_mode(),
            self.project.kind(),
            bundle.file_count(),
        );
        let exporters = exporters::create_all(self.project, &options.user_config);

        if self.report.errors.is_empty() {
            self.persist_model(options);
        }
        if self.report.errors.is_empty() {
            self.write_generated_sources(&plan, &bundle, &exporters, options);
        }
        if self.report.errors.is_empty() {
            self.export_toolchains(&plan, exporters);
        }

        if !self.report.errors.is_empty() {
            self.project.set_file(old_file);
        }
        self.report
    }

    fn record(&mut self, error: SaveError) {
        tracing::debug!("save error: {}", error);
        self.report.errors.push(error);
    }

    fn collect_resources(&mut self) -> ResourceBundle {
        match ResourceBundle::collect(self.project) {
            Ok(bundle) => bundle,
            Err(e) => {
                self.record(SaveError::Io {
                    path: self.project.dir().to_path_buf(),
                    source: io::Error::other(format!("{:#}", e)),
                });
                ResourceBundle::empty()
            }
        }
    }

    /// Serialize the model and write the project file.
    fn persist_model(&mut self, options: &SaveOptions) {
        let path = self.project.file().to_path_buf();
        let text = match toml::to_string_pretty(self.project.model()) {
            Ok(text) => text,
            Err(e) => {
                self.record(SaveError::Serialization {
                    path,
                    message: e.to_string(),
                });
                return;
            }
        };

        if options.verify_model_roundtrip {
            match toml::from_str::<ProjectModel>(&text) {
                Ok(reparsed) if &reparsed == self.project.model() => {}
                Ok(_) => {
                    self.record(SaveError::Serialization {
                        path,
                        message: "model did not survive a serialization round trip".to_string(),
                    });
                    return;
                }
                Err(e) => {
                    self.record(SaveError::Serialization {
                        path,
                        message: format!("serialized model does not parse back: {}", e),
                    });
                    return;
                }
            }
        }

        match fs::write_if_different(&path, text.as_bytes()) {
            Ok(true) => self.report.written.push(path),
            Ok(false) => {}
            Err(source) => self.record(SaveError::Io { path, source }),
        }
    }

    /// Write every generated source the plan calls for and remove the ones
    /// it no longer does.
    fn write_generated_sources(
        &mut self,
        plan: &ArtifactPlan,
        bundle: &ResourceBundle,
        exporters: &[Box<dyn ToolchainExporter>],
        options: &SaveOptions,
    ) {
        let gen_dir = self.project.generated_dir();
        if let Err(e) = fs::ensure_dir(&gen_dir) {
            self.record(SaveError::Io {
                path: gen_dir,
                source: io::Error::other(format!("{:#}", e)),
            });
            return;
        }
        let fallback = self.project.default_include_base(&options.user_config);

        let path = self.project.app_config_file();
        if plan.has_app_config {
            let text = headers::render_app_config(self.project);
            self.write_artifact(&path, &text);
        } else {
            self.delete_artifact(&path);
        }

        let path = self.project.app_header_file();
        if plan.has_app_header {
            let text = headers::render_app_header(self.project, plan, &path, exporters, &fallback);
            self.write_artifact(&path, &text);
        } else {
            self.delete_artifact(&path);
        }

        let header = self.project.resource_header_file();
        let source = self.project.resource_source_file();
        if plan.has_resources {
            tracing::debug!(
                files = bundle.file_count(),
                bytes = bundle.total_size(),
                "embedding resources"
            );
            self.write_artifact(&header, &bundle.render_header(&header));
            self.write_artifact(&source, &bundle.render_source());
        } else {
            self.delete_artifact(&header);
            self.delete_artifact(&source);
        }

        // Both extension twins are written for every shim; each toolchain
        // compiles the one matching its source-file convention.
        let indexes = plan.shim_indexes();
        for &index in &indexes {
            let text = headers::render_source_shim(self.project, index, exporters, &fallback);
            for ext in ["cpp", "mm"] {
                let path = self.project.shim_file(index, ext);
                self.write_artifact(&path, &text);
            }
        }
        self.cleanup_stale_shims(&indexes);

        let path = self.project.plugin_characteristics_file();
        if plan.has_plugin_characteristics {
            if let Some(plugin) = &self.project.model().plugin {
                let text = headers::render_plugin_characteristics(self.project, plugin, &path);
                self.write_artifact(&path, &text);
            }
        } else {
            self.delete_artifact(&path);
        }
    }

    /// Remove shim files from earlier saves whose index (or extension form)
    /// the current plan no longer produces.
    fn cleanup_stale_shims(&mut self, indexes: &[u32]) {
        let library = self.project.model().library.name.clone();
        let keep: HashSet<String> = indexes
            .iter()
            .flat_map(|&index| {
                let stem = shim_stem(&library, index);
                ["cpp", "mm"].map(|ext| format!("{}.{}", stem, ext))
            })
            .collect();

        let dir = self.project.generated_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        let mut stale: Vec<PathBuf> = Vec::new();
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if is_shim_file_name(name, &library) && !keep.contains(name) {
                    stale.push(dir.join(name));
                }
            }
        }
        for path in stale {
            self.delete_artifact(&path);
        }
    }

    /// Attempt every declared toolchain, accumulating per-exporter failures.
    fn export_toolchains(
        &mut self,
        plan: &ArtifactPlan,
        mut exporters: Vec<Box<dyn ToolchainExporter>>,
    ) {
        for exporter in &mut exporters {
            tracing::info!("Writing files for {}", exporter.name());

            let folder = exporter.target_folder().to_path_buf();
            if let Err(e) = std::fs::create_dir_all(&folder) {
                self.record(SaveError::ToolchainExport {
                    exporter: exporter.name().to_string(),
                    message: format!("failed to create {}: {}", folder.display(), e),
                });
                continue;
            }

            let artifacts = self.artifact_list_for(plan, exporter.as_ref());
            exporter.receive_generated_artifacts(artifacts);

            match exporter.export(self.project) {
                Ok(()) => self.report.exported.push(exporter.name().to_string()),
                Err(e) => self.record(SaveError::ToolchainExport {
                    exporter: exporter.name().to_string(),
                    message: format!("{:#}", e),
                }),
            }
        }
    }

    /// The generated files one exporter should compile or list, relative to
    /// its target folder. Order is stable: config, header, resources, shims,
    /// plugin characteristics.
    fn artifact_list_for(
        &self,
        plan: &ArtifactPlan,
        exporter: &dyn ToolchainExporter,
    ) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if plan.has_app_config {
            files.push(self.project.app_config_file());
        }
        if plan.has_app_header {
            files.push(self.project.app_header_file());
        }
        if plan.has_resources {
            files.push(self.project.resource_header_file());
            files.push(self.project.resource_source_file());
        }
        let ext = if exporter.uses_alternate_source_extension() {
            "mm"
        } else {
            "cpp"
        };
        for index in plan.shim_indexes() {
            files.push(self.project.shim_file(index, ext));
        }
        if plan.has_plugin_characteristics {
            files.push(self.project.plugin_characteristics_file());
        }

        let base = exporter.target_folder();
        files
            .into_iter()
            .map(|file| fs::relative_path(base, &file))
            .collect()
    }

    fn write_artifact(&mut self, path: &Path, contents: &str) {
        match fs::write_if_different(path, contents.as_bytes()) {
            Ok(true) => {
                tracing::debug!("wrote {}", path.display());
                self.report.written.push(path.to_path_buf());
            }
            Ok(false) => {}
            Err(source) => self.record(SaveError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn delete_artifact(&mut self, path: &Path) {
        match fs::delete_if_exists(path) {
            Ok(true) => tracing::debug!("removed stale {}", path.display()),
            Ok(false) => {}
            Err(source) => self.record(SaveError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn is_shim_file_name(name: &str, library: &str) -> bool {
    let stem = match name.strip_suffix(".cpp").or_else(|| name.strip_suffix(".mm")) {
        Some(stem) => stem,
        None => return false,
    };
    match stem
        .strip_prefix(library)
        .and_then(|rest| rest.strip_prefix("_source"))
    {
        Some(digits) => digits.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::core::linkage::{LinkageConfig, LinkageModeKind};
    use crate::core::project::{ExporterKind, ExporterSpec, ProjectKind};

    fn demo_model(kind: ProjectKind) -> ProjectModel {
        let mut model = ProjectModel::starter("Demo", kind, "acme");
        model.exporters = vec![ExporterSpec::new(ExporterKind::LinuxMake)];
        model
    }

    fn demo_project(tmp: &TempDir, kind: ProjectKind) -> Project {
        Project::from_model(demo_model(kind), tmp.path().join("Slipway.toml")).unwrap()
    }

    #[test]
    fn test_save_writes_all_artifacts() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::Application);

        let report = save_project(&mut project, &SaveOptions::default());
        assert!(report.success(), "errors: {:?}", report.errors());

        for file in [
            "Slipway.toml",
            "GeneratedCode/AppConfig.h",
            "GeneratedCode/AppHeader.h",
            "GeneratedCode/acme_source.cpp",
            "GeneratedCode/acme_source.mm",
            "Builds/LinuxMakefile/Makefile",
        ] {
            assert!(tmp.path().join(file).is_file(), "missing {}", file);
        }
        assert_eq!(report.exported(), ["Linux Makefile"]);
        assert!(!report.written().is_empty());
        assert!(!tmp.path().join("GeneratedCode/ResourceData.cpp").exists());
    }

    #[test]
    fn test_resave_of_unchanged_project_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::Application);

        assert!(save_project(&mut project, &SaveOptions::default()).success());
        let report = save_project(&mut project, &SaveOptions::default());

        assert!(report.success());
        assert!(report.written().is_empty(), "rewrote: {:?}", report.written());
        assert_eq!(report.exported(), ["Linux Makefile"]);
    }

    #[test]
    fn test_resources_are_embedded_and_listed() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("assets")).unwrap();
        std::fs::write(tmp.path().join("assets/motd.txt"), "hello").unwrap();

        let mut model = demo_model(ProjectKind::Application);
        model.resources = vec!["assets/*.txt".to_string()];
        let mut project =
            Project::from_model(model, tmp.path().join("Slipway.toml")).unwrap();

        let report = save_project(&mut project, &SaveOptions::default());
        assert!(report.success(), "errors: {:?}", report.errors());

        let header = std::fs::read_to_string(tmp.path().join("GeneratedCode/ResourceData.h"))
            .unwrap();
        assert!(header.contains("motd_txt"));
        let makefile =
            std::fs::read_to_string(tmp.path().join("Builds/LinuxMakefile/Makefile")).unwrap();
        assert!(makefile.contains("ResourceData.cpp"));
    }

    #[test]
    fn test_shim_extension_follows_the_exporter() {
        let tmp = TempDir::new().unwrap();
        let mut model = demo_model(ProjectKind::Application);
        model.exporters = vec![
            ExporterSpec::new(ExporterKind::LinuxMake),
            ExporterSpec::new(ExporterKind::MacMake),
        ];
        let mut project =
            Project::from_model(model, tmp.path().join("Slipway.toml")).unwrap();

        let report = save_project(&mut project, &SaveOptions::default());
        assert!(report.success(), "errors: {:?}", report.errors());

        // Same shim content, but each Makefile compiles its own extension.
        let linux =
            std::fs::read_to_string(tmp.path().join("Builds/LinuxMakefile/Makefile")).unwrap();
        assert!(linux.contains("acme_source.cpp"));
        assert!(!linux.contains("acme_source.mm"));

        let mac = std::fs::read_to_string(tmp.path().join("Builds/MacOSX/Makefile")).unwrap();
        assert!(mac.contains("acme_source.mm"));
        assert!(!mac.contains("acme_source.cpp"));
    }

    #[test]
    fn test_one_failed_exporter_does_not_block_others() {
        let tmp = TempDir::new().unwrap();
        let mut model = demo_model(ProjectKind::Application);
        let mut linux = ExporterSpec::new(ExporterKind::LinuxMake);
        linux.target_folder = Some(PathBuf::from("BuildLinux"));
        let mut msvc = ExporterSpec::new(ExporterKind::Msvc);
        msvc.target_folder = Some(PathBuf::from("BuildMsvc"));
        model.exporters = vec![linux, msvc];
        let mut project =
            Project::from_model(model, tmp.path().join("Slipway.toml")).unwrap();

        // A plain file where the first exporter wants its folder.
        std::fs::write(tmp.path().join("BuildLinux"), "in the way").unwrap();

        let report = save_project(&mut project, &SaveOptions::default());
        assert!(!report.success());
        assert_eq!(report.errors().len(), 1);
        assert!(matches!(
            report.first_error(),
            Some(SaveError::ToolchainExport { exporter, .. }) if exporter == "Linux Makefile"
        ));
        assert_eq!(report.exported(), ["Visual Studio"]);
        assert!(tmp.path().join("BuildMsvc/Demo.vcxproj").is_file());
    }

    #[test]
    fn test_failed_save_as_rolls_back_recorded_path() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::Application);
        let original = project.file().to_path_buf();
        std::fs::write(tmp.path().join("elsewhere"), "not a directory").unwrap();

        let save_as = tmp.path().join("elsewhere/Other.toml");
        let report = ProjectSaver::new(&mut project, Some(save_as)).save(&SaveOptions::default());

        assert!(!report.success());
        assert_eq!(project.file(), original);
        assert!(report.exported().is_empty());
    }

    #[test]
    fn test_save_as_re_homes_the_project() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::Application);

        let save_as = tmp.path().join("moved/Renamed.toml");
        let report =
            ProjectSaver::new(&mut project, Some(save_as.clone())).save(&SaveOptions::default());

        assert!(report.success(), "errors: {:?}", report.errors());
        assert_eq!(project.file(), save_as);
        assert!(tmp.path().join("moved/GeneratedCode/AppHeader.h").is_file());
    }

    #[test]
    fn test_blocked_generated_dir_stops_before_export() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::Application);
        std::fs::write(tmp.path().join("GeneratedCode"), "in the way").unwrap();

        let report = save_project(&mut project, &SaveOptions::default());
        assert!(!report.success());
        assert!(report.exported().is_empty());
        assert!(!tmp.path().join("Builds").exists());
    }

    #[test]
    fn test_linkage_switch_cleans_stale_shims() {
        let tmp = TempDir::new().unwrap();
        let mut model = demo_model(ProjectKind::Application);
        model.linkage = LinkageConfig {
            mode: LinkageModeKind::AmalgamatedMultiple,
            amalgamated_files: 3,
        };
        let mut project =
            Project::from_model(model, tmp.path().join("Slipway.toml")).unwrap();

        assert!(save_project(&mut project, &SaveOptions::default()).success());
        for file in ["acme_source1.cpp", "acme_source2.mm", "acme_source3.cpp"] {
            assert!(tmp.path().join("GeneratedCode").join(file).is_file());
        }

        project.model_mut().linkage = LinkageConfig::amalgamated_single();
        project.reresolve_linkage().unwrap();
        assert!(save_project(&mut project, &SaveOptions::default()).success());

        assert!(tmp.path().join("GeneratedCode/acme_source.cpp").is_file());
        assert!(tmp.path().join("GeneratedCode/acme_source.mm").is_file());
        for file in ["acme_source1.cpp", "acme_source1.mm", "acme_source3.cpp"] {
            assert!(!tmp.path().join("GeneratedCode").join(file).exists());
        }
    }

    #[test]
    fn test_not_linked_library_sheds_generated_sources() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::Library);
        assert!(save_project(&mut project, &SaveOptions::default()).success());
        assert!(tmp.path().join("GeneratedCode/AppConfig.h").is_file());

        project.model_mut().linkage = LinkageConfig {
            mode: LinkageModeKind::NotLinked,
            amalgamated_files: 0,
        };
        project.reresolve_linkage().unwrap();
        let report = save_project(&mut project, &SaveOptions::default());

        assert!(report.success(), "errors: {:?}", report.errors());
        assert!(!tmp.path().join("GeneratedCode/AppConfig.h").exists());
        assert!(!tmp.path().join("GeneratedCode/AppHeader.h").exists());
        assert!(!tmp.path().join("GeneratedCode/acme_source.cpp").exists());
    }

    #[test]
    fn test_round_trip_verification_accepts_a_clean_model() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::AudioPlugin);

        let options = SaveOptions {
            verify_model_roundtrip: true,
            ..SaveOptions::default()
        };
        let report = save_project(&mut project, &options);
        assert!(report.success(), "errors: {:?}", report.errors());
    }

    #[test]
    fn test_plugin_save_emits_characteristics_header() {
        let tmp = TempDir::new().unwrap();
        let mut project = demo_project(&tmp, ProjectKind::AudioPlugin);

        let report = save_project(&mut project, &SaveOptions::default());
        assert!(report.success(), "errors: {:?}", report.errors());

        let text = std::fs::read_to_string(
            tmp.path().join("GeneratedCode/PluginCharacteristics.h"),
        )
        .unwrap();
        assert!(text.contains("#define SlipwayPlugin_Name"));
        assert!(text.contains("\"Demo\""));
    }

    #[test]
    fn test_shim_file_name_matching() {
        assert!(is_shim_file_name("acme_source.cpp", "acme"));
        assert!(is_shim_file_name("acme_source12.mm", "acme"));
        assert!(!is_shim_file_name("acme_source.h", "acme"));
        assert!(!is_shim_file_name("other_source.cpp", "acme"));
        assert!(!is_shim_file_name("acme_sourceX.cpp", "acme"));
        assert!(!is_shim_file_name("AppConfig.h", "acme"));
    }
}
