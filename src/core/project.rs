//! Slipway.toml project parsing and schema.
//!
//! The project file is the single declarative source of truth for everything
//! slipway generates. Loading validates the few constraints serde cannot
//! express (linkage counts, plugin table presence, identifier shapes), so the
//! rest of the crate always works with a consistent model.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::linkage::{LinkageConfig, LinkageMode};
use crate::util;
use crate::util::config::UserConfig;

/// Canonical project file name.
pub const PROJECT_FILENAME: &str = "Slipway.toml";

/// Default folder (relative to the project dir) for generated sources.
pub const DEFAULT_GENERATED_DIR: &str = "GeneratedCode";

/// What the project builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    Application,
    Library,
    AudioPlugin,
}

impl ProjectKind {
    pub fn is_library(&self) -> bool {
        matches!(self, ProjectKind::Library)
    }

    pub fn is_audio_plugin(&self) -> bool {
        matches!(self, ProjectKind::AudioPlugin)
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Application => write!(f, "application"),
            ProjectKind::Library => write!(f, "library"),
            ProjectKind::AudioPlugin => write!(f, "audio-plugin"),
        }
    }
}

impl FromStr for ProjectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "application" | "app" => Ok(ProjectKind::Application),
            "library" | "lib" => Ok(ProjectKind::Library),
            "audio-plugin" | "plugin" => Ok(ProjectKind::AudioPlugin),
            other => bail!(
                "unknown project kind `{}` (expected `application`, `library` or `audio-plugin`)",
                other
            ),
        }
    }
}

/// Tri-state of one config flag line in the generated config header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagState {
    /// `#define SYMBOL 1`
    Enabled,
    /// `#define SYMBOL 0`
    Disabled,
    /// Commented-out define; the library's own default applies
    #[default]
    Default,
}

/// One configurable preprocessor flag (a `[[config_flags]]` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFlag {
    /// Preprocessor symbol name
    pub symbol: String,

    /// Whether the flag is forced on, forced off, or left to the library
    #[serde(default)]
    pub state: FlagState,
}

/// The library whose code the generated artifacts pull in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRef {
    /// Symbol prefix of the library's amalgamated units (e.g. `acme` for
    /// `acme_amalgamated.cpp`)
    pub name: String,

    /// Library source tree, relative to the project dir (or absolute).
    /// Falls back to the user config, then to `../<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Plugin metadata (the `[plugin]` table), required for audio-plugin projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    pub name: String,
    pub description: String,
    pub manufacturer: String,

    /// Four-character manufacturer code embedded as a multi-char literal
    pub manufacturer_code: String,

    /// Four-character plugin code embedded as a multi-char literal
    pub plugin_code: String,

    /// Supported channel layouts, e.g. `"{1,1},{2,2}"`
    pub channel_configs: String,

    pub is_synth: bool,
    pub wants_midi_input: bool,
    pub produces_midi_output: bool,
    pub silence_in_produces_silence_out: bool,
    pub tail_length_seconds: f64,
    pub editor_wants_keyboard_focus: bool,

    /// Symbol prefix for the AudioUnit entry points
    pub au_export_prefix: String,

    /// Cocoa view class name advertised to AudioUnit hosts
    pub au_view_class: String,

    pub build_vst: bool,
    pub build_au: bool,
    pub build_rtas: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        PluginSettings {
            name: String::new(),
            description: String::new(),
            manufacturer: "yourcompany".to_string(),
            manufacturer_code: "Manu".to_string(),
            plugin_code: "Plug".to_string(),
            channel_configs: "{1,1},{2,2}".to_string(),
            is_synth: false,
            wants_midi_input: false,
            produces_midi_output: false,
            silence_in_produces_silence_out: true,
            tail_length_seconds: 0.0,
            editor_wants_keyboard_focus: true,
            au_export_prefix: String::new(),
            au_view_class: String::new(),
            build_vst: true,
            build_au: true,
            build_rtas: false,
        }
    }
}

impl PluginSettings {
    /// Plugin settings pre-filled from the project name.
    pub fn for_project(project_name: &str) -> Self {
        let prefix: String = project_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        PluginSettings {
            name: project_name.to_string(),
            au_export_prefix: format!("{}AU", prefix),
            au_view_class: format!("{}AU_V1", prefix),
            ..PluginSettings::default()
        }
    }
}

/// Supported toolchain families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExporterKind {
    LinuxMake,
    MacMake,
    Msvc,
}

impl ExporterKind {
    /// All supported kinds, in a stable order.
    pub fn all() -> [ExporterKind; 3] {
        [
            ExporterKind::LinuxMake,
            ExporterKind::MacMake,
            ExporterKind::Msvc,
        ]
    }

    /// Human-readable toolchain name, used in progress output.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExporterKind::LinuxMake => "Linux Makefile",
            ExporterKind::MacMake => "macOS Makefile",
            ExporterKind::Msvc => "Visual Studio",
        }
    }

    /// Preprocessor macro identifying this toolchain in generated guards.
    pub fn identifier_macro(&self) -> &'static str {
        match self {
            ExporterKind::LinuxMake => "SLIPWAY_LINUX_MAKE",
            ExporterKind::MacMake => "SLIPWAY_MAC_MAKE",
            ExporterKind::Msvc => "SLIPWAY_MSVC",
        }
    }

    /// Default folder for the native project files.
    pub fn default_target_folder(&self) -> &'static str {
        match self {
            ExporterKind::LinuxMake => "Builds/LinuxMakefile",
            ExporterKind::MacMake => "Builds/MacOSX",
            ExporterKind::Msvc => "Builds/VisualStudio",
        }
    }
}

impl fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExporterKind::LinuxMake => write!(f, "linux-make"),
            ExporterKind::MacMake => write!(f, "mac-make"),
            ExporterKind::Msvc => write!(f, "msvc"),
        }
    }
}

impl FromStr for ExporterKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linux-make" => Ok(ExporterKind::LinuxMake),
            "mac-make" => Ok(ExporterKind::MacMake),
            "msvc" => Ok(ExporterKind::Msvc),
            other => bail!(
                "unknown exporter kind `{}` (expected `linux-make`, `mac-make` or `msvc`)",
                other
            ),
        }
    }
}

/// One configured toolchain target (a `[[exporters]]` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterSpec {
    /// Toolchain family
    pub kind: ExporterKind,

    /// Where the native project files go, relative to the project dir
    /// (default `Builds/<Kind>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_folder: Option<PathBuf>,

    /// Where this toolchain sees the library tree; overrides the project's
    /// `library.root` for include mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,
}

impl ExporterSpec {
    /// A spec for `kind` with all defaults.
    pub fn new(kind: ExporterKind) -> Self {
        ExporterSpec {
            kind,
            target_folder: None,
            library_path: None,
        }
    }
}

/// Project identity and top-level settings (the `[project]` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project name
    pub name: String,

    /// What the project builds
    pub kind: ProjectKind,

    /// Free-form dotted version string, up to four numeric components
    #[serde(default = "default_version")]
    pub version: String,

    /// Reverse-DNS bundle identifier
    #[serde(default)]
    pub bundle_identifier: String,

    /// Folder receiving generated sources, relative to the project dir
    #[serde(default = "default_generated_dir")]
    pub generated_dir: PathBuf,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_generated_dir() -> PathBuf {
    PathBuf::from(DEFAULT_GENERATED_DIR)
}

/// Everything `Slipway.toml` persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    /// Project identity
    pub project: ProjectMeta,

    /// The library whose code the project links
    pub library: LibraryRef,

    /// How the library is linked
    #[serde(default = "LinkageConfig::amalgamated_single")]
    pub linkage: LinkageConfig,

    /// Preprocessor flags rendered into the config header, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_flags: Vec<ConfigFlag>,

    /// Glob patterns (relative to the project dir) for embedded resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    /// Plugin metadata; required when kind is `audio-plugin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginSettings>,

    /// Configured toolchain targets, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exporters: Vec<ExporterSpec>,
}

impl ProjectModel {
    /// A minimal model for `slipway new`.
    pub fn starter(name: &str, kind: ProjectKind, library: &str) -> ProjectModel {
        ProjectModel {
            project: ProjectMeta {
                name: name.to_string(),
                kind,
                version: default_version(),
                bundle_identifier: format!("com.example.{}", identifier_component(name)),
                generated_dir: default_generated_dir(),
            },
            library: LibraryRef {
                name: library.to_string(),
                root: Some(PathBuf::from(format!("../{}", library))),
            },
            linkage: LinkageConfig::amalgamated_single(),
            config_flags: Vec::new(),
            resources: Vec::new(),
            plugin: if kind.is_audio_plugin() {
                Some(PluginSettings::for_project(name))
            } else {
                None
            },
            exporters: vec![ExporterSpec::new(host_exporter_kind())],
        }
    }
}

/// The exporter kind matching the machine slipway runs on.
pub fn host_exporter_kind() -> ExporterKind {
    if cfg!(target_os = "macos") {
        ExporterKind::MacMake
    } else if cfg!(target_os = "windows") {
        ExporterKind::Msvc
    } else {
        ExporterKind::LinuxMake
    }
}

fn identifier_component(name: &str) -> String {
    let s: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if s.is_empty() {
        "project".to_string()
    } else {
        s
    }
}

fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Search `start` and its ancestors for a project file.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(PROJECT_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// A loaded project: the model plus its recorded file location.
///
/// Every derived path (project dir, generated dir, exporter target folders)
/// is computed from the recorded file location, so moving the file via
/// [`Project::set_file`] re-roots all of them at once.
#[derive(Debug, Clone)]
pub struct Project {
    model: ProjectModel,
    file: PathBuf,
    linkage: LinkageMode,
}

impl Project {
    /// Load and validate a project file.
    pub fn load(path: &Path) -> Result<Project> {
        let text = util::fs::read_to_string(path)?;
        let model: ProjectModel = toml::from_str(&text)
            .with_context(|| format!("failed to parse project file: {}", path.display()))?;
        Project::from_model(model, path.to_path_buf())
    }

    /// Wrap an in-memory model, validating it first.
    pub fn from_model(model: ProjectModel, file: PathBuf) -> Result<Project> {
        let linkage = validate(&model)
            .with_context(|| format!("invalid project file: {}", file.display()))?;
        Ok(Project {
            model,
            file,
            linkage,
        })
    }

    pub fn model(&self) -> &ProjectModel {
        &self.model
    }

    /// Mutable access to the model. Callers are responsible for keeping it
    /// valid; `load` is the only place validation runs.
    pub fn model_mut(&mut self) -> &mut ProjectModel {
        &mut self.model
    }

    /// The recorded project-file location.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Move the project's recorded location. All derived paths follow.
    pub fn set_file(&mut self, file: PathBuf) {
        self.file = file;
    }

    /// The project directory (parent of the project file).
    pub fn dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn name(&self) -> &str {
        &self.model.project.name
    }

    pub fn kind(&self) -> ProjectKind {
        self.model.project.kind
    }

    pub fn version(&self) -> &str {
        &self.model.project.version
    }

    pub fn linkage_mode(&self) -> LinkageMode {
        self.linkage
    }

    /// Refresh the cached linkage mode after a model edit.
    pub fn reresolve_linkage(&mut self) -> Result<()> {
        self.linkage = self.model.linkage.resolve()?;
        Ok(())
    }

    /// Folder receiving generated sources.
    pub fn generated_dir(&self) -> PathBuf {
        self.dir().join(&self.model.project.generated_dir)
    }

    pub fn app_config_file(&self) -> PathBuf {
        self.generated_dir().join("AppConfig.h")
    }

    pub fn app_header_file(&self) -> PathBuf {
        self.generated_dir().join("AppHeader.h")
    }

    pub fn plugin_characteristics_file(&self) -> PathBuf {
        self.generated_dir().join("PluginCharacteristics.h")
    }

    pub fn resource_source_file(&self) -> PathBuf {
        self.generated_dir().join("ResourceData.cpp")
    }

    pub fn resource_header_file(&self) -> PathBuf {
        self.generated_dir().join("ResourceData.h")
    }

    /// Path of the shim with the given index and extension.
    ///
    /// Index 0 is the lone shim of single-unit modes; numbered shims match
    /// the amalgamated unit they include.
    pub fn shim_file(&self, index: u32, extension: &str) -> PathBuf {
        self.generated_dir()
            .join(format!("{}.{}", shim_stem(&self.model.library.name, index), extension))
    }

    /// Resolved folder for one exporter's native project files.
    pub fn exporter_target_folder(&self, spec: &ExporterSpec) -> PathBuf {
        let folder = spec
            .target_folder
            .clone()
            .unwrap_or_else(|| PathBuf::from(spec.kind.default_target_folder()));
        if folder.is_absolute() {
            folder
        } else {
            self.dir().join(folder)
        }
    }

    /// The library tree as one exporter's generated includes should see it.
    pub fn include_base_for(&self, spec: &ExporterSpec, config: &UserConfig) -> PathBuf {
        match &spec.library_path {
            Some(path) => self.rebase_for_generated(path),
            None => self.default_include_base(config),
        }
    }

    /// The library tree as generated includes see it when no exporter says
    /// otherwise: project `library.root`, else the user-config default, else
    /// a sibling folder named after the library.
    pub fn default_include_base(&self, config: &UserConfig) -> PathBuf {
        let raw = self
            .model
            .library
            .root
            .as_ref()
            .or(config.defaults.library_path.as_ref())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(format!("../{}", self.model.library.name)));
        self.rebase_for_generated(&raw)
    }

    /// Express a project-relative location as seen from the generated
    /// sources folder. Absolute paths pass through untouched.
    fn rebase_for_generated(&self, raw: &Path) -> PathBuf {
        if raw.is_absolute() {
            return raw.to_path_buf();
        }
        util::fs::relative_path(&self.generated_dir(), &self.dir().join(raw))
    }
}

/// Stem (no extension) of a shim file.
pub fn shim_stem(library_name: &str, index: u32) -> String {
    if index == 0 {
        format!("{}_source", library_name)
    } else {
        format!("{}_source{}", library_name, index)
    }
}

fn validate(model: &ProjectModel) -> Result<LinkageMode> {
    if model.project.name.trim().is_empty() {
        bail!("project name must not be empty");
    }
    if !is_c_identifier(&model.library.name) {
        bail!(
            "library name `{}` must be a valid C identifier",
            model.library.name
        );
    }

    let linkage = model.linkage.resolve()?;

    if model.project.kind.is_audio_plugin() && model.plugin.is_none() {
        bail!("audio-plugin projects need a [plugin] table");
    }

    for pattern in &model.resources {
        glob::Pattern::new(pattern)
            .with_context(|| format!("invalid resource pattern `{}`", pattern))?;
    }

    Ok(linkage)
}
