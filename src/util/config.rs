//! User configuration, outside the project file.
//!
//! Settings that belong to a machine or a checkout rather than to the
//! project live in `config.toml`: globally under `~/.slipway/`, per project
//! under `.slipway/` next to `Slipway.toml`. The project copy wins where
//! both set a value. Everything here is optional; a project file alone is
//! always enough to export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs;

/// User-level slipway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Fallback values used when the project file leaves them unset
    pub defaults: DefaultsConfig,

    /// Export behavior
    pub export: ExportConfig,
}

/// Fallback values for settings a project may leave unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Library tree location used when neither an exporter nor the project
    /// sets one. Absolute, or relative to the project directory.
    pub library_path: Option<PathBuf>,
}

/// Export behavior settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Re-parse the saved project model and compare it against the in-memory
    /// model before writing any artifacts
    #[serde(default)]
    pub verify_model: bool,
}

impl UserConfig {
    /// Parse one config file.
    pub fn load(path: &Path) -> Result<UserConfig> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Parse one config file, treating a missing or broken file as empty.
    /// A broken file is reported once and otherwise ignored.
    pub fn load_or_default(path: &Path) -> UserConfig {
        if !path.exists() {
            return UserConfig::default();
        }
        UserConfig::load(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring config {}: {:#}", path.display(), e);
            UserConfig::default()
        })
    }

    /// Write the config back out, creating the directory as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write_string(path, &text)
    }

    /// Overlay `other` on top of this config. Values `other` sets win.
    pub fn merge(&mut self, other: UserConfig) {
        if other.defaults.library_path.is_some() {
            self.defaults.library_path = other.defaults.library_path;
        }
        if other.export.verify_model {
            self.export.verify_model = true;
        }
    }
}

/// Merge the global and project config files, project values winning.
pub fn load_user_config(global_path: &Path, project_path: &Path) -> UserConfig {
    let mut config = UserConfig::default();
    for path in [global_path, project_path] {
        config.merge(UserConfig::load_or_default(path));
    }
    config
}

/// The global slipway config directory (`~/.slipway`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".slipway"))
}

/// The global config file (`~/.slipway/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// The per-project config file (`.slipway/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".slipway").join("config.toml")
}

/// The merged config a command should use for `project_root`.
pub fn config_for_project(project_root: &Path) -> UserConfig {
    let project_path = project_config_path(project_root);
    match global_config_path() {
        Some(global_path) => load_user_config(&global_path, &project_path),
        None => UserConfig::load_or_default(&project_path),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_empty_config_sets_nothing() {
        let config = UserConfig::default();
        assert!(config.defaults.library_path.is_none());
        assert!(!config.export.verify_model);
    }

    #[test]
    fn test_load_parses_both_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\nlibrary_path = \"../acme\"\n\n[export]\nverify_model = true\n",
        )
        .unwrap();

        let config = UserConfig::load(&path).unwrap();
        assert_eq!(config.defaults.library_path, Some(PathBuf::from("../acme")));
        assert!(config.export.verify_model);
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let config = UserConfig::load_or_default(&tmp.path().join("nope.toml"));
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_broken_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "not = [ valid").unwrap();
        assert_eq!(UserConfig::load_or_default(&path), UserConfig::default());
    }

    #[test]
    fn test_save_creates_the_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".slipway").join("config.toml");

        let mut config = UserConfig::default();
        config.defaults.library_path = Some(PathBuf::from("/opt/acme"));
        config.save(&path).unwrap();

        assert_eq!(UserConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_project_config_wins_over_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");
        std::fs::write(&global, "[defaults]\nlibrary_path = \"/usr/share/acme\"\n").unwrap();
        std::fs::write(&project, "[defaults]\nlibrary_path = \"../vendor/acme\"\n").unwrap();

        let config = load_user_config(&global, &project);
        assert_eq!(
            config.defaults.library_path,
            Some(PathBuf::from("../vendor/acme"))
        );
    }

    #[test]
    fn test_global_value_survives_when_project_is_silent() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        std::fs::write(&global, "[export]\nverify_model = true\n").unwrap();

        let config = load_user_config(&global, &tmp.path().join("absent.toml"));
        assert!(config.export.verify_model);
    }
}
