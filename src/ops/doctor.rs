//! Implementation of `slipway doctor`: environment and project health checks.
//!
//! Checks are fast and offline: file-system probes plus `which` lookups. No
//! tool is actually executed. Toolchain checks are optional because a
//! project routinely declares exporters for machines other than this one.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::project::{ExporterKind, Project};
use crate::util::config::UserConfig;

/// Outcome of one health check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// What was checked
    pub name: String,

    /// Did it pass
    pub passed: bool,

    /// One-line verdict shown to the user
    pub message: String,

    /// File or tool the check looked at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Time spent in this check
    pub duration: Duration,

    /// A failure here fails `doctor` as a whole
    pub required: bool,
}

/// Run `check`, stamping the result with its name, weight and timing.
fn timed(
    name: &str,
    required: bool,
    check: impl FnOnce() -> (bool, String, Option<PathBuf>),
) -> CheckResult {
    let start = Instant::now();
    let (passed, message, path) = check();
    CheckResult {
        name: name.to_string(),
        passed,
        message,
        path,
        duration: start.elapsed(),
        required,
    }
}

/// Everything `doctor` found, ready to print or serialize.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub total_duration: Duration,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Tally {
    passed: usize,
    failed: usize,
    required_failed: usize,
}

impl DoctorReport {
    /// False as soon as any required check has failed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed || !c.required)
    }

    fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for check in &self.checks {
            if check.passed {
                tally.passed += 1;
            } else {
                tally.failed += 1;
                if check.required {
                    tally.required_failed += 1;
                }
            }
        }
        tally
    }
}

/// Run all health checks for the given project, if one was found.
pub fn doctor(project: Option<&Project>, config: &UserConfig) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::default();

    for (key, value) in [("os", std::env::consts::OS), ("arch", std::env::consts::ARCH)] {
        report.environment.insert(key.to_string(), value.to_string());
    }

    report.checks.push(check_project_file(project));
    if let Some(project) = project {
        report.checks.push(check_library_tree(project, config));
        for spec in &project.model().exporters {
            report.checks.push(check_toolchain(spec.kind));
        }
    }

    report.total_duration = start.elapsed();
    report
}

fn check_project_file(project: Option<&Project>) -> CheckResult {
    timed("Project file", true, || match project {
        Some(project) => (
            true,
            format!("found {}", project.file().display()),
            Some(project.file().to_path_buf()),
        ),
        None => (
            false,
            "no Slipway.toml found in this directory or any parent; \
             run `slipway new` to create one"
                .to_string(),
            None,
        ),
    })
}

/// The library location generated includes will resolve against, before any
/// per-exporter override.
fn check_library_tree(project: &Project, config: &UserConfig) -> CheckResult {
    timed("Library tree", false, || {
        let library = &project.model().library.name;
        let raw = project
            .model()
            .library
            .root
            .clone()
            .or_else(|| config.defaults.library_path.clone())
            .unwrap_or_else(|| PathBuf::from(format!("../{}", library)));
        let resolved = if raw.is_absolute() {
            raw
        } else {
            project.dir().join(raw)
        };

        if resolved.is_dir() {
            let message = format!("{} found at {}", library, resolved.display());
            (true, message, Some(resolved))
        } else {
            let message = format!(
                "{} not found at {}; set `library.root` in the project file or \
                 `defaults.library_path` in the user config",
                library,
                resolved.display()
            );
            (false, message, Some(resolved))
        }
    })
}

fn toolchain_tools(kind: ExporterKind) -> &'static [&'static str] {
    match kind {
        ExporterKind::LinuxMake => &["make", "g++"],
        ExporterKind::MacMake => &["make", "clang++"],
        ExporterKind::Msvc => &["cl"],
    }
}

fn toolchain_hint(kind: ExporterKind) -> &'static str {
    match kind {
        ExporterKind::LinuxMake => "install GNU make and g++",
        ExporterKind::MacMake => "needs the Xcode command line tools",
        ExporterKind::Msvc => "needs a Visual Studio developer prompt",
    }
}

fn check_toolchain(kind: ExporterKind) -> CheckResult {
    timed(kind.display_name(), false, || {
        let tools = toolchain_tools(kind);
        let mut missing = Vec::new();
        let mut first_found = None;
        for tool in tools {
            match which::which(tool) {
                Ok(path) => {
                    first_found.get_or_insert(path);
                }
                Err(_) => missing.push(*tool),
            }
        }

        if missing.is_empty() {
            (true, format!("{} available", tools.join(", ")), first_found)
        } else {
            let message = format!("missing {}; {}", missing.join(", "), toolchain_hint(kind));
            (false, message, None)
        }
    })
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut out = String::from("Slipway Doctor\n==============\n\n");

    if verbose {
        let lookup = |key| {
            report
                .environment
                .get(key)
                .map(String::as_str)
                .unwrap_or("unknown")
        };
        out.push_str(&format!(
            "Environment:\n  OS: {} ({})\n\n",
            lookup("os"),
            lookup("arch")
        ));
    }

    out.push_str("Checks:\n");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let weight = if check.required { "" } else { " (optional)" };
        out.push_str(&format!(
            "  {} {}{}: {}\n",
            status, check.name, weight, check.message
        ));
        if verbose {
            if let Some(path) = &check.path {
                out.push_str(&format!("      Path: {}\n", path.display()));
            }
        }
    }

    let tally = report.tally();
    out.push_str(&format!(
        "\nSummary: {} passed, {} failed\n",
        tally.passed, tally.failed
    ));

    if tally.required_failed > 0 {
        out.push_str(&format!(
            "\n{} required check(s) failed.\n",
            tally.required_failed
        ));
    } else if tally.failed > 0 {
        out.push_str(&format!(
            "\nAll required checks passed. {} optional check(s) failed.\n",
            tally.failed
        ));
    } else {
        out.push_str("\nAll checks passed. Slipway is ready to use.\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::core::project::{ProjectKind, ProjectModel};

    fn passing(name: &str) -> CheckResult {
        timed(name, true, || (true, "ok".to_string(), None))
    }

    fn failing(name: &str, message: &str) -> CheckResult {
        timed(name, true, || (false, message.to_string(), None))
    }

    #[test]
    fn test_optional_failure_keeps_the_report_green() {
        let mut report = DoctorReport::default();
        report.checks.push(passing("a"));
        let mut optional = failing("b", "missing");
        optional.required = false;
        report.checks.push(optional);

        assert!(report.all_required_passed());
        let tally = report.tally();
        assert_eq!(tally.passed, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.required_failed, 0);
    }

    #[test]
    fn test_missing_project_is_a_required_failure() {
        let report = doctor(None, &UserConfig::default());
        assert!(!report.all_required_passed());
        assert_eq!(report.checks.len(), 1);
    }

    #[test]
    fn test_library_tree_resolution() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("libs/acme")).unwrap();

        let mut model = ProjectModel::starter("Demo", ProjectKind::Application, "acme");
        model.library.root = Some(PathBuf::from("libs/acme"));
        let project =
            Project::from_model(model, tmp.path().join("Slipway.toml")).unwrap();

        let check = check_library_tree(&project, &UserConfig::default());
        assert!(check.passed, "{}", check.message);

        let mut model = ProjectModel::starter("Demo", ProjectKind::Application, "acme");
        model.library.root = Some(PathBuf::from("no/such/dir"));
        let project =
            Project::from_model(model, tmp.path().join("Slipway.toml")).unwrap();

        let check = check_library_tree(&project, &UserConfig::default());
        assert!(!check.passed);
        assert!(!check.required);
    }

    #[test]
    fn test_format_report_flags_failures() {
        let mut report = DoctorReport::default();
        report.checks.push(passing("Project file"));
        let mut optional = failing("Library tree", "acme not found");
        optional.required = false;
        report.checks.push(optional);

        let text = format_report(&report, false);
        assert!(text.contains("[OK] Project file"));
        assert!(text.contains("[!!] Library tree (optional): acme not found"));
        assert!(text.contains("Summary: 1 passed, 1 failed"));
        assert!(text.contains("1 optional check(s) failed"));
    }
}
