//! CLI integration tests for Slipway.
//!
//! These tests verify the full CLI workflow from project creation through
//! exporting native build projects.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the slipway binary command.
fn slipway() -> Command {
    Command::cargo_bin("slipway").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a project file declaring both a Linux Makefile and a Visual Studio
/// target, so the tests see the same set of outputs on every host.
fn write_demo_project(dir: &Path) {
    fs::write(
        dir.join("Slipway.toml"),
        r#"[project]
name = "Demo"
version = "1.2.3"
kind = "application"

[library]
name = "acme"

[[exporters]]
kind = "linux-make"

[[exporters]]
kind = "msvc"
"#,
    )
    .unwrap();
}

// ============================================================================
// slipway new
// ============================================================================

#[test]
fn test_new_creates_application_project() {
    let tmp = temp_dir();
    let project_dir = tmp.path().join("myapp");

    slipway()
        .args(["new", "myapp", "--library", "acme"])
        .current_dir(tmp.path())
        .assert()
        .success();

    // Check project structure
    assert!(project_dir.join("Slipway.toml").exists());
    assert!(project_dir.join("Source/Main.cpp").exists());
    assert!(project_dir.join(".gitignore").exists());

    // Check project file content
    let manifest = fs::read_to_string(project_dir.join("Slipway.toml")).unwrap();
    assert!(manifest.contains("name = \"myapp\""));
    assert!(manifest.contains("kind = \"application\""));
    assert!(manifest.contains("name = \"acme\""));
}

#[test]
fn test_new_creates_library_project() {
    let tmp = temp_dir();
    let project_dir = tmp.path().join("mylib");

    slipway()
        .args(["new", "mylib", "--kind", "library", "--library", "acme"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(project_dir.join("Slipway.toml").exists());
    // Libraries get no starter main
    assert!(!project_dir.join("Source/Main.cpp").exists());

    let manifest = fs::read_to_string(project_dir.join("Slipway.toml")).unwrap();
    assert!(manifest.contains("kind = \"library\""));
}

#[test]
fn test_new_fails_if_directory_exists() {
    let tmp = temp_dir();
    let project_dir = tmp.path().join("existing");
    fs::create_dir(&project_dir).unwrap();

    slipway()
        .args(["new", "existing", "--library", "acme"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("slipway init"));
}

#[test]
fn test_new_rejects_bad_library_name() {
    let tmp = temp_dir();

    slipway()
        .args(["new", "myapp", "--library", "not a name"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("C identifier"));
}

// ============================================================================
// slipway init
// ============================================================================

#[test]
fn test_init_in_empty_directory() {
    let tmp = temp_dir();

    slipway()
        .args(["init", "--library", "acme"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("Slipway.toml").exists());
}

#[test]
fn test_init_fails_if_project_exists() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["init", "--library", "acme"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// slipway export
// ============================================================================

#[test]
fn test_export_writes_generated_sources_and_native_projects() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["export"])
        .current_dir(tmp.path())
        .assert()
        .success()
        // One progress line per toolchain, then the summary, all on stdout.
        .stdout(predicate::str::contains("Writing files for Linux Makefile"))
        .stdout(predicate::str::contains("Writing files for Visual Studio"))
        .stdout(predicate::str::contains("2 target(s) exported"));

    // Generated sources
    let generated = tmp.path().join("GeneratedCode");
    assert!(generated.join("AppConfig.h").exists());
    assert!(generated.join("AppHeader.h").exists());
    assert!(generated.join("acme_source.cpp").exists());
    assert!(generated.join("acme_source.mm").exists());

    // Native project files
    assert!(tmp.path().join("Builds/LinuxMakefile/Makefile").exists());
    assert!(tmp.path().join("Builds/VisualStudio/Demo.vcxproj").exists());

    // The app header guards each include with the toolchain macro
    let header = fs::read_to_string(generated.join("AppHeader.h")).unwrap();
    assert!(header.contains("SLIPWAY_LINUX_MAKE"));
    assert!(header.contains("SLIPWAY_MSVC"));
}

#[test]
fn test_export_twice_writes_nothing_new() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["export"])
        .current_dir(tmp.path())
        .assert()
        .success();

    slipway()
        .args(["export"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 generated file(s) written"));
}

#[test]
fn test_export_fails_without_project() {
    let tmp = temp_dir();

    slipway()
        .args(["export"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot export without a project file"))
        .stderr(predicate::str::contains("slipway new"));
}

#[test]
fn test_export_reports_failed_target() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    // A plain file where the build folders should go blocks both targets.
    fs::write(tmp.path().join("Builds"), "in the way").unwrap();

    slipway()
        .args(["export"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exporter `Linux Makefile` failed"))
        .stderr(predicate::str::contains("export failed with 2 error(s)"));

    // Source generation ran before the targets failed
    assert!(tmp.path().join("GeneratedCode/AppConfig.h").exists());
}

// ============================================================================
// slipway targets
// ============================================================================

#[test]
fn test_targets_list_shows_configured() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["targets", "list"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("linux-make"))
        .stdout(predicate::str::contains("Builds/LinuxMakefile"))
        .stdout(predicate::str::contains("Visual Studio"));
}

#[test]
fn test_targets_list_json() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["targets", "list", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"linux-make\""))
        .stdout(predicate::str::contains("\"kind\": \"msvc\""));
}

#[test]
fn test_targets_add_and_remove() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["targets", "add", "mac-make"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("Slipway.toml")).unwrap();
    assert!(manifest.contains("kind = \"mac-make\""));

    // Adding the same target again fails
    slipway()
        .args(["targets", "add", "mac-make"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already declared"));

    slipway()
        .args(["targets", "remove", "mac-make"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("Slipway.toml")).unwrap();
    assert!(!manifest.contains("mac-make"));

    // Removing a target that is not declared fails
    slipway()
        .args(["targets", "remove", "mac-make"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no `mac-make` target declared"));
}

#[test]
fn test_targets_add_rejects_unknown_kind() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["targets", "add", "xcode"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exporter kind"));
}

#[test]
fn test_targets_add_preserves_comments() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("Slipway.toml"),
        r#"# hand-tuned settings, do not regenerate
[project]
name = "Demo"
kind = "application"

[library]
name = "acme"

[[exporters]]
kind = "linux-make"
"#,
    )
    .unwrap();

    slipway()
        .args(["targets", "add", "msvc"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("Slipway.toml")).unwrap();
    assert!(manifest.contains("# hand-tuned settings, do not regenerate"));
    assert!(manifest.contains("kind = \"msvc\""));
}

// ============================================================================
// slipway doctor
// ============================================================================

#[test]
fn test_doctor_reports_project_checks() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["doctor"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Slipway Doctor"))
        .stdout(predicate::str::contains("Project file"))
        .stdout(predicate::str::contains("Library tree"))
        .stdout(predicate::str::contains("Summary:"));
}

#[test]
fn test_doctor_fails_without_project() {
    let tmp = temp_dir();

    slipway()
        .args(["doctor"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("no Slipway.toml found"));
}

#[test]
fn test_doctor_json() {
    let tmp = temp_dir();
    write_demo_project(tmp.path());

    slipway()
        .args(["doctor", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Project file\""));
}

// ============================================================================
// slipway completions
// ============================================================================

#[test]
fn test_completions_bash() {
    slipway()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slipway"));
}

// ============================================================================
// Full workflow test
// ============================================================================

#[test]
fn test_full_workflow() {
    let tmp = temp_dir();

    // 1. Create a project
    slipway()
        .args(["new", "Demo", "--library", "acme"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let project_dir = tmp.path().join("Demo");

    // 2. Declare a second toolchain
    slipway()
        .args(["targets", "add", "msvc"])
        .current_dir(&project_dir)
        .assert()
        .success();

    // 3. Export
    slipway()
        .args(["export"])
        .current_dir(&project_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("target(s) exported"));

    assert!(project_dir.join("GeneratedCode/AppHeader.h").exists());
    assert!(project_dir.join("Builds/VisualStudio/Demo.vcxproj").exists());

    let header = fs::read_to_string(project_dir.join("GeneratedCode/AppHeader.h")).unwrap();
    assert!(header.contains("SLIPWAY_MSVC"));

    // 4. Exporting again rewrites nothing
    slipway()
        .args(["export"])
        .current_dir(&project_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 generated file(s) written"));

    // 5. The new target shows up in the list
    slipway()
        .args(["targets", "list"])
        .current_dir(&project_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("msvc"));

    // 6. Doctor is happy with the project file
    slipway()
        .args(["doctor"])
        .current_dir(&project_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Project file"));
}
