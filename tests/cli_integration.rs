//! CLI integration tests for Loom.
//!
//! These tests write manifest trees into temporary directories and run the
//! `loom` binary against them.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the loom binary command.
fn loom() -> Command {
    Command::cargo_bin("loom").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

const APP_PROJECT: &str = r#"
name = "App"

[[targets]]
name = "App"
product = "app"
sources = ["Sources/**/*.swift"]

[[targets]]
name = "AppTests"
product = "unit_tests"
sources = ["Tests/**/*.swift"]
dependencies = [{ target = "App" }]
"#;

/// A workspace with an App project that depends on a Core framework project.
fn write_workspace(root: &Path) {
    write(
        &root.join("Workspace.toml"),
        "name = \"WS\"\nprojects = [\"App\", \"Core\"]\n",
    );
    write(
        &root.join("App/Project.toml"),
        r#"
name = "App"

[[targets]]
name = "App"
product = "app"
sources = ["Sources/**/*.swift"]
dependencies = [{ project = "../Core", target = "Core" }]
"#,
    );
    write(&root.join("App/Sources/App.swift"), "import Core\n");
    write(
        &root.join("Core/Project.toml"),
        r#"
name = "Core"

[[targets]]
name = "Core"
product = "framework"
sources = ["Sources/**/*.swift"]
"#,
    );
    write(&root.join("Core/Sources/Core.swift"), "struct Core {}\n");
}

// ============================================================================
// loom --help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    loom()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("schemes"));
}

// ============================================================================
// loom generate
// ============================================================================

#[test]
fn test_generate_single_project() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), APP_PROJECT);
    write(&tmp.path().join("Sources/App.swift"), "print(\"hi\")\n");

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished `App`"))
        .stderr(predicate::str::contains("2 target(s)"));
}

#[test]
fn test_generate_workspace_by_path() {
    let tmp = temp_dir();
    write_workspace(tmp.path());

    loom()
        .args(["generate", "--jobs", "2"])
        .arg(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished `WS`: 2 project(s)"));
}

#[test]
fn test_generate_removes_derived_directory() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), APP_PROJECT);
    write(&tmp.path().join("Derived/Stale.plist"), "stale");

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(!tmp.path().join("Derived").exists());
}

#[test]
fn test_generate_dry_run_changes_nothing() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), APP_PROJECT);
    write(&tmp.path().join("Derived/Stale.plist"), "stale");

    loom()
        .args(["generate", "--dry-run"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("Derived/Stale.plist").exists());
}

#[test]
fn test_generate_writes_graph_summary_when_configured() {
    let tmp = temp_dir();
    write_workspace(tmp.path());
    write(
        &tmp.path().join("Loom/Config.toml"),
        "[generation]\nemit_graph_summary = true\n",
    );

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .success();

    let summary = fs::read_to_string(tmp.path().join(".loom/graph.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(json["name"], "WS");
    assert_eq!(json["projects"].as_array().unwrap().len(), 2);
}

#[test]
fn test_generate_fails_without_manifest() {
    let tmp = temp_dir();

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no manifest found"));
}

#[test]
fn test_generate_fails_on_invalid_manifest() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), "name = [\n");

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse manifest"));
}

#[test]
fn test_generate_fails_on_lint_errors() {
    let tmp = temp_dir();
    write(
        &tmp.path().join("Project.toml"),
        r#"
name = "App"

[[targets]]
name = "App"
product = "app"
sources = ["Sources/**/*.swift"]

[[targets]]
name = "App"
product = "framework"
sources = ["Sources/**/*.swift"]
"#,
    );

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest linting failed"));
}

#[test]
fn test_generate_fails_on_cycle() {
    let tmp = temp_dir();
    write(
        &tmp.path().join("Project.toml"),
        r#"
name = "Cyclic"

[[targets]]
name = "A"
product = "framework"
sources = ["Sources/**/*.swift"]
dependencies = [{ target = "B" }]

[[targets]]
name = "B"
product = "framework"
sources = ["Sources/**/*.swift"]
dependencies = [{ target = "A" }]
"#,
    );

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular dependency"))
        .stderr(predicate::str::contains("->"));
}

#[test]
fn test_generate_fails_on_unknown_dependency() {
    let tmp = temp_dir();
    write(
        &tmp.path().join("Project.toml"),
        r#"
name = "App"

[[targets]]
name = "App"
product = "app"
sources = ["Sources/**/*.swift"]
dependencies = [{ target = "Missing" }]
"#,
    );

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("`Missing`"));
}

#[test]
fn test_generate_fails_on_test_bundle_across_projects() {
    let tmp = temp_dir();
    write(
        &tmp.path().join("Workspace.toml"),
        "name = \"WS\"\nprojects = [\"App\", \"Other\"]\n",
    );
    write(&tmp.path().join("Other/Project.toml"), APP_PROJECT);
    write(
        &tmp.path().join("App/Project.toml"),
        r#"
name = "Consumer"

[[targets]]
name = "Consumer"
product = "app"
sources = ["Sources/**/*.swift"]
dependencies = [{ project = "../Other", target = "AppTests" }]
"#,
    );

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("from another project"));
}

#[test]
fn test_generate_fails_on_unknown_coverage_target() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), APP_PROJECT);
    write(
        &tmp.path().join("Loom/Config.toml"),
        "[generation]\ncode_coverage = { targets = [{ target = \"DoesNotExist\" }] }\n",
    );
    write(&tmp.path().join("Derived/Stale.plist"), "stale");

    loom()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest linting failed"))
        .stderr(predicate::str::contains("DoesNotExist"));

    assert!(tmp.path().join("Derived/Stale.plist").exists());
}

// ============================================================================
// loom graph
// ============================================================================

#[test]
fn test_graph_text_shows_cross_project_dependency() {
    let tmp = temp_dir();
    write_workspace(tmp.path());

    loom()
        .arg("graph")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("WS"))
        .stdout(predicate::str::contains("App [app]"))
        .stdout(predicate::str::contains("Core (Core)"));
}

#[test]
fn test_graph_json() {
    let tmp = temp_dir();
    write_workspace(tmp.path());

    let output = loom()
        .args(["graph", "--format", "json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "WS");
    let app = json["projects"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "App")
        .unwrap();
    assert_eq!(app["targets"][0]["dependencies"][0]["name"], "Core");
}

#[test]
fn test_graph_infers_auto_dependencies() {
    let tmp = temp_dir();
    write(
        &tmp.path().join("Project.toml"),
        r#"
name = "App"

[[targets]]
name = "App"
product = "app"
sources = ["Sources/App/**/*.swift"]
dependencies = ["auto"]

[[targets]]
name = "Networking"
product = "framework"
sources = ["Sources/Networking/**/*.swift"]
"#,
    );
    write(
        &tmp.path().join("Sources/App/App.swift"),
        "import Foundation\nimport Networking\n",
    );
    write(&tmp.path().join("Sources/Networking/Client.swift"), "struct Client {}\n");

    loom()
        .arg("graph")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("└── Networking"));
}

// ============================================================================
// loom schemes
// ============================================================================

#[test]
fn test_schemes_lists_generated_schemes() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), APP_PROJECT);

    loom()
        .arg("schemes")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("App (shared)"))
        .stdout(predicate::str::contains("AppTests (shared)"))
        .stdout(predicate::str::contains("run:   App"))
        .stdout(predicate::str::contains("test:  AppTests"));
}

#[test]
fn test_schemes_single_scheme_grouping() {
    let tmp = temp_dir();
    write(
        &tmp.path().join("Project.toml"),
        &APP_PROJECT.replace(
            "name = \"App\"\n\n[[targets]]",
            concat!(
                "name = \"App\"\n\n",
                "[options.automatic_schemes]\ngrouping = \"single_scheme\"\n\n",
                "[[targets]]",
            ),
        ),
    );

    loom()
        .arg("schemes")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("build: App, AppTests"))
        .stdout(predicate::str::contains("AppTests (shared)").not());
}

#[test]
fn test_schemes_respects_disabled_config() {
    let tmp = temp_dir();
    write(&tmp.path().join("Project.toml"), APP_PROJECT);
    write(
        &tmp.path().join("Loom/Config.toml"),
        "[generation]\nautomatic_schemes = false\n",
    );

    loom()
        .arg("schemes")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(no schemes)"));
}

// ============================================================================
// loom completions
// ============================================================================

#[test]
fn test_completions_bash() {
    loom()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loom"));
}
