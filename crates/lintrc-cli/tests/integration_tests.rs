//! Integration tests for the lintrc CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper function to create a CLI command running inside `project`
///
/// The home directory points nowhere so a real `~/.jshintrc` never leaks in.
#[allow(deprecated)]
fn cli(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lintrc").unwrap();
    cmd.current_dir(project)
        .env("HOME", project.join(".no-home"))
        .env_remove("USERPROFILE")
        .env_remove("HOMEPATH")
        .env_remove("HOMEDRIVE")
        .env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A project with one clean file and one missing a semicolon
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "legacy/a.js", "var a = 1\n");
    write(temp_dir.path(), "src/b.js", "var b = 2\n");
    write(temp_dir.path(), "src/clean.js", "var c = 3;\n");
    temp_dir
}

#[test]
fn test_help_command() {
    let temp_dir = TempDir::new().unwrap();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--extra-ext"))
        .stdout(predicate::str::contains("--exclude-path"));
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().unwrap();
    cli(temp_dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_clean_file_exits_zero() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .arg("src/clean.js")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_findings_exit_two() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .arg("src")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("src/b.js: line 1, col"))
        .stdout(predicate::str::contains("Missing semicolon. (W033)"))
        .stdout(predicate::str::contains("1 error"))
        .stdout(predicate::str::contains("clean.js").not());
}

#[test]
fn test_missing_target_is_fatal() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .arg("ghost.js")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Can't open ghost.js"));
}

#[test]
fn test_missing_config_is_fatal() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--config", "missing.json", "src"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Can't find config file:"))
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_malformed_config_is_fatal() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "src/.jshintrc", "{ not json");
    cli(temp_dir.path())
        .arg("src")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Can't parse config file:"));
}

#[test]
fn test_missing_reporter_is_fatal() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--reporter", "invalid.js", "src"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Can't load reporter file: invalid.js"));
}

#[test]
fn test_explicit_config_applies() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "lenient.json", r#"{"asi": true}"#);
    cli(temp_dir.path())
        .args(["--config", "lenient.json", "src", "legacy"])
        .assert()
        .code(0);
}

#[test]
fn test_nearest_rc_applies_per_directory() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "legacy/.jshintrc", r#"{"asi": true}"#);
    cli(temp_dir.path())
        .args(["legacy", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("src/b.js"))
        .stdout(predicate::str::contains("legacy/a.js").not());
}

#[test]
fn test_manifest_config_applies() {
    let temp_dir = create_test_project();
    write(
        temp_dir.path(),
        "package.json",
        r#"{"name": "demo", "jshintConfig": {"asi": true}}"#,
    );
    cli(temp_dir.path()).args(["legacy", "src"]).assert().code(0);
}

#[test]
fn test_home_rc_is_fallback() {
    let temp_dir = create_test_project();
    let home = TempDir::new().unwrap();
    write(home.path(), ".jshintrc", r#"{"asi": true}"#);
    cli(temp_dir.path())
        .env("HOME", home.path())
        .arg("src")
        .assert()
        .code(0);
}

#[test]
fn test_overrides_apply_to_matching_files() {
    let temp_dir = create_test_project();
    write(
        temp_dir.path(),
        ".jshintrc",
        r#"{"overrides": {"legacy/*.js": {"asi": true}}}"#,
    );
    cli(temp_dir.path())
        .args(["legacy", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("src/b.js"))
        .stdout(predicate::str::contains("legacy/a.js").not());
}

#[test]
fn test_extends_chain() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "base.json", r#"{"asi": true, "undef": true}"#);
    write(temp_dir.path(), ".jshintrc", r#"{"extends": "base.json", "undef": false}"#);
    write(temp_dir.path(), "src/calls.js", "helper()\n");
    cli(temp_dir.path()).arg("src").assert().code(0);
}

#[test]
fn test_exclude_option() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--exclude", "src", "legacy", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("legacy/a.js"))
        .stdout(predicate::str::contains("src/b.js").not());
}

#[test]
fn test_ignore_file() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), ".jshintignore", "# vendored\nlegacy\n");
    cli(temp_dir.path())
        .args(["legacy", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("legacy/a.js").not());
}

#[test]
fn test_exclude_path_option() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "custom-ignore", "src/*.js\n");
    cli(temp_dir.path())
        .args(["--exclude-path", "custom-ignore", "legacy", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("legacy/a.js"))
        .stdout(predicate::str::contains("src/b.js").not());
}

#[test]
fn test_ignored_target_is_skipped_even_if_missing() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--exclude", "ghost.js", "ghost.js", "src/clean.js"])
        .assert()
        .code(0);
}

#[test]
fn test_extra_ext() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "jsx/view.jsx", "render()\n");

    cli(temp_dir.path()).arg("jsx").assert().code(0);

    cli(temp_dir.path())
        .args(["--extra-ext", "jsx", "jsx"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("jsx/view.jsx"));
}

#[test]
fn test_unix_reporter() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--reporter", "unix", "src/b.js"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("src/b.js:1:"))
        .stdout(predicate::str::contains(": Missing semicolon."));
}

#[test]
fn test_jslint_reporter() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--reporter", "jslint", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("<jslint>"))
        .stdout(predicate::str::contains("<file name=\"src/b.js\">"))
        .stdout(predicate::str::contains("reason=\"Missing semicolon.\""));
}

#[test]
fn test_checkstyle_reporter() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--reporter", "checkstyle", "src"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("<checkstyle version=\"4.3\">"))
        .stdout(predicate::str::contains("source=\"jshint.W033\""));
}

#[test]
fn test_show_non_errors() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), "data/app.js", "var idle = 1;\nhelper();\n");
    cli(temp_dir.path())
        .args(["--show-non-errors", "data"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Implied globals:"))
        .stdout(predicate::str::contains("helper: 2"))
        .stdout(predicate::str::contains("Unused Variables:"))
        .stdout(predicate::str::contains("idle(1)"));
}

#[cfg(unix)]
#[test]
fn test_external_reporter_receives_json() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = create_test_project();
    let script = temp_dir.path().join("reporter.sh");
    fs::write(&script, "#!/bin/sh\ncat > \"$(dirname \"$0\")/report.json\"\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    cli(temp_dir.path())
        .args(["--reporter", "reporter.sh", "src"])
        .assert()
        .code(2);

    let report = fs::read_to_string(temp_dir.path().join("report.json")).unwrap();
    assert!(report.contains("\"results\""));
    assert!(report.contains("\"W033\""));
    assert!(report.contains("src/b.js"));
}

#[test]
fn test_stdin_with_filename() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--filename", "virtual/foo.js", "-"])
        .write_stdin("eval('1');\n")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("virtual/foo.js: line 1, col 1"))
        .stdout(predicate::str::contains("eval can be harmful. (W061)"));
}

#[test]
fn test_stdin_filename_uses_overrides() {
    let temp_dir = create_test_project();
    write(
        temp_dir.path(),
        ".jshintrc",
        r#"{"overrides": {"virtual/*.js": {"evil": true}}}"#,
    );
    cli(temp_dir.path())
        .args(["--filename", "virtual/foo.js", "-"])
        .write_stdin("eval('1');\n")
        .assert()
        .code(0);
}

#[test]
fn test_stdin_defaults_to_stdin_name() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .arg("-")
        .write_stdin("var x = 1\n")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("stdin: line 1"));
}

#[test]
fn test_prereq_declares_globals() {
    let temp_dir = create_test_project();
    write(temp_dir.path(), ".jshintrc", r#"{"undef": true}"#);
    write(temp_dir.path(), "lib/helpers.txt", "function helper() {}\n");
    write(temp_dir.path(), "app/main.js", "helper();\n");

    cli(temp_dir.path())
        .arg("app")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("'helper' is not defined. (W117)"));

    cli(temp_dir.path())
        .args(["--prereq", "lib/helpers.txt", "app"])
        .assert()
        .code(0);
}

#[test]
fn test_missing_prereq_is_fatal() {
    let temp_dir = create_test_project();
    cli(temp_dir.path())
        .args(["--prereq", "nowhere.js", "src"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("nowhere.js"));
}
