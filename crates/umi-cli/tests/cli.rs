//! End-to-end tests of the `umi` binary.

use std::fs;

use predicates::prelude::*;
use tempfile::TempDir;

fn umi() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("umi"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    umi()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("hooks"));
}

#[test]
fn test_generate_writes_files() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("pages")).unwrap();
    fs::write(temp.path().join("pages/index.js"), "export default () => null;").unwrap();

    umi()
        .args(["generate", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated pages/.umi/umi.js"));

    assert!(temp.path().join("pages/.umi/router.js").is_file());

    umi()
        .args(["generate", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn test_hooks_json_hides_private_points_by_default() {
    let temp = TempDir::new().unwrap();

    umi()
        .args(["hooks", "--json", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"addEntryImport\""))
        .stdout(predicate::str::contains("\"_registerConfig\"").not());

    let output = umi()
        .args(["hooks", "--json", "--all", "--cwd"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let points: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let register_config = points
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "_registerConfig")
        .unwrap();
    assert_eq!(register_config["kind"], "accumulate");
    assert_eq!(register_config["handlers"], 1);
}

#[test]
fn test_hooks_table() {
    let temp = TempDir::new().unwrap();
    umi()
        .args(["hooks", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("POINT"))
        .stdout(predicate::str::contains("chainWebpackConfig"));
}

#[test]
fn test_config_prints_resolved_values() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".umirc.toml"), "outputPath = \"./build\"\n").unwrap();

    umi()
        .args(["config", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outputPath\": \"./build\""))
        .stdout(predicate::str::contains("\"mountElementId\": \"root\""));
}

#[test]
fn test_config_env_override() {
    let temp = TempDir::new().unwrap();
    umi()
        .args(["config", "--cwd"])
        .arg(temp.path())
        .env("UMI_MOUNT_ELEMENT_ID", "container")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mountElementId\": \"container\""));
}

#[test]
fn test_config_validation_failure() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".umirc.toml"), "mountElementId = 42\n").unwrap();

    umi()
        .args(["config", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("mountElementId"));
}

#[test]
fn test_config_schema() {
    umi()
        .args(["config", "--schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"properties\""));
}

#[test]
fn test_page_generator() {
    let temp = TempDir::new().unwrap();

    umi()
        .arg("--cwd")
        .arg(temp.path())
        .args(["g", "page", "users"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Created pages/users.js"));
    assert!(temp.path().join("pages/users.js").is_file());

    umi()
        .arg("--cwd")
        .arg(temp.path())
        .args(["g", "page", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_unknown_generator() {
    let temp = TempDir::new().unwrap();
    umi()
        .arg("--cwd")
        .arg(temp.path())
        .args(["g", "layout", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown generator 'layout'"))
        .stderr(predicate::str::contains("page"));
}

#[test]
fn test_unknown_external_command() {
    let temp = TempDir::new().unwrap();
    umi()
        .arg("--cwd")
        .arg(temp.path())
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command 'deploy'"));
}

#[test]
fn test_missing_cwd() {
    umi()
        .args(["generate", "--cwd", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}
