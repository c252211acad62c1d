//! CLI integration tests for dmr-client
//!
//! End-to-end runs of the binary against temporary local repositories,
//! covering output formats and the exit-code contract.

use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn dmr_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("dmr-client").unwrap()
}

/// Write a model document at its convention path under `repo`.
fn add_model(repo: &Path, relative: &str, content: &str) {
    let path = repo.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Repository with DeviceA -> DeviceB -> (nothing).
fn setup_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    add_model(
        dir.path(),
        "dtmi/com/example/devicea-1.json",
        &json!({
            "@id": "dtmi:com:example:DeviceA;1",
            "@type": "Interface",
            "extends": ["dtmi:com:example:DeviceB;1"]
        })
        .to_string(),
    );
    add_model(
        dir.path(),
        "dtmi/com/example/deviceb-1.json",
        &json!({"@id": "dtmi:com:example:DeviceB;1", "@type": "Interface"}).to_string(),
    );
    dir
}

#[test]
fn test_export_space_format() {
    let repo = setup_repo();

    dmr_cmd()
        .arg("export")
        .arg("dtmi:com:example:DeviceA;1")
        .arg("--repo")
        .arg(repo.path())
        .arg("--format")
        .arg("space")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "dtmi:com:example:DeviceA;1 dtmi:com:example:DeviceB;1",
        ));
}

#[test]
fn test_export_json_format_contains_documents() {
    let repo = setup_repo();

    let output = dmr_cmd()
        .arg("export")
        .arg("dtmi:com:example:DeviceA;1")
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let documents: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(documents.as_array().unwrap().len(), 2);
}

#[test]
fn test_export_disabled_deps() {
    let repo = setup_repo();

    dmr_cmd()
        .arg("export")
        .arg("dtmi:com:example:DeviceA;1")
        .arg("--repo")
        .arg(repo.path())
        .arg("--deps")
        .arg("disabled")
        .arg("--format")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("dtmi:com:example:DeviceA;1").and(
            predicate::str::contains("DeviceB").not(),
        ));
}

#[test]
fn test_export_writes_output_file() {
    let repo = setup_repo();
    let out = repo.path().join("export.json");

    dmr_cmd()
        .arg("export")
        .arg("dtmi:com:example:DeviceA;1")
        .arg("--repo")
        .arg(repo.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("dtmi:com:example:DeviceA;1"));
}

#[test]
fn test_export_missing_model_exits_3() {
    let repo = setup_repo();

    dmr_cmd()
        .arg("export")
        .arg("dtmi:com:example:Missing;1")
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_export_invalid_dtmi_exits_1() {
    let repo = setup_repo();

    dmr_cmd()
        .arg("export")
        .arg("dtmi:com:example:NoVersion")
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid DTMI format"));
}

#[test]
fn test_validate_conformant_file() {
    let repo = setup_repo();

    dmr_cmd()
        .arg("validate")
        .arg(repo.path().join("dtmi/com/example/devicea-1.json"))
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation passed"));
}

#[test]
fn test_validate_foreign_namespace_exits_2() {
    let repo = TempDir::new().unwrap();
    add_model(
        repo.path(),
        "dtmi/com/example/devicea-1.json",
        &json!({
            "@id": "dtmi:com:example:DeviceA;1",
            "contents": [
                {"@type": "Property", "@id": "dtmi:com:other:Prop;1",
                 "name": "p", "schema": "boolean"}
            ]
        })
        .to_string(),
    );

    dmr_cmd()
        .arg("validate")
        .arg(repo.path().join("dtmi/com/example/devicea-1.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("root namespace"));
}

#[test]
fn test_validate_remote_repo_rejected() {
    let repo = setup_repo();

    dmr_cmd()
        .arg("validate")
        .arg(repo.path().join("dtmi/com/example/devicea-1.json"))
        .arg("--repo")
        .arg("https://devicemodels.azure.com")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requires a local repository"));
}

#[test]
fn test_path_command() {
    dmr_cmd()
        .arg("path")
        .arg("dtmi:com:example:Thermostat;1")
        .assert()
        .success()
        .stdout(predicate::str::contains("dtmi/com/example/thermostat-1.json"));

    dmr_cmd()
        .arg("path")
        .arg("dtmi:com:example:Thermostat;1")
        .arg("--expanded")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "dtmi/com/example/thermostat-1.expanded.json",
        ));
}

#[test]
fn test_path_invalid_dtmi_exits_1() {
    dmr_cmd()
        .arg("path")
        .arg("com:example:Thermostat;1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid DTMI format"));
}
