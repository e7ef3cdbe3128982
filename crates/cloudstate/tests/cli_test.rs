#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use predicates::prelude::*;

fn cloudstate() -> Command {
    Command::cargo_bin("cloudstate").unwrap()
}

#[test]
fn test_cli_help() {
    cloudstate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("id"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_cli_version() {
    cloudstate()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cloudstate"));
}

#[test]
fn test_id_encode() {
    cloudstate()
        .args(["id", "encode", "request_id=r1", "project_id=p1"])
        .assert()
        .success()
        .stdout("cHJvamVjdF9pZA==:cDE=-cmVxdWVzdF9pZA==:cjE=\n");
}

#[test]
fn test_id_encode_rejects_bad_pair() {
    cloudstate()
        .args(["id", "encode", "project_id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn test_id_decode() {
    cloudstate()
        .args(["id", "decode", "cHJvamVjdF9pZA==:cDE=-cmVxdWVzdF9pZA==:cjE="])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""project_id": "p1""#))
        .stdout(predicate::str::contains(r#""request_id": "r1""#));
}

#[test]
fn test_id_decode_expect_mismatch() {
    cloudstate()
        .args([
            "id",
            "decode",
            "cHJvamVjdF9pZA==:cDE=",
            "--expect",
            "project_id,request_id",
        ])
        .assert()
        .failure();
}

#[test]
fn test_id_decode_garbage() {
    cloudstate()
        .args(["id", "decode", "not-a-state-id"])
        .assert()
        .failure();
}

#[test]
fn test_resources() {
    cloudstate()
        .arg("resources")
        .assert()
        .success()
        .stdout(predicate::str::contains("federated_settings_identity_provider"))
        .stdout(predicate::str::contains("ldap_verify"))
        .stdout(predicate::str::contains(
            "{instance_name}-{project_id}-{connection_name}",
        ));
}

#[test]
fn test_read_without_token() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings = temp_dir.path().join("cloudstate.yaml");
    std::fs::write(&settings, "base_url: http://127.0.0.1:9\n").unwrap();

    cloudstate()
        .current_dir(temp_dir.path())
        .env("CLOUDSTATE_CONFIG_PATH", &settings)
        .env_remove("ATLAS_ACCESS_TOKEN")
        .args(["read", "ldap_verify", "cHJvamVjdF9pZA==:cDE="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Atlas access token"));
}

#[test]
fn test_unknown_resource_type() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings = temp_dir.path().join("cloudstate.yaml");
    std::fs::write(&settings, "").unwrap();

    cloudstate()
        .current_dir(temp_dir.path())
        .env("CLOUDSTATE_CONFIG_PATH", &settings)
        .env("ATLAS_ACCESS_TOKEN", "token")
        .env_remove("ATLAS_BASE_URL")
        .args(["import", "cluster", "x-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resource type: cluster"));
}

#[test]
fn test_delete_requires_confirmation() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings = temp_dir.path().join("cloudstate.yaml");
    std::fs::write(&settings, "").unwrap();

    cloudstate()
        .current_dir(temp_dir.path())
        .env("CLOUDSTATE_CONFIG_PATH", &settings)
        .env("ATLAS_ACCESS_TOKEN", "token")
        .env_remove("ATLAS_BASE_URL")
        .args([
            "delete",
            "ldap_verify",
            "cHJvamVjdF9pZA==:cDE=-cmVxdWVzdF9pZA==:cjE=",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}
