#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn devfleet(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("devfleet").unwrap();
    cmd.current_dir(dir.path()).env("DEVFLEET_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    devfleet(dir).arg("init").assert().success();
}

fn add_service(dir: &TempDir, name: &str, port: &str) {
    devfleet(dir)
        .args([
            "service",
            "add",
            name,
            "--repo",
            &format!("https://github.com/acme/{name}.git"),
            "--port",
            port,
        ])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// devfleet init
// ---------------------------------------------------------------------------

#[test]
fn init_scaffolds_project() {
    let dir = TempDir::new().unwrap();
    devfleet(&dir).arg("init").assert().success();

    assert!(dir.path().join("devfleet.yaml").exists());
    assert!(dir
        .path()
        .join("templates/docker-compose-template.yml")
        .exists());
    assert!(dir.path().join("templates/template.Dockerfile").exists());
    assert!(dir.path().join("repos").is_dir());
    assert!(dir.path().join("docker-compose.yml").exists());
    assert!(dir.path().join("docker-compose-develop.yml").exists());
    assert!(dir.path().join("docker-compose-stage.yml").exists());
    assert!(dir.path().join("docker-compose-production.yml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    devfleet(&dir).arg("init").assert().success();
    devfleet(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  devfleet.yaml"));
}

#[test]
fn init_environment_files_start_empty() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let yaml = std::fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let services = doc.get("services").unwrap();
    assert!(services.as_mapping().unwrap().is_empty());
    // Template passthrough fields survive into the stamped files.
    assert!(doc.get("networks").is_some());
}

// ---------------------------------------------------------------------------
// devfleet service
// ---------------------------------------------------------------------------

#[test]
fn service_add_wires_default_and_develop() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_service(&dir, "auth", "4000");

    let default: serde_yaml::Value = serde_yaml::from_str(
        &std::fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap(),
    )
    .unwrap();
    let auth = &default["services"]["auth"];
    assert_eq!(auth["image"].as_str(), Some("auth"));
    assert_eq!(
        auth["build"].as_str(),
        Some("https://github.com/acme/auth.git")
    );

    let develop: serde_yaml::Value = serde_yaml::from_str(
        &std::fs::read_to_string(dir.path().join("docker-compose-develop.yml")).unwrap(),
    )
    .unwrap();
    let auth_dev = &develop["services"]["auth"];
    assert_eq!(auth_dev["build"].as_str(), Some("./repos/auth"));
    assert_eq!(auth_dev["ports"][0].as_str(), Some("4000:4000"));
    assert_eq!(auth_dev["command"].as_str(), Some("npm run dev"));
}

#[test]
fn service_add_rejects_bad_name() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    devfleet(&dir)
        .args([
            "service",
            "add",
            "Bad Name",
            "--repo",
            "https://github.com/acme/auth.git",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid service name"));
}

#[test]
fn service_add_rejects_bad_repo_url() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    devfleet(&dir)
        .args(["service", "add", "auth", "--repo", "not-a-git-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid git repository url"));
}

#[test]
fn service_list_shows_added_service() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_service(&dir, "auth", "4000");

    devfleet(&dir)
        .args(["service", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn service_list_all_covers_every_environment() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_service(&dir, "auth", "4000");

    let output = devfleet(&dir)
        .args(["service", "list", "--env", "all", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(parsed["default"]["auth"].is_object());
    assert!(parsed["develop"]["auth"].is_object());
    // Not wired into stage/production by add.
    assert!(parsed["stage"].as_object().unwrap().is_empty());
}

#[test]
fn service_list_unknown_environment_is_empty_not_fatal() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    devfleet(&dir)
        .args(["service", "list", "--env", "nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No services."));
}

#[test]
fn service_show_prints_definition() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_service(&dir, "auth", "4000");

    devfleet(&dir)
        .args(["service", "show", "auth", "--env", "develop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4000:4000"));
}

#[test]
fn service_remove_deletes_from_selected_environments() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_service(&dir, "auth", "4000");

    devfleet(&dir)
        .args(["service", "remove", "auth", "--env", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed auth from default"));

    devfleet(&dir)
        .args(["service", "list", "--env", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No services."));
}

// ---------------------------------------------------------------------------
// devfleet env
// ---------------------------------------------------------------------------

#[test]
fn env_list_shows_configured_environments() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    devfleet(&dir)
        .args(["env", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default")
                .and(predicate::str::contains("develop"))
                .and(predicate::str::contains("stage"))
                .and(predicate::str::contains("production")),
        );
}

// ---------------------------------------------------------------------------
// devfleet setup
// ---------------------------------------------------------------------------

#[test]
fn setup_without_services_does_nothing() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    devfleet(&dir)
        .args([
            "setup",
            "--no-clone",
            "--no-checkout",
            "--no-install",
            "--no-copy-env",
            "--no-dockerfile",
            "--no-append",
        ])
        .assert()
        .success();
}

#[test]
fn setup_offline_reports_steps() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_service(&dir, "auth", "4000");

    devfleet(&dir)
        .args(["setup", "--no-clone", "--no-checkout", "--no-install"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("auth")
                .and(predicate::str::contains("append"))
                .and(predicate::str::contains("done")),
        );

    // The append step re-wires develop from the scaffold defaults.
    let develop: serde_yaml::Value = serde_yaml::from_str(
        &std::fs::read_to_string(dir.path().join("docker-compose-develop.yml")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        develop["services"]["auth"]["ports"][0].as_str(),
        Some("3030:3030")
    );
}

#[test]
fn setup_requires_initialization() {
    let dir = TempDir::new().unwrap();

    devfleet(&dir)
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
