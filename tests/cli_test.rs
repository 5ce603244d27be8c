//! CLI end-to-end tests.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[allow(deprecated)]
fn reelquest_cmd() -> Command {
    let mut cmd = Command::cargo_bin("reelquest").unwrap();
    for var in [
        "OVERSEERR_URL",
        "OVERSEERR_API_KEY",
        "TMDB_API_KEY",
        "TMDB_LANGUAGE",
        "REELQUEST_HOST",
        "REELQUEST_PORT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn no_args_shows_usage() {
    reelquest_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_commands() {
    reelquest_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reelquest"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("cancel"));
}

#[test]
fn version_command() {
    reelquest_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn validate_reports_config_file_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reelquest.json");
    fs::write(
        &path,
        r#"{
            "server": { "port": 8080 },
            "tracking": { "url": "http://overseerr.local:5055", "api_key": "k" },
            "catalog": { "api_key": "t" }
        }"#,
    )
    .unwrap();

    reelquest_cmd()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains(":8080"))
        .stdout(predicate::str::contains("http://overseerr.local:5055"));
}

#[test]
fn validate_names_missing_services() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reelquest.json");
    fs::write(&path, "{}").unwrap();

    reelquest_cmd()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("OVERSEERR_URL"))
        .stdout(predicate::str::contains("TMDB_API_KEY"));
}

#[test]
fn validate_rejects_broken_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    reelquest_cmd()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn status_rejects_unknown_media_type() {
    reelquest_cmd()
        .args(["status", "person", "287"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("person"));
}

#[test]
fn status_without_tracking_service_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reelquest.json");
    fs::write(&path, "{}").unwrap();

    reelquest_cmd()
        .args(["--config", path.to_str().unwrap(), "status", "movie", "550"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OVERSEERR_URL"));
}

#[test]
fn one_shot_commands_require_tracking_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reelquest.json");
    fs::write(&path, r#"{ "tracking": { "url": "http://127.0.0.1:9" } }"#).unwrap();
    let config = path.to_str().unwrap();

    for args in [
        vec!["status", "movie", "550"],
        vec!["request", "movie", "550"],
        vec!["cancel", "42"],
    ] {
        reelquest_cmd()
            .args(["--config", config])
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("OVERSEERR_API_KEY"))
            .stdout(predicate::str::contains("unknown").not());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn status_suggests_request_for_missing_title() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let seerr = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/movie/550"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 550 })))
        .mount(&seerr)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/request"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
        )
        .mount(&seerr)
        .await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("reelquest.json");
    fs::write(
        &path,
        format!(r#"{{ "tracking": {{ "url": "{}", "api_key": "k" }} }}"#, seerr.uri()),
    )
    .unwrap();

    let config = path.to_str().unwrap().to_string();
    tokio::task::spawn_blocking(move || {
        reelquest_cmd()
            .args(["--config", &config, "status", "movie", "550"])
            .assert()
            .success()
            .stdout(predicate::str::contains("movie-550: not_available"))
            .stdout(predicate::str::contains("reelquest request movie 550"));
    })
    .await
    .unwrap();
}
