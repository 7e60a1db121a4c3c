use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::json;
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Nothing listens here; tests that must not reach the network point at it.
const DEAD_API: &str = "http://127.0.0.1:9";

fn pikarama(home: &Path, api: &str) -> Command {
    let mut cmd = Command::cargo_bin("pikarama").expect("pikarama binary is built");
    cmd.env("PIKARAMA_HOME", home)
        .env("PIKARAMA_API_URL", api)
        .env_remove("PIKARAMA_LOG");
    cmd
}

fn store_token(home: &Path, token: &str) -> Result<(), Box<dyn Error>> {
    std::fs::write(home.join("config.json"), json!({ "token": token }).to_string())?;
    Ok(())
}

#[test]
fn help_lists_commands() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    pikarama(home.path(), DEAD_API)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("groups").and(contains("events")).and(contains("poll")));
    Ok(())
}

#[test]
fn logout_without_config_succeeds() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    pikarama(home.path(), DEAD_API)
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Logged out. Stored token removed."));
    Ok(())
}

#[test]
fn logout_removes_stored_token() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    store_token(home.path(), "pk_test")?;
    pikarama(home.path(), DEAD_API).arg("logout").assert().success();

    pikarama(home.path(), DEAD_API)
        .arg("karma")
        .assert()
        .code(1)
        .stderr(contains("You must log in first"));
    Ok(())
}

#[test]
fn commands_need_a_token() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    pikarama(home.path(), DEAD_API)
        .args(["groups", "--json"])
        .assert()
        .code(1)
        .stderr(contains("Error: You must log in first"));
    Ok(())
}

#[test]
fn poll_needs_two_options_before_any_request() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    store_token(home.path(), "pk_test")?;
    pikarama(home.path(), DEAD_API)
        .args(["poll", "t1", "Lunch?", "-o", "Tacos"])
        .assert()
        .code(1)
        .stderr(contains("Please provide at least two poll options."));
    Ok(())
}

#[test]
fn login_rejects_malformed_token() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    pikarama(home.path(), DEAD_API)
        .args(["login", "sk_nope"])
        .assert()
        .code(1)
        .stderr(contains("Token should start with pk_"));
    assert!(!home.path().join("config.json").exists());
    Ok(())
}

#[test]
fn menu_without_terminal_fails() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    store_token(home.path(), "pk_test")?;
    pikarama(home.path(), DEAD_API)
        .assert()
        .code(1)
        .stderr(contains("needs a terminal"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn groups_json_prints_normalized_list() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(header("authorization", "Bearer pk_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [{ "id": "g1", "name": "Crew", "members_count": 4 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempdir()?;
    store_token(home.path(), "pk_test")?;
    let (home_path, uri) = (home.path().to_path_buf(), server.uri());
    let output = tokio::task::spawn_blocking(move || {
        pikarama(&home_path, &uri).args(["groups", "--json"]).output()
    })
    .await??;

    assert!(output.status.success());
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(printed, json!([{ "id": "g1", "name": "Crew", "members_count": 4 }]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_vote_is_a_warning() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events/e1/vote"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "error": "Already voted" })))
        .mount(&server)
        .await;

    let home = tempdir()?;
    store_token(home.path(), "pk_test")?;
    let (home_path, uri) = (home.path().to_path_buf(), server.uri());
    let output = tokio::task::spawn_blocking(move || {
        pikarama(&home_path, &uri).args(["events", "vote", "e1", "s1"]).output()
    })
    .await??;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("You already voted for this option."));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn api_errors_exit_with_status_one() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Event not found" })))
        .mount(&server)
        .await;

    let home = tempdir()?;
    store_token(home.path(), "pk_test")?;
    let (home_path, uri) = (home.path().to_path_buf(), server.uri());
    let output = tokio::task::spawn_blocking(move || {
        pikarama(&home_path, &uri).args(["events", "show", "missing"]).output()
    })
    .await??;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API error (404): 404 Not Found"));
    assert!(stderr.contains("\"error\": \"Event not found\""));
    Ok(())
}
