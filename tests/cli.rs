mod common;

use assert_cmd::Command;
use common::MockApi;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn filestore() -> Command {
    let mut cmd = Command::cargo_bin("filestore").expect("binary built");
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("GEMINI_API_BASE_URL")
        .env_remove("GEMINI_UPLOAD_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_key_fails() {
    filestore()
        .arg("--action=list")
        .assert()
        .failure()
        .stdout(predicate::str::contains("no API key"));
}

#[test]
fn missing_storage_name_prints_usage() {
    filestore()
        .args(["--action=create", "--key=k"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Usage: filestore --action=create --storage-name=<name>",
        ));
}

#[test]
fn upload_without_folder_prints_usage() {
    filestore()
        .args(["--action=upload", "--storage-name=Docs", "--key=k"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("--folder=<path>"));
}

#[test]
fn unknown_action_is_rejected() {
    filestore()
        .args(["--action=purge", "--key=k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn upload_from_missing_folder_fails_before_any_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    filestore()
        .args(["--action=upload", "--storage-name=Docs", "--key=k"])
        .arg(format!("--folder={}", dir.path().join("absent").display()))
        .arg("--base-url=http://127.0.0.1:9/v1beta")
        .assert()
        .failure()
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn list_against_mock_server() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1beta/fileSearchStores"))
            .and(query_param("key", "env-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fileSearchStores": [{"name": "fileSearchStores/docs-123", "displayName": "Docs"}]
            })))
            .expect(1),
    );

    filestore()
        .env("GEMINI_API_KEY", "env-key")
        .env("GEMINI_API_BASE_URL", api.base_url())
        .arg("--action=list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Docs").and(predicate::str::contains(
            "fileSearchStores/docs-123",
        )));
    api.verify();
}

#[test]
fn api_error_exits_with_failure() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("POST"))
            .and(path("/v1beta/fileSearchStores"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad display name")),
    );

    filestore()
        .args(["--action=create", "--storage-name=Docs", "--key=k"])
        .arg(format!("--base-url={}", api.base_url()))
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Error: Error creating storage: HTTP Error 400: bad display name",
        ));
}

#[test]
fn interactive_blank_key_from_pipe_exits() {
    filestore()
        .write_stdin("   \n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("API Key not provided. Exiting."));
}

#[test]
fn interactive_session_reads_piped_answers() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1beta/fileSearchStores"))
            .and(query_param("key", "piped-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fileSearchStores": [{"name": "fileSearchStores/docs-123", "displayName": "Docs"}]
            })))
            .expect(1),
    );

    filestore()
        .env("GEMINI_API_BASE_URL", api.base_url())
        .write_stdin(" piped-key \n1\n\nq\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Available File Stores:")
                .and(predicate::str::contains("fileSearchStores/docs-123"))
                .and(predicate::str::contains("Goodbye!")),
        );
    api.verify();
}
