//
//  bitbucket-insights
//  tests/cli_tests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

mod common;

use std::path::Path;

use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;

use bitbucket_insights::output::{read_export, SourceKind};
use common::{activity_json, commit_json, merged_repository, page, pr_json, PR_PATH, TOKEN, USERNAME};

/// A `bbi` invocation isolated from the user's configuration.
fn bbi(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bbi").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("BBI_CONFIG")
        .env_remove("BITBUCKET_URL")
        .env_remove("BITBUCKET_USERNAME")
        .env_remove("BITBUCKET_TOKEN")
        .env_remove("BITBUCKET_APP_PASSWORD")
        .env_remove("BBI_DEBUG");
    cmd
}

#[test]
fn version_prints_name_and_version() {
    let home = tempfile::tempdir().unwrap();
    bbi(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bbi version"));
}

#[test]
fn config_path_honours_flag() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("custom.toml");
    bbi(home.path())
        .args(["config", "path", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn config_show_redacts_token() {
    let home = tempfile::tempdir().unwrap();
    bbi(home.path())
        .args(["config", "show"])
        .env("BITBUCKET_URL", "https://bb.example.com")
        .env("BITBUCKET_TOKEN", "topsecret")
        .assert()
        .success()
        .stdout(predicate::str::contains("bb.example.com"))
        .stdout(predicate::str::contains("topsecret").not());
}

#[test]
fn extract_without_repositories_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    bbi(home.path())
        .arg("extract")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No repositories given"));
}

#[test]
fn extract_rejects_unknown_state() {
    let home = tempfile::tempdir().unwrap();
    bbi(home.path())
        .args(["extract", "--state", "closed", "--repo", "PROJ/app"])
        .assert()
        .code(2);
}

#[test]
fn extract_through_the_api() {
    let home = tempfile::tempdir().unwrap();
    let output = home.path().join("export.json");
    let mut server = mockito::Server::new();

    server
        .mock("GET", PR_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page(vec![pr_json(1, "MERGED")], 0, None))
        .create();
    server
        .mock("GET", format!("{}/1/activities", PR_PATH).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page(vec![activity_json(9, "APPROVED", "bob")], 0, None))
        .create();
    server
        .mock("GET", format!("{}/1/commits", PR_PATH).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page(vec![commit_json("abcdef0123"), commit_json("0123abcdef")], 0, None))
        .create();

    bbi(home.path())
        .env("BITBUCKET_URL", server.url())
        .env("BITBUCKET_USERNAME", USERNAME)
        .env("BITBUCKET_TOKEN", TOKEN)
        .args(["--json", "extract", "--repo", "PROJ/app", "--no-history", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"repo_slug\": \"app\""));

    let document = read_export(&output).unwrap();
    let repository = &document.repositories[0];
    assert_eq!(repository.source, SourceKind::Api);
    assert_eq!(repository.pull_requests.len(), 1);
    assert_eq!(repository.pull_requests[0].approvals.len(), 1);
    assert_eq!(repository.pull_requests[0].pull_request.commit_count, Some(2));
}

#[test]
fn extract_with_rejected_credentials_exits_with_auth_code() {
    let home = tempfile::tempdir().unwrap();
    let output = home.path().join("export.json");
    let mut server = mockito::Server::new();
    server.mock("GET", PR_PATH).match_query(Matcher::Any).with_status(401).create();

    bbi(home.path())
        .env("BITBUCKET_URL", server.url())
        .env("BITBUCKET_USERNAME", USERNAME)
        .env("BITBUCKET_TOKEN", "wrong")
        .args(["extract", "--repo", "PROJ/app", "--no-history", "--output"])
        .arg(&output)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("aborting repository"));

    let document = read_export(&output).unwrap();
    assert!(document.repositories[0].is_aborted());
}

#[test]
fn extract_from_local_history() {
    let home = tempfile::tempdir().unwrap();
    let clone = home.path().join("clone");
    std::fs::create_dir_all(&clone).unwrap();
    merged_repository(&clone, "https://bb.example.com/scm/PROJ/app.git");
    let output = home.path().join("export.json");

    bbi(home.path())
        .arg("extract")
        .arg(&clone)
        .args(["--source", "local", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("using local history"));

    let document = read_export(&output).unwrap();
    let repository = &document.repositories[0];
    assert_eq!(repository.source, SourceKind::LocalHistory);
    assert_eq!(repository.commits.len(), 4);
    assert_eq!(repository.pull_requests.len(), 1);
    assert_eq!(repository.pull_requests[0].pull_request.id, 7);
    assert_eq!(repository.pull_requests[0].pull_request.commit_count, Some(2));
}

#[test]
fn unconfigured_server_falls_back_to_local_history() {
    let home = tempfile::tempdir().unwrap();
    let clone = home.path().join("clone");
    std::fs::create_dir_all(&clone).unwrap();
    merged_repository(&clone, "https://bb.example.com/scm/PROJ/app.git");
    let output = home.path().join("export.json");

    bbi(home.path())
        .arg("extract")
        .arg(&clone)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("falling back to local history"));
}
