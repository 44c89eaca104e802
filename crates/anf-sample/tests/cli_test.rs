#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("anf-sample").unwrap();
    cmd.env_remove("ANF_SAMPLE_CONFIG")
        .env_remove("AZURE_AUTH_LOCATION")
        .env("NO_COLOR", "1");
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Azure NetApp Files"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("cleanup"))
        .stdout(predicate::str::contains("show-config"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("anf-sample"));
}

/// runコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_run_help() {
    cmd()
        .arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--keep-resources"))
        .stdout(predicate::str::contains("--account"))
        .stdout(predicate::str::contains("--config"));
}

/// cleanupコマンドはアカウント名が必須
#[test]
fn test_cleanup_requires_account() {
    cmd()
        .arg("cleanup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--account"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    cmd().arg("invalid-command").assert().failure();
}

/// 認証ファイル未指定で run するとリソース作成前に失敗する
#[test]
fn test_run_without_auth_location() {
    let temp_dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(temp_dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_AUTH_LOCATION"));
}

/// 認証ファイルが壊れていると失敗する
#[test]
fn test_run_with_malformed_auth_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let auth_path = temp_dir.path().join("azureauth.json");
    fs::write(&auth_path, "{ not json").unwrap();

    cmd()
        .current_dir(temp_dir.path())
        .env("AZURE_AUTH_LOCATION", &auth_path)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("認証ファイル"));
}

/// 設定が不正ならリソース作成前に失敗する
#[test]
fn test_run_with_invalid_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("anf-sample.yaml");
    fs::write(&config_path, "capacity_pool:\n  size_bytes: 1024\n").unwrap();
    let auth_path = temp_dir.path().join("azureauth.json");
    fs::write(
        &auth_path,
        r#"{"clientId":"c","clientSecret":"s","subscriptionId":"sub","tenantId":"t"}"#,
    )
    .unwrap();

    cmd()
        .current_dir(temp_dir.path())
        .env("AZURE_AUTH_LOCATION", &auth_path)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("capacity_pool.size_bytes"));
}

/// show-config はカレントディレクトリの設定を表示する
#[test]
fn test_show_config_from_current_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("anf-sample.yaml"),
        "location: northeurope\ncleanup: false\n",
    )
    .unwrap();

    cmd()
        .current_dir(temp_dir.path())
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("northeurope"))
        .stdout(predicate::str::contains("cleanup: false"));
}

/// --config で存在しないファイルを指定するとエラー
#[test]
fn test_show_config_missing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(temp_dir.path())
        .arg("show-config")
        .arg("--config")
        .arg(temp_dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("設定ファイルが見つかりません"));
}
