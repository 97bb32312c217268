//! Integration tests: run the `docsite` binary with a scrubbed environment.

use std::process::{Command, Output, Stdio};

fn docsite(home: &std::path::Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docsite"));
    cmd.args(args)
        .current_dir(home)
        .env_clear()
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .stdin(Stdio::null());
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().expect("run docsite")
}

#[test]
fn submit_without_tty_prints_helpful_error() {
    let home = tempfile::tempdir().unwrap();
    let out = docsite(
        home.path(),
        &["feedback", "submit", "--page", "/guide", "--text", "typo"],
        &[("DOCSITE_STORE_OWNER", "acme"), ("DOCSITE_STORE_REPO", "docs")],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("interactive terminal"),
        "stderr should mention the terminal; got: {}",
        stderr
    );
}

#[test]
fn submit_without_store_config_fails() {
    let home = tempfile::tempdir().unwrap();
    let out = docsite(
        home.path(),
        &["feedback", "submit", "--page", "/guide", "--text", "typo"],
        &[],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DOCSITE_STORE_OWNER"), "got: {}", stderr);
}

#[test]
fn dry_run_composes_the_line() {
    let home = tempfile::tempdir().unwrap();
    let out = docsite(
        home.path(),
        &[
            "--output",
            "json",
            "feedback",
            "submit",
            "--dry-run",
            "--page",
            "/guide/install",
            "--text",
            "step 3\nis wrong",
        ],
        &[],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let receipt = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v["level"] == "data")
        .expect("receipt line");
    let line = receipt["data"]["line"].as_str().unwrap();
    assert!(line.contains("/guide/install"));
    assert!(line.ends_with("step 3 is wrong"));
    assert_eq!(receipt["data"]["dry_run"], true);
}

#[test]
fn dry_run_rejects_empty_note() {
    let home = tempfile::tempdir().unwrap();
    let out = docsite(
        home.path(),
        &["feedback", "submit", "--dry-run", "--page", "/guide", "--text", "   "],
        &[],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Please enter some feedback"), "got: {}", stderr);
}

#[test]
fn session_mint_requires_secret() {
    let home = tempfile::tempdir().unwrap();
    let out = docsite(home.path(), &["session", "mint", "--subject", "reader"], &[]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("DOCSITE_SESSION_SECRET"));
}

#[test]
fn session_mint_prints_token() {
    let home = tempfile::tempdir().unwrap();
    let out = docsite(
        home.path(),
        &["session", "mint", "--subject", "reader"],
        &[("DOCSITE_SESSION_SECRET", "test-secret-that-is-at-least-32-characters-long")],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let token = stdout.lines().next().unwrap();
    assert_eq!(token.split('.').count(), 3);
}
