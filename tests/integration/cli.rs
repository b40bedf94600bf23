//! The `tplcheck` binary run against the repository's own configuration.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

use tplcheck_cli::test_utils::{TemplateWorkspace, repo_config_path};

fn tplcheck() -> Result<Command> {
    let mut cmd = Command::cargo_bin("tplcheck")?;
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd.arg("--config").arg(repo_config_path());
    Ok(cmd)
}

#[test]
fn test_verify_repo_templates() -> Result<()> {
    tplcheck()?
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered").and(predicate::str::contains("1 deferred")));
    Ok(())
}

#[test]
fn test_verify_json_output() -> Result<()> {
    let output = tplcheck()?.args(["verify", "--format", "json", "--coverage"]).output()?;
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(results["valid"], true);
    assert_eq!(results["deferred_rendered"], 1);
    assert_eq!(results["skipped"], 43);
    assert!(results["coverage"]["functional"].as_array().is_some_and(Vec::is_empty));
    Ok(())
}

#[test]
fn test_verify_only_filter() -> Result<()> {
    let output = tplcheck()?.args(["verify", "--only", "zerver/emails/*", "--format", "json"]).output()?;
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(results["rendered"], 6);
    assert_eq!(results["deferred_rendered"], 0);
    Ok(())
}

#[test]
fn test_list_skipped_json() -> Result<()> {
    let output = tplcheck()?.args(["list", "--skipped", "--format", "json"]).output()?;
    assert!(output.status.success());

    let entries: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(entries.len(), 43);
    assert!(entries.iter().any(|e| e["name"] == "analytics/activity.html" && e["reasons"][0] == "defer"));
    Ok(())
}

#[test]
fn test_skips_strict_passes_on_repo() -> Result<()> {
    tplcheck()?
        .args(["skips", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("listed twice under unusual"));
    Ok(())
}

#[test]
fn test_render_with_override() -> Result<()> {
    tplcheck()?
        .args(["render", "zerver/login.html", "--set", "product_name=Acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Log in to Acme"));
    Ok(())
}

#[test]
fn test_render_unknown_template_fails() -> Result<()> {
    tplcheck()?
        .args(["render", "zerver/logn.html"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Template not found: 'zerver/logn.html'"))
        .stderr(predicate::str::contains("zerver/login.html"));
    Ok(())
}

#[test]
fn test_verify_reports_broken_template() -> Result<()> {
    let ws = TemplateWorkspace::new()?;
    let config = ws.write_config("template_dirs = [\"templates\"]\n\n[skip]\ndefer = []\n")?;
    ws.write_template("ok.html", "{{ product_name }}")?;
    ws.write_template("zz_broken.html", "{{ no_such_variable }}")?;

    let output = Command::cargo_bin("tplcheck")?
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config)
        .args(["verify", "--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(results["valid"], false);
    assert_eq!(results["failed_template"], "zz_broken.html");
    Ok(())
}

#[test]
fn test_missing_config_fails() -> Result<()> {
    let ws = TemplateWorkspace::new()?;
    Command::cargo_bin("tplcheck")?
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(ws.root().join("missing.toml"))
        .arg("verify")
        .assert()
        .failure()
        .code(1);
    Ok(())
}
