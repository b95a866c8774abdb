//! Integration tests for the `extmarket` CLI binary.
//!
//! Catalog-backed commands run against `tests/fixtures/catalog.json`, so no
//! network endpoint is needed. Every command gets its own HOME and XDG
//! directories so saved preferences never leak between tests.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

/// Build a [`Command`] for the `extmarket` binary isolated under `home`.
fn extmarket_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("extmarket");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("EXTMARKET_URL")
        .env_remove("EXTMARKET_API_KEY")
        .env_remove("EXTMARKET_OUTPUT")
        .env_remove("EXTMARKET_TIMEOUT")
        .env_remove("EXTMARKET_FEED__PAGE_SIZE")
        .env_remove("RUST_LOG");
    cmd
}

/// Run `browse` over the fixture with JSON output and parse the view.
fn browse_json(home: &TempDir, extra: &[&str]) -> Value {
    let fixture = fixture();
    let output = extmarket_cmd(home)
        .args(["-o", "json", "browse", "--fixture"])
        .arg(&fixture)
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "browse failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn item_names(view: &Value) -> Vec<String> {
    view["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_owned())
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = extmarket_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("browse")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("prefs"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("extmarket"));
}

// ── Browse ──────────────────────────────────────────────────────────

#[test]
fn test_browse_first_page_by_name() {
    let home = TempDir::new().unwrap();
    let view = browse_json(&home, &["--sort", "name"]);

    assert_eq!(
        item_names(&view),
        vec![
            "ipywidgets",
            "jupyterlab-git",
            "jupyterlab-lsp",
            "jupyterlab-spreadsheet-editor",
            "jupyterlab-theme-solarized",
        ]
    );
    assert_eq!(view["total_count"], 5);
    assert_eq!(view["has_more"], false);
    assert_eq!(view["state"]["state"], "loaded");
    assert_eq!(view["params"]["sort"], "name");
}

#[test]
fn test_browse_scrolls_through_pages() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();

    let output = extmarket_cmd(&home)
        .env("EXTMARKET_FEED__PAGE_SIZE", "2")
        .args(["-o", "json", "browse", "--sort", "name", "--pages", "2", "--fixture"])
        .arg(&fixture)
        .output()
        .unwrap();
    assert!(output.status.success());
    let view: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(
        item_names(&view),
        vec!["ipywidgets", "jupyterlab-git", "jupyterlab-lsp", "jupyterlab-spreadsheet-editor"]
    );
    assert_eq!(view["page_index"], 1);
    assert_eq!(view["has_more"], true);

    // Asking for more pages than exist stops at the end of the catalog
    let output = extmarket_cmd(&home)
        .env("EXTMARKET_FEED__PAGE_SIZE", "2")
        .args(["-o", "json", "browse", "--sort", "name", "--pages", "10", "--fixture"])
        .arg(&fixture)
        .output()
        .unwrap();
    let view: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(item_names(&view).len(), 5);
    assert_eq!(view["page_index"], 2);
    assert_eq!(view["has_more"], false);
}

#[test]
fn test_browse_search_and_filters() {
    let home = TempDir::new().unwrap();

    let view = browse_json(&home, &["--sort", "name", "--search", "  GIT "]);
    assert_eq!(item_names(&view), vec!["jupyterlab-git"]);

    let view = browse_json(&home, &["--sort", "name", "--category", "widgets"]);
    assert_eq!(item_names(&view), vec!["ipywidgets"]);

    let view = browse_json(&home, &["--sort", "github_stars", "--lab-version", "3"]);
    assert_eq!(
        item_names(&view),
        vec![
            "ipywidgets",
            "jupyterlab-lsp",
            "jupyterlab-git",
            "jupyterlab-theme-solarized",
        ]
    );
}

#[test]
fn test_browse_plain_prints_ids() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    extmarket_cmd(&home)
        .args(["-o", "plain", "browse", "--sort", "github_stars", "--fixture"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout("3\n2\n1\n5\n4\n");
}

#[test]
fn test_browse_empty_result_table() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    extmarket_cmd(&home)
        .args(["browse", "--sort", "name", "--search", "no-such-extension", "--fixture"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("No extensions found"));
}

#[test]
fn test_browse_table_has_heading_and_status() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    extmarket_cmd(&home)
        .args(["browse", "--sort", "name", "--search", "jupyterlab", "--fixture"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("4 Extensions matching \"jupyterlab\"")
                .and(predicate::str::contains("jupyterlab-lsp"))
                .and(predicate::str::contains(
                    "Showing 4 of 4 extensions matching \"jupyterlab\", sorted by Name (A-Z)",
                )),
        );
}

#[test]
fn test_browse_rejects_unknown_sort() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .args(["browse", "--sort", "stars"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sort"));
}

#[test]
fn test_browse_rejects_unknown_version() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    extmarket_cmd(&home)
        .args(["browse", "--lab-version", "5", "--fixture"])
        .arg(&fixture)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("JupyterLab version"));
}

#[test]
fn test_browse_without_endpoint_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .args(["browse", "--sort", "name"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No catalog endpoint configured"));
}

#[test]
fn test_browse_missing_fixture_fails() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .args(["browse", "--fixture", "/nonexistent/catalog.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read fixture"));
}

// ── Preferences ─────────────────────────────────────────────────────

#[test]
fn test_explicit_sort_is_remembered() {
    let home = TempDir::new().unwrap();

    browse_json(&home, &["--sort", "github_stars", "--lab-version", "4"]);

    // No flags: the saved choices come back
    let view = browse_json(&home, &[]);
    assert_eq!(view["params"]["sort"], "github_stars");
    assert_eq!(view["params"]["version"], "4");
    assert_eq!(
        item_names(&view),
        vec![
            "ipywidgets",
            "jupyterlab-lsp",
            "jupyterlab-git",
            "jupyterlab-spreadsheet-editor",
        ]
    );
}

#[test]
fn test_prefs_set_show_clear() {
    let home = TempDir::new().unwrap();

    extmarket_cmd(&home)
        .args(["prefs", "set", "--sort", "last_updated", "--lab-version", "all"])
        .assert()
        .success();

    let output = extmarket_cmd(&home)
        .args(["-o", "json", "prefs", "show"])
        .output()
        .unwrap();
    let prefs: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(prefs["sort"], "last_updated");
    assert_eq!(prefs["version"], "all");
    assert_eq!(prefs["stored"]["sortBy"], "last_updated");
    assert_eq!(prefs["stored"]["selectedVersion"], "all");

    extmarket_cmd(&home).args(["prefs", "clear"]).assert().success();

    extmarket_cmd(&home)
        .args(["-o", "plain", "prefs", "show"])
        .assert()
        .success()
        .stdout("sort=new_and_rising\nversion=all\n");
}

#[test]
fn test_prefs_set_requires_a_value() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .args(["prefs", "set"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--sort"));
}

// ── Show ────────────────────────────────────────────────────────────

#[test]
fn test_show_detail_json() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    let output = extmarket_cmd(&home)
        .args(["-o", "json", "show", "1", "--fixture"])
        .arg(&fixture)
        .output()
        .unwrap();
    assert!(output.status.success());

    let detail: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["name"], "jupyterlab-git");
    assert_eq!(detail["license"], "BSD-3-Clause");
    assert_eq!(detail["lab_versions"], serde_json::json!(["3", "4"]));
    assert!(detail["trending_score"].as_f64().unwrap() > 0.0);
    assert!(detail["updated"].as_str().unwrap().starts_with("Updated "));
}

#[test]
fn test_show_table_lists_fields() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    extmarket_cmd(&home)
        .args(["show", "1", "--fixture"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("jupyterlab-git 0.50.0")
                .and(predicate::str::contains("A Git extension for JupyterLab"))
                .and(predicate::str::contains("BSD-3-Clause")),
        );
}

#[test]
fn test_show_unknown_id_is_not_found() {
    let home = TempDir::new().unwrap();
    let fixture = fixture();
    extmarket_cmd(&home)
        .args(["show", "99", "--fixture"])
        .arg(&fixture)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[feed]").and(predicate::str::contains("page_size = 50")));
}

#[test]
fn test_config_show_masks_api_key() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("config").join("extmarket");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[endpoint]\nurl = \"https://cat.example.co\"\napi_key = \"anon-secret\"\n",
    )
    .unwrap();

    extmarket_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://cat.example.co")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("anon-secret").not()),
        );
}

#[test]
fn test_config_path_is_under_config_home() {
    let home = TempDir::new().unwrap();
    extmarket_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    let output = extmarket_cmd(&home)
        .args(["--output", "invalid", "config", "show"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}
