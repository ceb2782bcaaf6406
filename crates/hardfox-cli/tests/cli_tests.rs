//! Integration tests for the hardfox binary.
//!
//! Every test points `--config` at a scratch config whose profile library
//! lives in a temp dir, so the user's real config is never read.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use hardfox_test_utils::TestProfileDir;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
    config: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        let profiles = dir.path().join("profiles");
        fs::write(
            &config,
            format!(
                "profiles_dir = {:?}\n[write]\nfsync = false\n",
                profiles.to_string_lossy()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hardfox"));
        cmd.arg("--config").arg(&self.config).env_remove("RUST_LOG");
        cmd
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn help_lists_commands() {
    Env::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("recommend").and(predicate::str::contains("apply")));
}

#[test]
fn no_command_shows_help_hint() {
    Env::new()
        .cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("hardfox --help"));
}

// ============================================================================
// Catalog listings
// ============================================================================

#[test]
fn presets_are_listed() {
    Env::new()
        .cmd()
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("office").and(predicate::str::contains("privacy_pro")));
}

#[test]
fn settings_filter_by_category() {
    Env::new()
        .cmd()
        .args(["settings", "--category", "privacy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("privacy.resistFingerprinting"));
}

#[test]
fn unknown_category_is_an_error() {
    Env::new()
        .cmd()
        .args(["settings", "--category", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

// ============================================================================
// Recommend
// ============================================================================

#[test]
fn recommend_json_forces_fingerprinting_resistance_for_banking() {
    Env::new()
        .cmd()
        .args(["recommend", "banking", "--privacy", "strong", "--tolerance", "20", "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"privacy.resistFingerprinting\": true")
                .and(predicate::str::contains("\"base\": \"office\""))
                .and(predicate::str::contains("\"version\": \"1.0\"")),
        );
}

#[test]
fn recommend_explain_shows_overrides() {
    Env::new()
        .cmd()
        .args(["recommend", "banking", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("override for 'banking'"));
}

#[test]
fn invalid_privacy_level_is_rejected() {
    Env::new()
        .cmd()
        .args(["recommend", "--privacy", "extreme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown privacy level"));
}

// ============================================================================
// Apply
// ============================================================================

#[test]
fn apply_document_to_profile_directory() {
    let env = Env::new();
    let profile_dir = TestProfileDir::new()
        .with_marker()
        .with_file("prefs.js", "user_pref(\"keep.me\", 1);\n");
    let doc = env.path("banking.json");

    env.cmd()
        .args(["recommend", "banking", "--privacy", "strong", "--tolerance", "20", "--output"])
        .arg(&doc)
        .assert()
        .success();

    env.cmd()
        .arg("apply")
        .arg(&doc)
        .arg("--to")
        .arg(profile_dir.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("user.js"));

    profile_dir.assert_file_contains("user.js", "pref(\"privacy.resistFingerprinting\", true);");
    profile_dir.assert_file_contains("prefs.js", "user_pref(\"keep.me\", 1);");
    assert_eq!(profile_dir.backups_of("prefs.js").len(), 1);
}

#[test]
fn apply_json_reports_tiers() {
    let env = Env::new();
    let profile_dir = TestProfileDir::new().with_marker();
    let doc = env.path("p.json");
    env.cmd()
        .args(["recommend", "gaming", "--output"])
        .arg(&doc)
        .assert()
        .success();

    let output = env
        .cmd()
        .arg("apply")
        .arg(&doc)
        .arg("--to")
        .arg(profile_dir.root())
        .args(["--tier", "enforced", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tiers"].as_array().unwrap().len(), 1);
    assert_eq!(report["tiers"][0]["tier"], "enforced");
    profile_dir.assert_file_not_exists("prefs.js");
}

#[test]
fn apply_refuses_directories_that_are_not_profiles() {
    let env = Env::new();
    let target = TempDir::new().unwrap();
    let doc = env.path("p.json");
    env.cmd()
        .args(["recommend", "--output"])
        .arg(&doc)
        .assert()
        .success();

    env.cmd()
        .arg("apply")
        .arg(&doc)
        .arg("--to")
        .arg(target.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
    assert!(fs::read_dir(target.path()).unwrap().next().is_none());
}

// ============================================================================
// Library and import
// ============================================================================

#[test]
fn saved_profiles_can_be_listed_shown_and_deleted() {
    let env = Env::new();
    env.cmd()
        .args(["recommend", "gaming", "--privacy", "basic", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));

    env.cmd()
        .args(["profiles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gaming - Standard"));

    env.cmd()
        .args(["profiles", "show", "Gaming - Standard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("geo.enabled"));

    env.cmd()
        .args(["profiles", "delete", "Gaming - Standard", "--yes"])
        .assert()
        .success();

    env.cmd()
        .args(["profiles", "show", "Gaming - Standard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn saved_profile_applies_by_name() {
    let env = Env::new();
    let profile_dir = TestProfileDir::new().with_marker();
    env.cmd()
        .args(["recommend", "streaming", "--save"])
        .assert()
        .success();

    env.cmd()
        .args(["apply", "Streaming - Balanced", "--to"])
        .arg(profile_dir.root())
        .assert()
        .success();
    profile_dir.assert_file_contains("prefs.js", "user_pref(\"media.eme.enabled\", true);");
}

#[test]
fn import_reads_existing_values() {
    let env = Env::new();
    let profile_dir = TestProfileDir::new().with_marker().with_file(
        "prefs.js",
        "user_pref(\"geo.enabled\", false);\nuser_pref(\"unrelated.pref\", 3);\n",
    );

    env.cmd()
        .arg("import")
        .arg(profile_dir.root())
        .arg("--save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported from").and(predicate::str::contains("1 other")));

    let profiles = read(&env.path("profiles").join(
        fs::read_dir(env.path("profiles"))
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .find(|n| n.to_string_lossy().ends_with(".json"))
            .unwrap(),
    ));
    assert!(profiles.contains("\"geo.enabled\": false"));
}
