//! Applying profiles to scratch browser profile directories

use std::fs;
use std::sync::Arc;

use hardfox_catalog::{Catalog, PrivacyLevel, Tier};
use hardfox_core::{
    ApplyOptions, ApplyOrchestrator, Error, IntentAnalyzer, IntentInput, Profile, TierFilter,
};
use hardfox_fs::DirectoryGuard;
use hardfox_prefs::{PrefMap, PrefValue};
use hardfox_test_utils::{TestProfileDir, small_catalog};
use pretty_assertions::assert_eq;

fn orchestrator(catalog: Arc<Catalog>) -> ApplyOrchestrator {
    ApplyOrchestrator::new(catalog, ApplyOptions::default())
}

fn everyday(catalog: &Arc<Catalog>) -> Profile {
    IntentAnalyzer::new(catalog.clone())
        .recommend(&IntentInput::new(Vec::<&str>::new(), PrivacyLevel::Basic, 50))
}

#[test]
fn tiers_go_to_their_files() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new()
        .with_marker()
        .with_file("prefs.js", "user_pref(\"keep.me\", 1);\nuser_pref(\"geo.enabled\", false);\n")
        .with_file("user.js", "user_pref(\"stale.entry\", true);\n");

    let result = orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::All)
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.written(Tier::Baseline), 2);
    assert_eq!(result.written(Tier::Enforced), 2);
    assert_eq!(result.outcome(Tier::Baseline).unwrap().preserved, 1);

    assert_eq!(
        dir.read("prefs.js"),
        "user_pref(\"browser.cache.memory.capacity\", 256);\n\
         user_pref(\"geo.enabled\", true);\n\
         user_pref(\"keep.me\", 1);\n"
    );
    assert_eq!(
        dir.read("user.js"),
        "pref(\"network.trr.mode\", 0);\n\
         pref(\"privacy.resistFingerprinting\", false);\n"
    );
    assert_eq!(dir.backups_of("prefs.js").len(), 1);
    assert_eq!(dir.backups_of("user.js").len(), 1);
}

#[test]
fn merge_drops_comments_but_backup_keeps_them() {
    let catalog = small_catalog();
    let original = "// Mozilla User Preferences\n\
                    sticky_pref(\"x\", 1);\n\
                    user_pref(\"keep.me\", 1);\n";
    let dir = TestProfileDir::new()
        .with_marker()
        .with_file("prefs.js", original);

    let result = orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::Baseline)
        .unwrap();
    assert!(result.is_success());

    let prefs = dir.read("prefs.js");
    assert!(prefs.contains("user_pref(\"keep.me\", 1);"));
    assert!(!prefs.contains("Mozilla User Preferences"));
    assert!(!prefs.contains("sticky_pref"));
    assert_eq!(
        result
            .warnings
            .iter()
            .filter(|w| w.starts_with("prefs.js: "))
            .count(),
        2
    );

    let backups = dir.backups_of("prefs.js");
    assert_eq!(backups.len(), 1);
    assert_eq!(dir.read(&backups[0]), original);
}

#[test]
fn apply_leaves_no_lock_files_behind() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new().with_marker();

    orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::All)
        .unwrap();

    let names = dir.file_names();
    assert!(names.iter().all(|n| !n.ends_with(".lock")), "{names:?}");
    assert!(names.contains(&"prefs.js".to_string()));
    assert!(names.contains(&"user.js".to_string()));
}

#[test]
fn second_apply_is_byte_identical_and_takes_no_backup() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new()
        .with_marker()
        .with_file("prefs.js", "user_pref(\"keep.me\", \"x;y\");\n");
    let apply = orchestrator(catalog.clone());
    let profile = everyday(&catalog);

    apply.apply(&profile, dir.root(), TierFilter::All).unwrap();
    let prefs = dir.read_bytes("prefs.js");
    let user = dir.read_bytes("user.js");
    let backups = dir.backups_of("prefs.js");

    let again = apply.apply(&profile, dir.root(), TierFilter::All).unwrap();
    assert!(again.tiers.iter().all(|t| !t.changed));
    assert_eq!(dir.read_bytes("prefs.js"), prefs);
    assert_eq!(dir.read_bytes("user.js"), user);
    assert_eq!(dir.backups_of("prefs.js"), backups);
}

#[test]
fn tier_filter_leaves_the_other_file_alone() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new().with_marker();

    let result = orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::Enforced)
        .unwrap();

    assert_eq!(result.tiers.len(), 1);
    assert_eq!(result.written(Tier::Baseline), 0);
    dir.assert_file_exists("user.js");
    dir.assert_file_not_exists("prefs.js");
}

#[test]
fn invalid_profile_aborts_before_any_write() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new()
        .with_marker()
        .with_file("prefs.js", "user_pref(\"keep.me\", 1);\n");
    let before = dir.file_names();

    let mut settings = PrefMap::new();
    settings.insert("browser.cache.memory.capacity".into(), PrefValue::Int(100));
    settings.insert("privacy.resistFingerprinting".into(), PrefValue::Bool(true));
    let profile = Profile::new("Broken", settings);

    let err = orchestrator(catalog)
        .apply(&profile, dir.root(), TierFilter::All)
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(dir.file_names(), before);
    assert_eq!(dir.read("prefs.js"), "user_pref(\"keep.me\", 1);\n");
}

#[test]
fn concurrent_apply_on_the_same_directory_is_rejected() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new().with_marker();
    let _held = DirectoryGuard::acquire(dir.root()).unwrap();

    let err = orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::All)
        .unwrap_err();
    assert!(matches!(err, Error::Busy { .. }));
    dir.assert_file_not_exists("user.js");
}

#[test]
fn unmarked_directory_is_untrusted() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new();

    let err = orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::All)
        .unwrap_err();
    assert!(err.is_path_error());
    assert!(dir.file_names().is_empty());

    let relaxed = ApplyOrchestrator::new(
        catalog.clone(),
        ApplyOptions {
            require_profile_markers: false,
            ..ApplyOptions::default()
        },
    );
    assert!(
        relaxed
            .apply(&everyday(&catalog), dir.root(), TierFilter::All)
            .unwrap()
            .is_success()
    );
}

#[test]
fn failing_tier_does_not_stop_the_other() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new().with_marker();
    fs::create_dir(dir.path("user.js")).unwrap();

    let result = orchestrator(catalog.clone())
        .apply(&everyday(&catalog), dir.root(), TierFilter::All)
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].tier, Tier::Enforced);
    assert_eq!(result.written(Tier::Baseline), 2);
    dir.assert_file_contains("prefs.js", "geo.enabled");
}

#[test]
fn profile_without_enforced_keys_keeps_user_js() {
    let catalog = small_catalog();
    let dir = TestProfileDir::new()
        .with_marker()
        .with_file("user.js", "pref(\"mine\", 1);\n");

    let mut settings = PrefMap::new();
    settings.insert("geo.enabled".into(), PrefValue::Bool(false));
    let result = orchestrator(catalog)
        .apply(&Profile::new("Partial", settings), dir.root(), TierFilter::All)
        .unwrap();

    assert_eq!(result.tiers.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(dir.read("user.js"), "pref(\"mine\", 1);\n");
}

#[test]
fn builtin_recommendation_applies_cleanly() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let dir = TestProfileDir::new().with_marker();
    let profile = IntentAnalyzer::new(catalog.clone())
        .recommend(&IntentInput::new(["banking"], PrivacyLevel::Strong, 20));

    let result = orchestrator(catalog.clone())
        .apply(&profile, dir.root(), TierFilter::All)
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.total_written(), catalog.len());
    dir.assert_file_contains("user.js", "pref(\"privacy.resistFingerprinting\", true);");
}
