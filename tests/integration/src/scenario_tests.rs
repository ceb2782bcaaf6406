//! Scenario tests for the guarantees that span several crates

use std::sync::{Arc, Barrier};
use std::thread;

use hardfox_catalog::{Catalog, PrivacyLevel, Tier};
use hardfox_core::{
    ApplyOptions, ApplyOrchestrator, Error, IntentAnalyzer, IntentInput, TierFilter,
};
use hardfox_prefs::{CallForm, PrefMap, PrefStore, PrefValue, StoreOptions, WriteMode, parse};
use hardfox_test_utils::TestProfileDir;
use pretty_assertions::assert_eq;

#[test]
fn garbage_line_yields_one_warning() {
    let parsed = parse("user_pref(\"a.b\", true); garbage line\nuser_pref(\"c.d\", \"x;y\");");

    let mut expected = PrefMap::new();
    expected.insert("a.b".into(), PrefValue::Bool(true));
    expected.insert("c.d".into(), PrefValue::from("x;y"));
    assert_eq!(parsed.prefs, expected);
    assert_eq!(parsed.warnings.len(), 1);
}

#[test]
fn merge_keeps_unmanaged_keys() {
    let dir = TestProfileDir::new().with_file("prefs.js", "user_pref(\"a\", 1);\nuser_pref(\"b\", 1);\n");
    let store = PrefStore::new(dir.root(), StoreOptions::default()).unwrap();

    let mut managed = PrefMap::new();
    managed.insert("b".into(), PrefValue::Int(2));
    managed.insert("c".into(), PrefValue::Int(3));
    store
        .write("prefs.js", &managed, WriteMode::Merge, CallForm::UserPref)
        .unwrap();

    let prefs = store.read("prefs.js").unwrap().prefs;
    assert_eq!(prefs["a"], PrefValue::Int(1));
    assert_eq!(prefs["b"], PrefValue::Int(2));
    assert_eq!(prefs["c"], PrefValue::Int(3));
}

#[test]
fn writes_outside_the_root_create_nothing() {
    let outer = TestProfileDir::new();
    std::fs::create_dir(outer.path("profile")).unwrap();
    let store = PrefStore::new(outer.path("profile"), StoreOptions::default()).unwrap();

    let err = store
        .write("../user.js", &PrefMap::new(), WriteMode::Replace, CallForm::Pref)
        .unwrap_err();
    assert!(err.is_path_error());
    assert_eq!(outer.file_names(), vec!["profile".to_string()]);
    assert!(std::fs::read_dir(outer.path("profile")).unwrap().next().is_none());
}

#[test]
fn every_privacy_level_applies_idempotently() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let analyzer = IntentAnalyzer::new(catalog.clone());
    let apply = ApplyOrchestrator::new(catalog.clone(), ApplyOptions::default());

    for level in PrivacyLevel::ALL {
        let dir = TestProfileDir::new()
            .with_marker()
            .with_file("prefs.js", "user_pref(\"browser.startup.homepage\", \"about:home\");\n");
        let profile = analyzer.recommend(&IntentInput::new(["shopping", "work"], level, 60));

        apply.apply(&profile, dir.root(), TierFilter::All).unwrap();
        let first = (dir.read_bytes("prefs.js"), dir.read_bytes("user.js"));
        let second_run = apply.apply(&profile, dir.root(), TierFilter::All).unwrap();
        let second = (dir.read_bytes("prefs.js"), dir.read_bytes("user.js"));

        assert_eq!(first, second, "{level} is not idempotent");
        assert!(second_run.tiers.iter().all(|t| !t.changed));
        assert_eq!(second_run.written(Tier::Enforced), first_enforced_count(&catalog));
    }
}

fn first_enforced_count(catalog: &Catalog) -> usize {
    catalog.by_tier(Tier::Enforced).count()
}

#[test]
fn concurrent_applies_never_interleave() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let profile = IntentAnalyzer::new(catalog.clone())
        .recommend(&IntentInput::new(["banking"], PrivacyLevel::Strong, 20));
    let dir = TestProfileDir::new().with_marker();
    let root = dir.root().to_path_buf();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let apply = ApplyOrchestrator::new(catalog.clone(), ApplyOptions::default());
            let profile = profile.clone();
            let root = root.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                apply.apply(&profile, &root, TierFilter::All)
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(result) => {
                assert!(result.is_success());
                succeeded += 1;
            }
            Err(Error::Busy { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert!(succeeded >= 1);

    let store = PrefStore::new(dir.root(), StoreOptions::default()).unwrap();
    let user = store.read("user.js").unwrap();
    assert!(user.warnings.is_empty());
    assert_eq!(
        user.prefs.get("privacy.resistFingerprinting"),
        Some(&PrefValue::Bool(true))
    );
}

#[test]
fn exported_document_survives_a_round_trip() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let profile = IntentAnalyzer::new(catalog.clone())
        .recommend(&IntentInput::new(["development"], PrivacyLevel::Moderate, 30));

    let json = hardfox_core::document::to_json(&profile).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["base"], "developer");

    let back = hardfox_core::document::from_json(&json, &catalog).unwrap();
    assert_eq!(back.settings(), profile.settings());
    assert_eq!(back.name, profile.name);
}
