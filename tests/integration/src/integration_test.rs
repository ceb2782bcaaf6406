//! End-to-end test of the vertical slice
//!
//! config -> external catalog -> recommend -> save -> apply -> import.

use std::fs;

use hardfox_catalog::PrivacyLevel;
use hardfox_core::{
    ApplyOrchestrator, HardfoxConfig, IntentAnalyzer, IntentInput, TierFilter, import_profile,
};
use hardfox_test_utils::TestProfileDir;
use hardfox_test_utils::catalog::SMALL_CATALOG;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn setup_config(root: &std::path::Path) -> HardfoxConfig {
    let catalog = root.join("catalog.toml");
    fs::write(&catalog, SMALL_CATALOG).unwrap();
    let config = root.join("config.toml");
    fs::write(
        &config,
        format!(
            "catalog = {:?}\nprofiles_dir = {:?}\n\n[backups]\nkeep = 2\n\n[write]\nfsync = false\n",
            catalog.to_string_lossy(),
            root.join("profiles").to_string_lossy()
        ),
    )
    .unwrap();
    HardfoxConfig::load(Some(&config)).unwrap()
}

#[test]
fn external_catalog_drives_the_whole_flow() {
    let temp = TempDir::new().unwrap();
    let config = setup_config(temp.path());
    let catalog = config.load_catalog().unwrap();
    assert_eq!(catalog.version(), "fixture");

    let mut profile = IntentAnalyzer::new(catalog.clone())
        .recommend(&IntentInput::new(["banking"], PrivacyLevel::Moderate, 40));
    assert_eq!(profile.name, "Banking - Balanced");

    let library = hardfox_core::ProfileLibrary::new(config.profiles_dir(), catalog.clone());
    library.save(&mut profile).unwrap();
    let profile = library.load("Banking - Balanced").unwrap();

    let dir = TestProfileDir::new()
        .with_marker()
        .with_file("prefs.js", "user_pref(\"browser.startup.page\", 3);\n");
    let result = ApplyOrchestrator::new(catalog.clone(), config.apply_options())
        .apply(&profile, dir.root(), TierFilter::All)
        .unwrap();
    assert!(result.is_success());

    dir.assert_file_contains("user.js", "pref(\"privacy.resistFingerprinting\", true);");
    dir.assert_file_contains("prefs.js", "user_pref(\"geo.enabled\", false);");
    dir.assert_file_contains("prefs.js", "user_pref(\"browser.startup.page\", 3);");

    let imported = import_profile(&catalog, dir.root()).unwrap();
    assert_eq!(imported.profile.settings(), profile.settings());
    assert_eq!(imported.unmanaged, 1);
}

#[test]
fn backup_retention_follows_config() {
    let temp = TempDir::new().unwrap();
    let config = setup_config(temp.path());
    let catalog = config.load_catalog().unwrap();
    let apply = ApplyOrchestrator::new(catalog.clone(), config.apply_options());
    let analyzer = IntentAnalyzer::new(catalog.clone());
    let dir = TestProfileDir::new().with_marker();

    // alternate between two profiles so every apply changes user.js
    for round in 0..5 {
        let level = if round % 2 == 0 {
            PrivacyLevel::Basic
        } else {
            PrivacyLevel::Maximum
        };
        let profile = analyzer.recommend(&IntentInput::new(Vec::<&str>::new(), level, 100));
        apply.apply(&profile, dir.root(), TierFilter::Enforced).unwrap();
    }

    assert_eq!(dir.backups_of("user.js").len(), 2);
}
