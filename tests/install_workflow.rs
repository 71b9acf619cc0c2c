// tests/install_workflow.rs

//! Install workflow tests: fetch, verify, build and plate.

#![cfg(unix)]

mod common;

use common::{Fixture, GOOD_LALA};
use lala_recipe::{Error, Phase, SourceRef, SourceSelector};
use std::fs;

#[test]
fn test_install_places_single_binary() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let result = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap();

    assert_eq!(result.binary_path, fixture.binary_path());
    assert!(!result.from_cache);
    assert!(result.build_dir.is_none());
    assert!(matches!(result.source, SourceRef::Archive { ref version, .. } if version == "0.1.0"));
    assert!(fixture.build_marker().exists());

    let installed: Vec<_> = fs::read_dir(fixture.prefix().join("bin"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(installed, vec!["lala"]);

    // The verified archive stays in the source cache
    assert!(fixture.source_cache().join(checksum.cache_key()).exists());
}

#[test]
fn test_install_then_taste() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let kitchen = fixture.kitchen();
    kitchen.install(&recipe, SourceSelector::Stable).unwrap();
    let report = kitchen.test(&recipe).unwrap();

    assert_eq!(report.checks.len(), 3);
    assert!(report.checks[0].output.contains("0.1.0"));
}

#[test]
fn test_reinstall_uses_source_cache() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let kitchen = fixture.kitchen();
    kitchen.install(&recipe, SourceSelector::Stable).unwrap();

    // Remove upstream so a second download would fail
    fs::remove_dir_all(fixture.dir.path().join("upstream")).unwrap();

    let mut config = fixture.config();
    config.offline = true;
    let result = lala_recipe::Kitchen::new(config)
        .install(&recipe, SourceSelector::Stable)
        .unwrap();
    assert!(result.from_cache);
}

#[test]
fn test_checksum_mismatch_aborts_before_build() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, _) = fixture.publish_release(GOOD_LALA);
    let wrong = format!("sha256:{}", "12".repeat(32));
    let recipe = fixture.recipe(&url, &wrong);

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();

    match &err {
        Error::ChecksumMismatch { expected, actual } => {
            assert_eq!(expected, &wrong);
            assert_ne!(actual, &wrong);
        }
        other => panic!("expected ChecksumMismatch, got {:?}", other),
    }
    assert_eq!(err.phase(), Some(Phase::Verify));

    assert!(!fixture.build_marker().exists());
    assert!(!fixture.prefix().exists());

    // The rejected download is not left in the cache
    let cached: Vec<_> = fs::read_dir(fixture.source_cache()).unwrap().collect();
    assert!(cached.is_empty());
}

#[test]
fn test_missing_dependency_writes_nothing() {
    let fixture = Fixture::new();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();

    match &err {
        Error::MissingDependency { name, commands } => {
            assert_eq!(name, "rust");
            assert_eq!(commands, "cargo");
        }
        other => panic!("expected MissingDependency, got {:?}", other),
    }
    assert_eq!(err.phase(), Some(Phase::Build));
    assert!(!fixture.prefix().exists());
    assert!(!fixture.source_cache().exists());
    assert!(!fixture.build_marker().exists());
}

#[test]
fn test_missing_release_is_unresolvable() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url.replace("v0.1.0", "v9.9.9"), &checksum.to_prefixed_string());

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvableSource(_)));
    assert!(!fixture.prefix().exists());
}

#[test]
fn test_placeholder_checksum_is_rejected() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, _) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, "REPLACE_WITH_ACTUAL_SHA256");

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidChecksum { .. }));
    assert_eq!(err.phase(), Some(Phase::Resolve));
    assert!(!fixture.build_marker().exists());
}

#[test]
fn test_build_without_binary_is_build_failure() {
    let fixture = Fixture::new();
    // A cargo that succeeds but installs nothing
    common::write_executable(&fixture.toolbin().join("cargo"), "#!/bin/sh\nexit 0\n");
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();
    assert!(matches!(err, Error::BuildFailure(_)));
}

#[test]
fn test_failing_build_reports_stderr() {
    let fixture = Fixture::new();
    common::write_executable(
        &fixture.toolbin().join("cargo"),
        "#!/bin/sh\necho 'error[E0425]: cannot find value' >&2\nexit 101\n",
    );
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();
    match err {
        Error::BuildFailure(msg) => assert!(msg.contains("E0425")),
        other => panic!("expected BuildFailure, got {:?}", other),
    }
}

#[test]
fn test_keep_builddir() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    let mut config = fixture.config();
    config.keep_builddir = true;
    config.build_root = Some(fixture.dir.path().join("builds"));

    let result = lala_recipe::Kitchen::new(config)
        .install(&recipe, SourceSelector::Stable)
        .unwrap();
    let build_dir = result.build_dir.unwrap();
    assert!(build_dir.starts_with(fixture.dir.path().join("builds")));
    assert!(build_dir.join("source/lala-0.1.0/Cargo.toml").exists());
}

#[test]
fn test_offline_head_install_is_refused() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let recipe = fixture.head_recipe("https://example.com/lala.git");

    let mut config = fixture.config();
    config.offline = true;
    let err = lala_recipe::Kitchen::new(config)
        .install(&recipe, SourceSelector::Head)
        .unwrap_err();

    assert!(matches!(err, Error::DownloadError(_)));
    assert_eq!(err.phase(), Some(Phase::Fetch));
    assert!(!fixture.prefix().exists());
    assert!(!fixture.build_marker().exists());
}

#[test]
fn test_head_install_from_git() {
    let git = match which::which("git") {
        Ok(git) => git,
        Err(_) => {
            eprintln!("git not found, skipping head install test");
            return;
        }
    };

    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    std::os::unix::fs::symlink(&git, fixture.toolbin().join("git")).unwrap();
    let repository = fixture.publish_head(&git, GOOD_LALA);
    let recipe = fixture.head_recipe(&repository);

    let result = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Head)
        .unwrap();

    assert_eq!(result.binary_path, fixture.binary_path());
    assert!(result.source.is_head());
    assert!(!result.from_cache);
    assert!(result.warnings.iter().any(|w| w.contains("not checksum-verified")));
    assert!(fixture.build_marker().exists());
}

#[test]
fn test_unwritable_prefix_fails_in_build_phase() {
    let fixture = Fixture::new();
    fixture.install_fake_cargo();
    let (url, checksum) = fixture.publish_release(GOOD_LALA);
    let recipe = fixture.recipe(&url, &checksum.to_prefixed_string());

    // A regular file where the prefix directory should go
    fs::write(fixture.prefix(), "not a directory").unwrap();

    let err = fixture
        .kitchen()
        .install(&recipe, SourceSelector::Stable)
        .unwrap_err();
    assert_eq!(err.phase(), Some(Phase::Build));
    assert!(err.to_string().contains("prefix"));
    assert!(!fixture.build_marker().exists());
}
