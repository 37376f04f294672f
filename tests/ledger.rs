// tests/ledger.rs

mod common;

use common::np;
use globwatch::errors::WatchError;
use globwatch::types::TargetKind;
use globwatch::watch::WatchLedger;
use globwatch_test_utils::fake_native::{FakeNativeWatcher, NativeCall};

fn ledger() -> (WatchLedger<FakeNativeWatcher>, FakeNativeWatcher) {
    let native = FakeNativeWatcher::new();
    (WatchLedger::new(native.clone()), native)
}

#[test]
fn registering_twice_issues_one_native_add() {
    let (mut ledger, native) = ledger();

    assert!(ledger.register_directory(&np("/w/src")).unwrap());
    assert!(!ledger.register_directory(&np("/w/src")).unwrap());
    // Already tracked as a directory, so not re-registered as a file either.
    assert!(!ledger.register_file(&np("/w/src")).unwrap());

    assert_eq!(
        native.calls(),
        vec![NativeCall::Add("/w/src".into(), TargetKind::Directory)]
    );
    assert_eq!(ledger.kind_of(&np("/w/src")), Some(TargetKind::Directory));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn file_targets_are_tracked_with_their_kind() {
    let (mut ledger, native) = ledger();
    ledger.register_file(&np("/w/README.md")).unwrap();

    assert!(ledger.is_file(&np("/w/README.md")));
    assert!(!ledger.is_directory(&np("/w/README.md")));
    assert_eq!(
        native.calls(),
        vec![NativeCall::Add("/w/README.md".into(), TargetKind::File)]
    );
}

#[test]
fn failed_native_add_leaves_ledger_unchanged() {
    let (mut ledger, native) = ledger();
    native.fail_add_for("/w/locked");

    let err = ledger.register_directory(&np("/w/locked")).unwrap_err();
    match err {
        WatchError::NativeCommand { path, reason } => {
            assert_eq!(path, np("/w/locked"));
            assert!(reason.contains("simulated add failure"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!ledger.contains(&np("/w/locked")));
    assert!(ledger.is_empty());
}

#[test]
fn unregistering_an_absent_path_is_a_no_op() {
    let (mut ledger, native) = ledger();
    assert!(!ledger.unregister(&np("/w/nothing")).unwrap());
    assert!(native.calls().is_empty());
}

#[test]
fn failed_native_remove_keeps_the_entry() {
    let (mut ledger, native) = ledger();
    ledger.register_directory(&np("/w/src")).unwrap();
    native.fail_remove_for("/w/src");

    assert!(ledger.unregister(&np("/w/src")).is_err());
    assert!(ledger.is_directory(&np("/w/src")));
}

#[test]
fn targets_under_respects_component_boundaries() {
    let (mut ledger, _native) = ledger();
    for dir in ["/a/b", "/a/b/c", "/a/b/c/d", "/a/b-x", "/a/bc", "/z"] {
        ledger.register_directory(&np(dir)).unwrap();
    }

    assert_eq!(
        ledger.targets_under(&np("/a/b")),
        vec![np("/a/b"), np("/a/b/c"), np("/a/b/c/d")]
    );
    assert_eq!(ledger.targets_under(&np("/a/b/c/d")), vec![np("/a/b/c/d")]);
    assert!(ledger.targets_under(&np("/q")).is_empty());
    assert_eq!(ledger.targets_under(&np("/")).len(), 6);
}

#[test]
fn release_vanished_drops_subtree_even_when_native_remove_fails() {
    let (mut ledger, native) = ledger();
    for dir in ["/w/gone", "/w/gone/inner", "/w/kept"] {
        ledger.register_directory(&np(dir)).unwrap();
    }
    native.fail_remove_for("/w/gone/inner");

    let released = ledger.release_vanished(&np("/w/gone"));

    assert_eq!(released, vec![np("/w/gone"), np("/w/gone/inner")]);
    assert!(!ledger.contains(&np("/w/gone")));
    assert!(!ledger.contains(&np("/w/gone/inner")));
    assert!(ledger.contains(&np("/w/kept")));
    assert_eq!(native.removed(), vec!["/w/gone".to_string()]);
}

#[test]
fn unregister_all_always_empties_and_reports_failures() {
    let (mut ledger, native) = ledger();
    ledger.register_directory(&np("/w/a")).unwrap();
    ledger.register_directory(&np("/w/b")).unwrap();
    ledger.register_file(&np("/w/c.txt")).unwrap();
    native.fail_remove_for("/w/b");

    let errors = ledger.unregister_all();

    assert!(ledger.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        WatchError::NativeCommand { path, .. } if *path == np("/w/b")
    ));
    assert_eq!(
        native.removed(),
        vec!["/w/a".to_string(), "/w/c.txt".to_string()]
    );
}
