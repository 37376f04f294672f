// tests/runtime.rs

mod common;

use std::sync::Arc;

use common::np;
use globwatch::engine::{spawn_with_native, EventFilter, WatchEvent};
use globwatch::errors::UnwatchOutcome;
use globwatch::types::{EventKind, RawEventKind};
use globwatch::watch::RawEvent;
use globwatch_test_utils::builders::{sample_tree, WatchOptionsBuilder};
use globwatch_test_utils::fake_native::fake_native_channel;
use globwatch_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn routes_raw_events_in_order() {
    init_tracing();
    let (native, tx, rx) = fake_native_channel();
    let handle = spawn_with_native(
        WatchOptionsBuilder::new().build(),
        native.clone(),
        rx,
        Arc::new(sample_tree()),
    )
    .unwrap();

    let mut events = handle.subscribe(EventFilter::All).await.unwrap();
    let mut ready = handle.subscribe(EventFilter::Ready).await.unwrap();

    let report = handle.add(["src/**/*.ts"]).await.unwrap();
    assert_eq!(report.new_targets, 3);
    assert_eq!(with_timeout(ready.recv()).await, Some(WatchEvent::Ready));

    for (kind, path) in [
        (RawEventKind::Added, "/work/src/one.ts"),
        (RawEventKind::Modified, "/work/other/a.ts"),
        (RawEventKind::Modified, "/work/src/one.ts"),
        (RawEventKind::Removed, "/work/src/one.ts"),
    ] {
        tx.send(Ok(RawEvent::new(kind, path))).unwrap();
    }

    let mut received = Vec::new();
    for _ in 0..3 {
        received.push(with_timeout(events.recv()).await.unwrap());
    }
    assert_eq!(
        received,
        vec![
            WatchEvent::Added(np("/work/src/one.ts")),
            WatchEvent::Modified(np("/work/src/one.ts")),
            WatchEvent::Removed(np("/work/src/one.ts")),
        ]
    );
    assert_eq!(native.added().len(), 3);

    handle.close().await.unwrap();
}

#[tokio::test]
async fn new_directory_is_auto_watched_before_its_files_arrive() {
    init_tracing();
    let (native, tx, rx) = fake_native_channel();
    let handle = spawn_with_native(
        WatchOptionsBuilder::new().build(),
        native.clone(),
        rx,
        Arc::new(sample_tree()),
    )
    .unwrap();

    let mut dirs = handle
        .subscribe(EventFilter::Kind(EventKind::AddedDir))
        .await
        .unwrap();
    handle.add(["src/**"]).await.unwrap();

    tx.send(Ok(RawEvent::new(RawEventKind::AddedDir, "/work/src/gen"))).unwrap();
    assert_eq!(
        with_timeout(dirs.recv()).await,
        Some(WatchEvent::AddedDir(np("/work/src/gen")))
    );
    assert!(native.added().contains(&"/work/src/gen".to_string()));

    let statuses = handle.unwatch(["src/gen"]).await.unwrap();
    assert_eq!(statuses[0].outcome, UnwatchOutcome::Unwatched(1));

    handle.close().await.unwrap();
}

#[tokio::test]
async fn close_ends_streams_and_stops_the_runtime() {
    init_tracing();
    let (native, _tx, rx) = fake_native_channel();
    let handle = spawn_with_native(
        WatchOptionsBuilder::new().build(),
        native.clone(),
        rx,
        Arc::new(sample_tree()),
    )
    .unwrap();

    let mut events = handle.subscribe(EventFilter::All).await.unwrap();
    let mut errors = handle.subscribe(EventFilter::Error).await.unwrap();
    handle.add(["src/*.ts"]).await.unwrap();

    handle.close().await.unwrap();

    assert_eq!(with_timeout(events.recv()).await, None);
    assert_eq!(with_timeout(errors.recv()).await, None);
    assert_eq!(native.removed(), vec!["/work/src"]);

    let err = handle.add(["README.md"]).await.unwrap_err();
    assert!(err.to_string().contains("stopped"));
}

#[tokio::test]
async fn unwatch_all_through_the_handle_empties_the_watch_set() {
    init_tracing();
    let (native, tx, rx) = fake_native_channel();
    let handle = spawn_with_native(
        WatchOptionsBuilder::new().build(),
        native.clone(),
        rx,
        Arc::new(sample_tree()),
    )
    .unwrap();
    let mut events = handle.subscribe(EventFilter::All).await.unwrap();

    handle.add(["src/**/*.ts", "README.md"]).await.unwrap();
    handle.unwatch_all().await.unwrap();
    assert_eq!(native.removed().len(), 4);

    // Nothing matches any more, so this is dropped; the README change added
    // afterwards is the first thing delivered.
    tx.send(Ok(RawEvent::new(RawEventKind::Modified, "/work/src/a.ts"))).unwrap();
    handle.add(["README.md"]).await.unwrap();
    tx.send(Ok(RawEvent::new(RawEventKind::Modified, "/work/README.md"))).unwrap();

    assert_eq!(
        with_timeout(events.recv()).await,
        Some(WatchEvent::Modified(np("/work/README.md")))
    );

    handle.close().await.unwrap();
}
