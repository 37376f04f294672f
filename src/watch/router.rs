// src/watch/router.rs

//! Routing of a single raw event: ignore check, reclassification with its
//! watch-set side effects, then the include check.

use serde::Serialize;
use tracing::debug;

use crate::errors::WatchError;
use crate::types::{EventKind, MatcherClass, RawEventKind, TargetKind};
use crate::watch::enumerator::DirectoryEnumerator;
use crate::watch::ledger::WatchLedger;
use crate::watch::matcher::MatcherRegistry;
use crate::watch::native::{NativeWatcher, RawEvent};
use crate::watch::path_utils::NormalizedPath;
use crate::watch::patterns::{CompiledPattern, RECURSIVE_SUFFIX};

/// An application-visible event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoutedEvent {
    pub kind: EventKind,
    pub path: NormalizedPath,
}

impl RoutedEvent {
    pub fn new(kind: EventKind, path: NormalizedPath) -> Self {
        Self { kind, path }
    }

    /// Single-line JSON, e.g. `{"kind":"addDir","path":"/w/src/new"}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// What routing one raw event produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// The event to deliver, if any.
    pub event: Option<RoutedEvent>,
    /// Side-effect failures (auto-registration), reported but not fatal.
    pub errors: Vec<WatchError>,
}

/// Route one raw event.
///
/// 1. Normalise the path against `cwd`.
/// 2. Ignored paths are dropped with no side effects.
/// 3. `AddedDir` under a recursive base registers the new directory and any
///    subdirectories it already holds (a tree moved or created in one go);
///    `Removed` of a tracked directory becomes `RemovedDir` and releases it
///    (and anything tracked below it) from the ledger; `Removed` of a tracked
///    file releases that file target.
/// 4. Emit if the include class accepts the path. A `RemovedDir` is also
///    emitted when the directory is an include base or sits below one, since
///    a directory name rarely matches a file glob.
pub fn route<N: NativeWatcher>(
    raw: &RawEvent,
    cwd: &NormalizedPath,
    registry: &MatcherRegistry,
    ledger: &mut WatchLedger<N>,
    enumerator: &dyn DirectoryEnumerator,
) -> RouteOutcome {
    let path = NormalizedPath::resolve(&raw.path.to_string_lossy(), cwd);
    let mut outcome = RouteOutcome::default();

    if registry.matches(&path, MatcherClass::Ignore) {
        debug!(%path, kind = ?raw.kind, "ignored");
        return outcome;
    }

    let mut kind = EventKind::from(raw.kind);
    match raw.kind {
        RawEventKind::AddedDir if registry.matches(&path, MatcherClass::Recursive) => {
            register_subtree(&path, registry, ledger, enumerator, &mut outcome.errors);
        }
        RawEventKind::Removed if ledger.is_directory(&path) => {
            kind = EventKind::RemovedDir;
            let released = ledger.release_vanished(&path);
            debug!(%path, released = released.len(), "directory removed; released watch targets");
        }
        RawEventKind::Removed if ledger.is_file(&path) => {
            ledger.release_vanished(&path);
            debug!(%path, "watched file removed; released watch target");
        }
        _ => {}
    }

    let visible = registry.matches(&path, MatcherClass::Include)
        || (kind == EventKind::RemovedDir
            && registry.is_under_base(&path, MatcherClass::Include));

    if visible {
        debug!(%path, %kind, "routed");
        outcome.event = Some(RoutedEvent::new(kind, path));
    } else {
        debug!(%path, %kind, "not included; dropped");
    }
    outcome
}

/// Register a new directory plus every non-ignored directory already below
/// it. The directory itself is registered first so a failing walk still
/// leaves it watched.
fn register_subtree<N: NativeWatcher>(
    root: &NormalizedPath,
    registry: &MatcherRegistry,
    ledger: &mut WatchLedger<N>,
    enumerator: &dyn DirectoryEnumerator,
    errors: &mut Vec<WatchError>,
) {
    if let Err(err) = ledger.register_directory(root) {
        errors.push(err);
    }

    let subtree = CompiledPattern {
        base: root.clone(),
        suffix: RECURSIVE_SUFFIX.to_string(),
        target: TargetKind::Directory,
    };
    let dirs = match enumerator.directories(std::slice::from_ref(&subtree), registry) {
        Ok(dirs) => dirs,
        Err(e) => {
            errors.push(WatchError::Enumeration(format!("{e:#}")));
            return;
        }
    };

    let mut added = 0usize;
    for dir in dirs.iter().filter(|d| *d != root) {
        match ledger.register_directory(dir) {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(err) => errors.push(err),
        }
    }
    if added > 0 {
        debug!(%root, added, "registered existing subdirectories of new directory");
    }
}
