// src/watch/ledger.rs

//! The authoritative record of what is registered with the native watcher.
//!
//! A path is either absent, a `Directory` target or a `File` target, never
//! two of those. The ledger and the native watcher change together: when a
//! native command fails the ledger is left as it was.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::errors::WatchError;
use crate::types::TargetKind;
use crate::watch::native::NativeWatcher;
use crate::watch::path_utils::NormalizedPath;

pub struct WatchLedger<N: NativeWatcher> {
    targets: BTreeMap<NormalizedPath, TargetKind>,
    native: N,
}

impl<N: NativeWatcher> fmt::Debug for WatchLedger<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLedger")
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

impl<N: NativeWatcher> WatchLedger<N> {
    pub fn new(native: N) -> Self {
        Self {
            targets: BTreeMap::new(),
            native,
        }
    }

    /// Register a directory target. Returns `Ok(false)` if the path is
    /// already tracked (as either kind).
    pub fn register_directory(&mut self, path: &NormalizedPath) -> Result<bool, WatchError> {
        self.register(path, TargetKind::Directory)
    }

    /// Register a file target. Returns `Ok(false)` if the path is already
    /// tracked (as either kind).
    pub fn register_file(&mut self, path: &NormalizedPath) -> Result<bool, WatchError> {
        self.register(path, TargetKind::File)
    }

    fn register(&mut self, path: &NormalizedPath, kind: TargetKind) -> Result<bool, WatchError> {
        if self.targets.contains_key(path) {
            return Ok(false);
        }
        self.native
            .add(path, kind)
            .map_err(|e| WatchError::NativeCommand {
                path: path.clone(),
                reason: format!("{e:#}"),
            })?;
        self.targets.insert(path.clone(), kind);
        debug!(%path, ?kind, "watch target registered");
        Ok(true)
    }

    /// Remove a single target. Returns whether it was present.
    pub fn unregister(&mut self, path: &NormalizedPath) -> Result<bool, WatchError> {
        if !self.targets.contains_key(path) {
            return Ok(false);
        }
        self.native.remove(path).map_err(|e| WatchError::NativeCommand {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?;
        self.targets.remove(path);
        debug!(%path, "watch target unregistered");
        Ok(true)
    }

    /// Every tracked path equal to or nested under `root`.
    pub fn targets_under(&self, root: &NormalizedPath) -> Vec<NormalizedPath> {
        self.targets
            .range(root.clone()..)
            .map(|(p, _)| p)
            .take_while(|p| p.as_str().starts_with(root.as_str()))
            .filter(|p| root.contains(p))
            .cloned()
            .collect()
    }

    /// Drop `root` and every target below it after it vanished from disk.
    /// `root` may be a directory or a single file target.
    ///
    /// Native removes are still issued, but a failure does not keep the
    /// entry: the native layer usually drops a watch whose directory is gone
    /// on its own, and a path that no longer exists cannot stay watched.
    pub fn release_vanished(&mut self, root: &NormalizedPath) -> Vec<NormalizedPath> {
        let released = self.targets_under(root);
        for path in &released {
            if let Err(e) = self.native.remove(path) {
                debug!(%path, error = %e, "native remove of vanished target failed");
            }
            self.targets.remove(path);
        }
        released
    }

    /// Remove every target, issuing one native remove per target.
    ///
    /// The ledger always ends up empty; failed native removes are returned
    /// so the caller can report them.
    pub fn unregister_all(&mut self) -> Vec<WatchError> {
        let mut errors = Vec::new();
        for path in std::mem::take(&mut self.targets).into_keys() {
            if let Err(e) = self.native.remove(&path) {
                warn!(%path, error = %e, "native remove failed during teardown");
                errors.push(WatchError::NativeCommand {
                    path,
                    reason: format!("{e:#}"),
                });
            }
        }
        errors
    }

    pub fn kind_of(&self, path: &NormalizedPath) -> Option<TargetKind> {
        self.targets.get(path).copied()
    }

    pub fn is_directory(&self, path: &NormalizedPath) -> bool {
        self.kind_of(path) == Some(TargetKind::Directory)
    }

    pub fn is_file(&self, path: &NormalizedPath) -> bool {
        self.kind_of(path) == Some(TargetKind::File)
    }

    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.targets.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedPath, TargetKind)> {
        self.targets.iter().map(|(p, k)| (p, *k))
    }

    pub fn native(&self) -> &N {
        &self.native
    }
}
