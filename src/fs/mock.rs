// src/fs/mock.rs

use super::FileSystem;
use crate::types::TargetKind;
use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum MockEntry {
    File,
    Dir(BTreeSet<String>), // child names
}

/// In-memory directory tree.
///
/// Paths are stored exactly as given, so tests should use absolute,
/// forward-slash paths (e.g. `/work/src/main.rs`). Parent directories are
/// created implicitly.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        Self::link_to_parent(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.lock();
        Self::ensure_dir(&mut entries, path.as_ref());
    }

    /// Remove a path and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        entries.retain(|p, _| !p.starts_with(path));
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
                children.remove(name.to_string_lossy().as_ref());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        // A poisoned mock only happens after a panicking test; keep going.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_dir(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        if matches!(entries.get(path), Some(MockEntry::Dir(_))) {
            return;
        }
        Self::link_to_parent(entries, path);
        entries.insert(path.to_path_buf(), MockEntry::Dir(BTreeSet::new()));
    }

    fn link_to_parent(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        Self::ensure_dir(entries, parent);
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            children.insert(name.to_string_lossy().into_owned());
        }
    }
}

impl FileSystem for MockFileSystem {
    fn kind(&self, path: &Path) -> Option<TargetKind> {
        match self.lock().get(path)? {
            MockEntry::File => Some(TargetKind::File),
            MockEntry::Dir(_) => Some(TargetKind::Directory),
        }
    }

    fn subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.lock();
        let Some(MockEntry::Dir(children)) = entries.get(path) else {
            bail!("not a directory: {path:?}");
        };
        Ok(children
            .iter()
            .map(|name| path.join(name))
            .filter(|child| matches!(entries.get(child), Some(MockEntry::Dir(_))))
            .collect())
    }
}
