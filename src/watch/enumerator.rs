// src/watch/enumerator.rs

//! Expands directory patterns into the concrete directories that exist right
//! now. Used when patterns are added, and by the router when a new directory
//! shows up under a recursive base.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::types::MatcherClass;
use crate::watch::matcher::MatcherRegistry;
use crate::watch::path_utils::NormalizedPath;
use crate::watch::patterns::CompiledPattern;

/// The directory-enumeration collaborator.
pub trait DirectoryEnumerator: Send {
    /// Existing directories covered by `patterns`, skipping anything the
    /// registry's ignore class matches. The result is sorted and free of
    /// duplicates.
    fn directories(
        &self,
        patterns: &[CompiledPattern],
        registry: &MatcherRegistry,
    ) -> Result<Vec<NormalizedPath>>;
}

/// Walks a [`FileSystem`] from each pattern's base.
///
/// The walk depth is bounded by the number of directory levels the suffix
/// spells out (`*.rs` stays in the base, `*/*.rs` goes one level down) and is
/// unbounded for suffixes containing `**`.
#[derive(Debug, Clone)]
pub struct FsDirectoryEnumerator {
    fs: Arc<dyn FileSystem>,
    cwd: NormalizedPath,
}

impl FsDirectoryEnumerator {
    pub fn new(fs: Arc<dyn FileSystem>, cwd: NormalizedPath) -> Self {
        Self { fs, cwd }
    }

    fn walk(
        &self,
        pattern: &CompiledPattern,
        registry: &MatcherRegistry,
        out: &mut BTreeSet<NormalizedPath>,
    ) {
        let base = &pattern.base;
        if !self.fs.is_dir(base.as_path()) {
            debug!(%base, "pattern base is not an existing directory; nothing to expand");
            return;
        }
        if registry.matches(base, MatcherClass::Ignore) {
            debug!(%base, "pattern base is ignored");
            return;
        }

        let max_depth = pattern.max_dir_depth();
        let mut visited = BTreeSet::new();
        let mut stack = vec![(base.clone(), 0usize)];

        while let Some((dir, depth)) = stack.pop() {
            if !visited.insert(dir.clone()) {
                continue;
            }
            out.insert(dir.clone());
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            let children = match self.fs.subdirectories(dir.as_path()) {
                Ok(c) => c,
                Err(err) => {
                    warn!(%dir, error = %err, "skipping unreadable directory");
                    continue;
                }
            };

            for child in children {
                let child = NormalizedPath::resolve(&child.to_string_lossy(), &self.cwd);
                if registry.matches(&child, MatcherClass::Ignore) {
                    debug!(dir = %child, "ignored directory not expanded");
                    continue;
                }
                stack.push((child, depth + 1));
            }
        }
    }
}

impl DirectoryEnumerator for FsDirectoryEnumerator {
    fn directories(
        &self,
        patterns: &[CompiledPattern],
        registry: &MatcherRegistry,
    ) -> Result<Vec<NormalizedPath>> {
        let mut out = BTreeSet::new();
        for pattern in patterns {
            self.walk(pattern, registry, &mut out);
        }
        Ok(out.into_iter().collect())
    }
}
