// src/watch/matcher.rs

//! Per-base compiled glob matchers for the include, ignore and recursive
//! classes.
//!
//! Each class maps a base directory to the raw globs rooted there plus a
//! `GlobSet` compiled from all of them. Lookups only consult entries whose
//! base contains the queried path, so a glob rooted at `/a/b` can never
//! accept a path under `/c/d`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::WatchError;
use crate::types::MatcherClass;
use crate::watch::path_utils::NormalizedPath;
use crate::watch::patterns::{CompiledPattern, RECURSIVE_SUFFIX};

/// One base directory within one matcher class.
#[derive(Clone)]
pub struct MatcherEntry {
    base: NormalizedPath,
    raw_patterns: BTreeSet<String>,
    compiled: GlobSet,
}

impl fmt::Debug for MatcherEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherEntry")
            .field("base", &self.base)
            .field("raw_patterns", &self.raw_patterns)
            .finish_non_exhaustive()
    }
}

impl MatcherEntry {
    pub fn base(&self) -> &NormalizedPath {
        &self.base
    }

    pub fn raw_patterns(&self) -> impl Iterator<Item = &str> {
        self.raw_patterns.iter().map(String::as_str)
    }

    pub fn is_match(&self, path: &NormalizedPath) -> bool {
        self.compiled.is_match(path.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct MatcherSet {
    entries: BTreeMap<NormalizedPath, MatcherEntry>,
}

impl MatcherSet {
    fn insert(&mut self, base: &NormalizedPath, pattern: &str) -> Result<bool, WatchError> {
        let existing = self.entries.get(base);
        if existing.is_some_and(|e| e.raw_patterns.contains(pattern)) {
            return Ok(false);
        }

        let mut raw_patterns = existing.map(|e| e.raw_patterns.clone()).unwrap_or_default();
        raw_patterns.insert(pattern.to_string());

        // Rebuild from the full set; the old entry stays in place on failure.
        let compiled = build_globset(&raw_patterns).map_err(|e| WatchError::pattern(pattern, e))?;

        self.entries.insert(
            base.clone(),
            MatcherEntry {
                base: base.clone(),
                raw_patterns,
                compiled,
            },
        );
        Ok(true)
    }

    fn matches(&self, path: &NormalizedPath) -> bool {
        self.entries
            .values()
            .filter(|entry| entry.base.contains(path))
            .any(|entry| entry.is_match(path))
    }
}

/// The include / ignore / recursive matcher collections.
#[derive(Debug, Clone, Default)]
pub struct MatcherRegistry {
    include: MatcherSet,
    ignore: MatcherSet,
    recursive: MatcherSet,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, class: MatcherClass) -> &MatcherSet {
        match class {
            MatcherClass::Include => &self.include,
            MatcherClass::Ignore => &self.ignore,
            MatcherClass::Recursive => &self.recursive,
        }
    }

    fn set_mut(&mut self, class: MatcherClass) -> &mut MatcherSet {
        match class {
            MatcherClass::Include => &mut self.include,
            MatcherClass::Ignore => &mut self.ignore,
            MatcherClass::Recursive => &mut self.recursive,
        }
    }

    /// Insert a raw glob into `(base, class)` and recompile that entry.
    ///
    /// Returns `Ok(false)` when the glob was already present.
    pub fn add_pattern(
        &mut self,
        base: &NormalizedPath,
        pattern: &str,
        class: MatcherClass,
    ) -> Result<bool, WatchError> {
        if pattern.trim().is_empty() {
            return Err(WatchError::pattern(pattern, "pattern must be a non-empty string"));
        }
        let added = self.set_mut(class).insert(base, pattern)?;
        if added {
            debug!(?class, %base, pattern, "matcher entry recompiled");
        }
        Ok(added)
    }

    /// Register a compiled include pattern, plus its recursive companion
    /// when the suffix contains `**`.
    pub fn add_include(&mut self, compiled: &CompiledPattern) -> Result<(), WatchError> {
        self.add_pattern(&compiled.base, &compiled.glob(), MatcherClass::Include)?;
        if compiled.is_recursive() {
            let subtree = compiled.base.join_glob(RECURSIVE_SUFFIX);
            self.add_pattern(&compiled.base, &subtree, MatcherClass::Recursive)?;
        }
        Ok(())
    }

    /// Register a compiled ignore pattern.
    ///
    /// Ignoring a path also ignores everything below it, so `**/node_modules`
    /// hides `node_modules/pkg/index.js` as well as the directory itself.
    pub fn add_ignore(&mut self, compiled: &CompiledPattern) -> Result<(), WatchError> {
        let head = if compiled.suffix == RECURSIVE_SUFFIX {
            compiled.base.join_glob("")
        } else {
            compiled.glob()
        };
        let below = format!("{head}/{RECURSIVE_SUFFIX}");
        self.add_pattern(&compiled.base, &head, MatcherClass::Ignore)?;
        self.add_pattern(&compiled.base, &below, MatcherClass::Ignore)?;
        Ok(())
    }

    /// True if any entry of `class` whose base contains `path` accepts it.
    ///
    /// An empty class never matches.
    pub fn matches(&self, path: &NormalizedPath, class: MatcherClass) -> bool {
        self.set(class).matches(path)
    }

    /// True if `path` is an entry base of `class` or lies below one,
    /// whatever that entry's globs accept.
    pub fn is_under_base(&self, path: &NormalizedPath, class: MatcherClass) -> bool {
        self.set(class).entries.keys().any(|base| base.contains(path))
    }

    pub fn entries(&self, class: MatcherClass) -> impl Iterator<Item = &MatcherEntry> {
        self.set(class).entries.values()
    }

    pub fn entry(&self, base: &NormalizedPath, class: MatcherClass) -> Option<&MatcherEntry> {
        self.set(class).entries.get(base)
    }

    pub fn is_empty(&self) -> bool {
        self.include.entries.is_empty()
            && self.ignore.entries.is_empty()
            && self.recursive.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.include.entries.clear();
        self.ignore.entries.clear();
        self.recursive.entries.clear();
    }
}

/// Build a GlobSet where `*` and `?` never cross a `/`.
fn build_globset(patterns: &BTreeSet<String>) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat).literal_separator(true).build()?;
        builder.add(glob);
    }
    builder.build()
}
