// src/watch/mod.rs

//! Pattern compilation, matching and event routing.
//!
//! This module is responsible for:
//! - Splitting glob patterns into a literal base and a glob suffix.
//! - Keeping per-base include / ignore / recursive matchers.
//! - Tracking which concrete paths are registered with the native watcher.
//! - Deciding, per raw event, whether to drop, reclassify, forward, or
//!   extend the watch set.
//!
//! It does **not** own any of this state across calls; the controller in
//! [`crate::engine`] does.

pub mod enumerator;
pub mod ledger;
pub mod matcher;
pub mod native;
pub mod path_utils;
pub mod patterns;
pub mod router;

pub use enumerator::{DirectoryEnumerator, FsDirectoryEnumerator};
pub use ledger::WatchLedger;
pub use matcher::{MatcherEntry, MatcherRegistry};
pub use native::{NativeConfig, NativeMessage, NativeWatcher, NotifyWatcher, RawEvent};
pub use path_utils::NormalizedPath;
pub use patterns::{CompiledPattern, PatternCompiler};
pub use router::{route, RouteOutcome, RoutedEvent};
