// src/engine/mod.rs

//! Controller for a set of glob watches.
//!
//! The pure, synchronous controller lives in [`core`]: it owns the matcher
//! registry, the watch-target ledger and the subscriber bus, and processes
//! one caller command or raw native event at a time. The async shell in
//! [`runtime`] feeds it from channels on a tokio task and hands out a
//! cloneable [`WatcherHandle`].

use crate::errors::WatchError;
use crate::types::EventKind;
use crate::watch::path_utils::NormalizedPath;
use crate::watch::router::RoutedEvent;

/// Everything a subscriber can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added(NormalizedPath),
    AddedDir(NormalizedPath),
    Modified(NormalizedPath),
    Removed(NormalizedPath),
    RemovedDir(NormalizedPath),
    Error(WatchError),
    /// Sent once, after the first `add` has registered its targets.
    Ready,
}

impl From<RoutedEvent> for WatchEvent {
    fn from(ev: RoutedEvent) -> Self {
        match ev.kind {
            EventKind::Added => WatchEvent::Added(ev.path),
            EventKind::AddedDir => WatchEvent::AddedDir(ev.path),
            EventKind::Modified => WatchEvent::Modified(ev.path),
            EventKind::Removed => WatchEvent::Removed(ev.path),
            EventKind::RemovedDir => WatchEvent::RemovedDir(ev.path),
        }
    }
}

impl WatchEvent {
    /// The routed event carried by a change variant.
    pub fn routed(&self) -> Option<RoutedEvent> {
        let (kind, path) = match self {
            WatchEvent::Added(p) => (EventKind::Added, p),
            WatchEvent::AddedDir(p) => (EventKind::AddedDir, p),
            WatchEvent::Modified(p) => (EventKind::Modified, p),
            WatchEvent::Removed(p) => (EventKind::Removed, p),
            WatchEvent::RemovedDir(p) => (EventKind::RemovedDir, p),
            WatchEvent::Error(_) | WatchEvent::Ready => return None,
        };
        Some(RoutedEvent::new(kind, path.clone()))
    }

    pub fn kind(&self) -> Option<EventKind> {
        self.routed().map(|ev| ev.kind)
    }
}

/// What a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Only change events of this kind.
    Kind(EventKind),
    /// Every change event (no errors, no ready).
    All,
    /// Only errors.
    Error,
    /// Only the one-shot ready signal.
    Ready,
}

impl EventFilter {
    pub fn accepts(&self, event: &WatchEvent) -> bool {
        match (self, event) {
            (EventFilter::Error, WatchEvent::Error(_)) => true,
            (EventFilter::Ready, WatchEvent::Ready) => true,
            (EventFilter::All, ev) => ev.kind().is_some(),
            (EventFilter::Kind(kind), ev) => ev.kind() == Some(*kind),
            _ => false,
        }
    }
}

pub mod bus;
pub mod core;
pub mod runtime;

pub use bus::{EventBus, Subscription};
pub use core::{AddReport, GlobWatcher};
pub use runtime::{spawn_with_native, ControlCommand, Runtime, WatcherHandle};
