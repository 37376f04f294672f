// src/watch/native.rs

//! The native watch primitive: the trait the ledger issues add/remove
//! commands through, and a `notify`-backed implementation of it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Config, Event, EventKind as NotifyKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::types::{RawEventKind, TargetKind};
use crate::watch::path_utils::NormalizedPath;

/// A change notification as delivered by the native layer.
///
/// `path` is whatever the native layer reported; the router normalises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub path: PathBuf,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// One item on the native stream: an event or an error message.
pub type NativeMessage = std::result::Result<RawEvent, String>;

/// Commands accepted by the native watch primitive.
///
/// Implementations watch each target non-recursively; recursion is driven
/// by the ledger registering subdirectories one by one.
pub trait NativeWatcher: Send {
    fn add(&mut self, path: &NormalizedPath, kind: TargetKind) -> Result<()>;
    fn remove(&mut self, path: &NormalizedPath) -> Result<()>;
}

/// Creation-time settings for the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeConfig {
    pub use_polling: bool,
    pub poll_interval: Duration,
}

enum Backend {
    Recommended(RecommendedWatcher),
    Poll(PollWatcher),
}

/// [`NativeWatcher`] over the `notify` crate.
///
/// Events are translated with [`translate`] and pushed into the channel given
/// at construction. Dropping this value stops native watching.
pub struct NotifyWatcher {
    backend: Backend,
}

impl std::fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.backend {
            Backend::Recommended(_) => "recommended",
            Backend::Poll(_) => "poll",
        };
        f.debug_struct("NotifyWatcher").field("backend", &kind).finish()
    }
}

impl NotifyWatcher {
    pub fn new(config: NativeConfig, tx: mpsc::UnboundedSender<NativeMessage>) -> Result<Self> {
        // Closure called synchronously by notify whenever an event arrives.
        let handler = move |res: notify::Result<Event>| {
            let messages: Vec<NativeMessage> = match res {
                Ok(event) => translate(&event).into_iter().map(Ok).collect(),
                Err(err) => vec![Err(describe_error(&err))],
            };
            for msg in messages {
                if tx.send(msg).is_err() {
                    // Receiver is gone: the controller has shut down.
                    break;
                }
            }
        };

        let backend = if config.use_polling {
            let cfg = Config::default().with_poll_interval(config.poll_interval);
            Backend::Poll(PollWatcher::new(handler, cfg).context("creating poll watcher")?)
        } else {
            Backend::Recommended(
                RecommendedWatcher::new(handler, Config::default())
                    .context("creating native watcher")?,
            )
        };

        Ok(Self { backend })
    }

    fn watcher(&mut self) -> &mut dyn Watcher {
        match &mut self.backend {
            Backend::Recommended(w) => w,
            Backend::Poll(w) => w,
        }
    }
}

impl NativeWatcher for NotifyWatcher {
    fn add(&mut self, path: &NormalizedPath, _kind: TargetKind) -> Result<()> {
        self.watcher()
            .watch(path.as_path(), RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {path}"))
    }

    fn remove(&mut self, path: &NormalizedPath) -> Result<()> {
        self.watcher()
            .unwatch(path.as_path())
            .with_context(|| format!("unwatching {path}"))
    }
}

/// Map a `notify` event onto zero or more raw events.
///
/// - create folder → `AddedDir`, create file → `Added`, other creates check
///   the path
/// - rename from → `Removed`, rename to → added (kind checked on disk),
///   rename with both paths → `Removed` then added
/// - any other modification → `Modified`
/// - remove → `Removed` (directory-ness is decided later from the ledger)
/// - access and unknown kinds are dropped
pub fn translate(event: &Event) -> Vec<RawEvent> {
    let paths = &event.paths;
    match event.kind {
        NotifyKind::Create(CreateKind::Folder) => each(paths, RawEventKind::AddedDir),
        NotifyKind::Create(CreateKind::File) => each(paths, RawEventKind::Added),
        NotifyKind::Create(_) => paths.iter().map(|p| classify_added(p)).collect(),
        NotifyKind::Modify(ModifyKind::Name(RenameMode::From)) => each(paths, RawEventKind::Removed),
        NotifyKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.iter().map(|p| classify_added(p)).collect()
        }
        NotifyKind::Modify(ModifyKind::Name(RenameMode::Both)) => match paths.as_slice() {
            [from, to, ..] => vec![RawEvent::new(RawEventKind::Removed, from), classify_added(to)],
            _ => Vec::new(),
        },
        NotifyKind::Modify(ModifyKind::Name(_)) => paths
            .iter()
            .map(|p| {
                if p.exists() {
                    classify_added(p)
                } else {
                    RawEvent::new(RawEventKind::Removed, p)
                }
            })
            .collect(),
        NotifyKind::Modify(_) => each(paths, RawEventKind::Modified),
        NotifyKind::Remove(_) => each(paths, RawEventKind::Removed),
        NotifyKind::Access(_) | NotifyKind::Any | NotifyKind::Other => Vec::new(),
    }
}

fn each(paths: &[PathBuf], kind: RawEventKind) -> Vec<RawEvent> {
    paths.iter().map(|p| RawEvent::new(kind, p)).collect()
}

fn classify_added(path: &Path) -> RawEvent {
    if path.is_dir() {
        RawEvent::new(RawEventKind::AddedDir, path)
    } else {
        RawEvent::new(RawEventKind::Added, path)
    }
}

fn describe_error(err: &notify::Error) -> String {
    if err.paths.is_empty() {
        err.to_string()
    } else {
        format!("{err} ({:?})", err.paths)
    }
}
