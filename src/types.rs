// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of change reported by the native watcher, before routing.
///
/// The native layer cannot tell a removed directory from a removed file, so
/// there is no `RemovedDir` here; the router derives it from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    Added,
    AddedDir,
    Modified,
    Removed,
}

/// Kind of an application-visible event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "add")]
    Added,
    #[serde(rename = "addDir")]
    AddedDir,
    #[serde(rename = "change")]
    Modified,
    #[serde(rename = "unlink")]
    Removed,
    #[serde(rename = "unlinkDir")]
    RemovedDir,
}

impl From<RawEventKind> for EventKind {
    fn from(kind: RawEventKind) -> Self {
        match kind {
            RawEventKind::Added => EventKind::Added,
            RawEventKind::AddedDir => EventKind::AddedDir,
            RawEventKind::Modified => EventKind::Modified,
            RawEventKind::Removed => EventKind::Removed,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Added => "add",
            EventKind::AddedDir => "addDir",
            EventKind::Modified => "change",
            EventKind::Removed => "unlink",
            EventKind::RemovedDir => "unlinkDir",
        };
        f.write_str(s)
    }
}

/// What a watch target is registered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Directory,
    File,
}

/// The three independent matcher collections kept by the registry.
///
/// - `Include`: paths the caller asked to see events for.
/// - `Ignore`: paths whose events are always dropped.
/// - `Recursive`: bases under which new subdirectories get auto-watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherClass {
    Include,
    Ignore,
    Recursive,
}

/// Log level accepted on the command line and in `GLOBWATCH_LOG`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}
