// src/errors.rs

//! Crate-wide error types.
//!
//! Two families live here:
//! - [`GlobwatchError`] is returned synchronously from construction and
//!   config loading.
//! - [`WatchError`] is what the controller reports through the `Error`
//!   event stream. It is `Clone` so it can be fanned out to every
//!   subscriber.

use std::fmt;

use thiserror::Error;

use crate::watch::path_utils::NormalizedPath;

#[derive(Error, Debug)]
pub enum GlobwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GlobwatchError>;

/// Recoverable conditions reported while adding, unwatching or routing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// A pattern was empty or not a valid glob.
    #[error("invalid pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },

    /// The native watcher refused an add or remove command.
    #[error("native watcher command failed for {path}: {reason}")]
    NativeCommand { path: NormalizedPath, reason: String },

    /// Tried to unwatch something that is not in the ledger.
    #[error("nothing to unwatch at {path}")]
    NotWatched { path: NormalizedPath },

    /// The native watcher reported an error instead of an event.
    #[error("native watcher error: {0}")]
    NativeStream(String),

    /// Expanding pattern bases into directories failed.
    #[error("directory enumeration failed: {0}")]
    Enumeration(String),
}

impl WatchError {
    pub fn pattern(pattern: impl Into<String>, reason: impl fmt::Display) -> Self {
        WatchError::Pattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

/// Outcome of unwatching a single caller-supplied path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnwatchOutcome {
    /// This many ledger targets (the path and anything nested under it)
    /// were removed.
    Unwatched(usize),
    /// The ledger held nothing at or under the path.
    NotWatched,
    /// The native remove command failed; the ledger still holds the target.
    Failed(WatchError),
}

/// Status reported back for each path given to `unwatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwatchStatus {
    pub path: NormalizedPath,
    pub outcome: UnwatchOutcome,
}

impl UnwatchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UnwatchOutcome::Unwatched(_))
    }

    pub fn message(&self) -> String {
        match &self.outcome {
            UnwatchOutcome::Unwatched(1) => format!("unwatched {}", self.path),
            UnwatchOutcome::Unwatched(n) => format!("unwatched {} ({n} targets)", self.path),
            UnwatchOutcome::NotWatched => WatchError::NotWatched {
                path: self.path.clone(),
            }
            .to_string(),
            UnwatchOutcome::Failed(err) => err.to_string(),
        }
    }
}
