// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::watch::native::NativeConfig;
use crate::watch::path_utils::NormalizedPath;

/// Ignore patterns every watcher starts with.
pub const DEFAULT_IGNORED: &[&str] = &["**/node_modules", "**/.git", "**/target"];

/// Default poll interval when `use_polling = true`.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watcher]
/// watch = ["src/**/*.rs", "Cargo.toml"]
/// ignored = ["**/dist"]
/// use_polling = false
/// poll_interval_ms = 100
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watcher: WatcherSection,
}

/// `[watcher]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherSection {
    /// Patterns added when the binary starts.
    #[serde(default)]
    pub watch: Vec<String>,

    /// Extra ignore patterns, merged with [`DEFAULT_IGNORED`].
    #[serde(default)]
    pub ignored: Vec<String>,

    /// Poll the filesystem instead of using OS notifications.
    #[serde(default)]
    pub use_polling: bool,

    /// Poll interval in milliseconds (only used when polling).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Directory relative patterns resolve against. Defaults to the process
    /// working directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            watch: Vec::new(),
            ignored: Vec::new(),
            use_polling: false,
            poll_interval_ms: default_poll_interval_ms(),
            cwd: None,
        }
    }
}

/// Validated configuration. Construct through `TryFrom<RawConfigFile>` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: Vec<String>,
    pub options: WatchOptions,
}

/// Options a watcher controller is built with.
///
/// | field           | default        | effect                                          |
/// |-----------------|----------------|-------------------------------------------------|
/// | `ignored`       | `[]`           | extra ignore globs on top of [`DEFAULT_IGNORED`] |
/// | `use_polling`   | `false`        | poll instead of OS notifications                |
/// | `poll_interval` | 100ms          | delay between polls                             |
/// | `cwd`           | process cwd    | root for relative patterns                      |
///
/// The ignore set is fixed once the controller is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub ignored: Vec<String>,
    pub use_polling: bool,
    pub poll_interval: Duration,
    pub cwd: Option<PathBuf>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            ignored: Vec::new(),
            use_polling: false,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            cwd: None,
        }
    }
}

impl WatchOptions {
    /// Default ignores followed by user ignores, without duplicates.
    pub fn effective_ignored(&self) -> Vec<String> {
        let mut combined: Vec<String> = DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect();
        for pat in &self.ignored {
            if !combined.contains(pat) {
                combined.push(pat.clone());
            }
        }
        combined
    }

    pub fn native_config(&self) -> NativeConfig {
        NativeConfig {
            use_polling: self.use_polling,
            poll_interval: self.poll_interval,
        }
    }

    /// The configured `cwd`, or the process working directory.
    pub fn resolve_cwd(&self) -> std::io::Result<NormalizedPath> {
        match &self.cwd {
            Some(dir) => NormalizedPath::from_absolute(dir).ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("cwd {dir:?} is not absolute"),
                )
            }),
            None => NormalizedPath::current_dir(),
        }
    }
}
