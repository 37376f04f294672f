// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile, WatchOptions, WatcherSection};
use crate::errors::{GlobwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = GlobwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let options = WatchOptions::try_from(&raw.watcher)?;
        validate_patterns("watch", &raw.watcher.watch)?;
        Ok(ConfigFile {
            watch: raw.watcher.watch,
            options,
        })
    }
}

impl TryFrom<&WatcherSection> for WatchOptions {
    type Error = GlobwatchError;

    fn try_from(section: &WatcherSection) -> std::result::Result<Self, Self::Error> {
        validate_section(section)?;
        Ok(WatchOptions {
            ignored: section.ignored.clone(),
            use_polling: section.use_polling,
            poll_interval: Duration::from_millis(section.poll_interval_ms),
            cwd: section.cwd.clone(),
        })
    }
}

impl WatchOptions {
    /// Check a hand-built options value the same way a config file is checked.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(GlobwatchError::ConfigError(
                "poll interval must be >= 1ms (got 0)".to_string(),
            ));
        }
        validate_patterns("ignored", &self.ignored)?;
        validate_cwd(self.cwd.as_deref())
    }
}

fn validate_section(section: &WatcherSection) -> Result<()> {
    if section.poll_interval_ms == 0 {
        return Err(GlobwatchError::ConfigError(
            "[watcher].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    validate_patterns("ignored", &section.ignored)?;
    validate_cwd(section.cwd.as_deref())
}

fn validate_patterns(field: &str, patterns: &[String]) -> Result<()> {
    for (idx, pat) in patterns.iter().enumerate() {
        if pat.trim().is_empty() {
            return Err(GlobwatchError::ConfigError(format!(
                "[watcher].{field}[{idx}] must be a non-empty pattern"
            )));
        }
    }
    Ok(())
}

fn validate_cwd(cwd: Option<&std::path::Path>) -> Result<()> {
    if let Some(dir) = cwd {
        if !dir.is_absolute() {
            return Err(GlobwatchError::ConfigError(format!(
                "[watcher].cwd must be an absolute path (got {dir:?})"
            )));
        }
    }
    Ok(())
}
