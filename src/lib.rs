// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, ConfigFile, WatchOptions};
use crate::engine::{spawn_with_native, EventFilter, WatchEvent, WatcherHandle};
use crate::fs::RealFileSystem;
use crate::watch::NotifyWatcher;

/// Start a watcher backed by `notify` on the real filesystem.
///
/// Must be called from within a tokio runtime. Subscribe before calling
/// `add` to see the `Ready` signal and every event.
pub fn spawn_watcher(options: WatchOptions) -> errors::Result<WatcherHandle> {
    let (native_tx, native_rx) = mpsc::unbounded_channel();
    let native = NotifyWatcher::new(options.native_config(), native_tx)?;
    spawn_with_native(options, native, native_rx, Arc::new(RealFileSystem))
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (optional file + CLI overrides)
/// - the watcher runtime
/// - JSON-lines output of routed events on stdout
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;

    let mut options = cfg.options;
    options.ignored.extend(args.ignored);
    options.use_polling |= args.poll;

    let mut patterns = cfg.watch;
    patterns.extend(args.patterns);
    if patterns.is_empty() {
        bail!("nothing to watch: pass PATTERN arguments or set [watcher].watch");
    }

    let handle = spawn_watcher(options)?;
    let mut events = handle.subscribe(EventFilter::All).await?;
    let mut errors = handle.subscribe(EventFilter::Error).await?;

    let report = handle.add(patterns).await?;
    info!(
        patterns = report.patterns.len(),
        targets = report.new_targets,
        "watching"
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if let Some(routed) = event.routed() {
                    println!("{}", routed.to_json()?);
                }
            }
            Some(WatchEvent::Error(err)) = errors.recv() => {
                warn!(error = %err, "watch error");
            }
            res = &mut ctrl_c => {
                res?;
                info!("Ctrl-C received; closing watcher");
                break;
            }
        }
    }

    handle.close().await?;
    Ok(())
}

/// Load an explicit config, or the default one if it exists, or defaults.
fn load_config(path: Option<&str>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return Ok(load_and_validate(path)?);
    }
    let default_path = default_config_path();
    if default_path.is_file() {
        return Ok(load_and_validate(&default_path)?);
    }
    Ok(ConfigFile {
        watch: Vec::new(),
        options: WatchOptions::default(),
    })
}
