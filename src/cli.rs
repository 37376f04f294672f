// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::Parser;

use crate::types::LogLevel;

/// Command-line arguments for `globwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "globwatch",
    version,
    about = "Watch glob patterns and print routed filesystem events as JSON lines.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Globwatch.toml` in the current working directory. A missing
    /// default file is not an error.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Extra ignore patterns (repeatable).
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignored: Vec<String>,

    /// Poll instead of using OS notifications.
    #[arg(long)]
    pub poll: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GLOBWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Patterns to watch, in addition to `[watcher].watch`.
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
