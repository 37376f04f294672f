// src/engine/core.rs

//! Pure controller.
//!
//! [`GlobWatcher`] owns the matcher registry, the watch-target ledger (and
//! through it the native watcher handle) and the subscriber bus. Nothing else
//! mutates them. It performs no async work and can be driven directly from
//! tests with a fake native watcher and an in-memory filesystem.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::WatchOptions;
use crate::errors::{GlobwatchError, Result, UnwatchOutcome, UnwatchStatus, WatchError};
use crate::fs::FileSystem;
use crate::types::TargetKind;
use crate::watch::enumerator::{DirectoryEnumerator, FsDirectoryEnumerator};
use crate::watch::ledger::WatchLedger;
use crate::watch::matcher::MatcherRegistry;
use crate::watch::native::{NativeMessage, NativeWatcher};
use crate::watch::path_utils::NormalizedPath;
use crate::watch::patterns::{CompiledPattern, PatternCompiler};
use crate::watch::router::{route, RoutedEvent};

use super::bus::{EventBus, Subscription};
use super::{EventFilter, WatchEvent};

/// Summary of one `add` call. Every error listed here has also been
/// published on the `Error` stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Patterns that compiled and were registered with the matchers.
    pub patterns: Vec<CompiledPattern>,
    /// Targets newly registered with the native watcher.
    pub new_targets: usize,
    pub errors: Vec<WatchError>,
}

pub struct GlobWatcher<N: NativeWatcher> {
    options: WatchOptions,
    compiler: PatternCompiler,
    ignores: Vec<CompiledPattern>,
    enumerator: Box<dyn DirectoryEnumerator>,
    registry: MatcherRegistry,
    ledger: WatchLedger<N>,
    bus: EventBus,
    closed: bool,
}

impl<N: NativeWatcher> fmt::Debug for GlobWatcher<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobWatcher")
            .field("cwd", self.compiler.cwd())
            .field("registry", &self.registry)
            .field("ledger", &self.ledger)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<N: NativeWatcher> GlobWatcher<N> {
    /// Build a controller.
    ///
    /// Fails if the options are invalid, the working directory cannot be
    /// resolved, or an ignore pattern does not compile.
    pub fn new(options: WatchOptions, native: N, fs: Arc<dyn FileSystem>) -> Result<Self> {
        options.validate()?;
        let cwd = options.resolve_cwd()?;
        let compiler = PatternCompiler::new(cwd.clone(), Arc::clone(&fs));

        let ignores = options
            .effective_ignored()
            .iter()
            .map(|pat| compiler.compile_ignore(pat))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GlobwatchError::ConfigError(e.to_string()))?;

        let mut watcher = Self {
            options,
            compiler,
            ignores,
            enumerator: Box::new(FsDirectoryEnumerator::new(fs, cwd)),
            registry: MatcherRegistry::new(),
            ledger: WatchLedger::new(native),
            bus: EventBus::new(),
            closed: false,
        };
        watcher.seed_ignores()?;
        Ok(watcher)
    }

    /// Replace the directory enumerator.
    pub fn with_enumerator(mut self, enumerator: Box<dyn DirectoryEnumerator>) -> Self {
        self.enumerator = enumerator;
        self
    }

    fn seed_ignores(&mut self) -> Result<()> {
        for compiled in &self.ignores {
            self.registry
                .add_ignore(compiled)
                .map_err(|e| GlobwatchError::ConfigError(e.to_string()))?;
        }
        Ok(())
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn cwd(&self) -> &NormalizedPath {
        self.compiler.cwd()
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &WatchLedger<N> {
        &self.ledger
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn compile(&self, pattern: &str) -> std::result::Result<CompiledPattern, WatchError> {
        self.compiler.compile(pattern)
    }

    pub fn subscribe(&mut self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    fn report(&mut self, err: WatchError, report: &mut AddReport) {
        warn!(error = %err, "add failed for one pattern");
        self.bus.publish(WatchEvent::Error(err.clone()));
        report.errors.push(err);
    }

    /// Compile and register patterns.
    ///
    /// Failures are per pattern: a bad pattern or a refused native command is
    /// reported on the `Error` stream and the rest of the batch continues.
    /// The first call that completes fires `Ready`.
    pub fn add<S: AsRef<str>>(&mut self, patterns: &[S]) -> AddReport {
        let mut report = AddReport::default();
        if self.closed {
            warn!("add called on a closed watcher; ignoring");
            return report;
        }
        if self.registry.is_empty() {
            // Re-seed after unwatch_all cleared everything.
            if let Err(e) = self.seed_ignores() {
                warn!(error = %e, "failed to restore ignore patterns");
            }
        }

        let mut dir_patterns = Vec::new();
        for raw in patterns {
            let compiled = match self.compiler.compile(raw.as_ref()) {
                Ok(c) => c,
                Err(err) => {
                    self.report(err, &mut report);
                    continue;
                }
            };
            if let Err(err) = self.registry.add_include(&compiled) {
                self.report(err, &mut report);
                continue;
            }
            debug!(pattern = raw.as_ref(), base = %compiled.base, suffix = %compiled.suffix, "pattern compiled");

            match compiled.target {
                TargetKind::File => match self.ledger.register_file(&compiled.base) {
                    Ok(true) => report.new_targets += 1,
                    Ok(false) => {}
                    Err(err) => self.report(err, &mut report),
                },
                TargetKind::Directory => dir_patterns.push(compiled.clone()),
            }
            report.patterns.push(compiled);
        }

        if !dir_patterns.is_empty() {
            match self.enumerator.directories(&dir_patterns, &self.registry) {
                Ok(dirs) => {
                    for dir in dirs {
                        match self.ledger.register_directory(&dir) {
                            Ok(true) => report.new_targets += 1,
                            Ok(false) => {}
                            Err(err) => self.report(err, &mut report),
                        }
                    }
                }
                Err(e) => self.report(WatchError::Enumeration(format!("{e:#}")), &mut report),
            }
        }

        info!(
            patterns = report.patterns.len(),
            new_targets = report.new_targets,
            errors = report.errors.len(),
            "patterns added"
        );
        self.bus.publish(WatchEvent::Ready);
        report
    }

    /// Unwatch concrete paths (and any targets nested below them).
    ///
    /// Never fails; each path gets a status. Native failures are also
    /// published on the `Error` stream.
    pub fn unwatch<S: AsRef<str>>(&mut self, paths: &[S]) -> Vec<UnwatchStatus> {
        let mut statuses = Vec::with_capacity(paths.len());
        for raw in paths {
            let path = NormalizedPath::resolve(raw.as_ref(), self.cwd());
            let targets = self.ledger.targets_under(&path);
            if targets.is_empty() {
                debug!(%path, "nothing to unwatch");
                statuses.push(UnwatchStatus {
                    path,
                    outcome: UnwatchOutcome::NotWatched,
                });
                continue;
            }

            let mut removed = 0;
            let mut failure = None;
            for target in &targets {
                match self.ledger.unregister(target) {
                    Ok(true) => removed += 1,
                    Ok(false) => {}
                    Err(err) => {
                        warn!(error = %err, "unwatch failed");
                        self.bus.publish(WatchEvent::Error(err.clone()));
                        failure.get_or_insert(err);
                    }
                }
            }

            let outcome = match failure {
                Some(err) => UnwatchOutcome::Failed(err),
                None => UnwatchOutcome::Unwatched(removed),
            };
            statuses.push(UnwatchStatus { path, outcome });
        }
        statuses
    }

    /// Unregister every target and clear all matcher state.
    pub fn unwatch_all(&mut self) {
        let targets = self.ledger.len();
        for err in self.ledger.unregister_all() {
            self.bus.publish(WatchEvent::Error(err));
        }
        self.registry.clear();
        info!(targets, "all watch targets released");
    }

    /// Full teardown. Raw events arriving afterwards are ignored and every
    /// subscription stream ends.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.unwatch_all();
        self.closed = true;
        self.bus.close();
        info!("watcher closed");
    }

    /// Process one message from the native watcher.
    ///
    /// Returns the routed event, if one was emitted.
    pub fn handle_native(&mut self, msg: NativeMessage) -> Option<RoutedEvent> {
        if self.closed {
            debug!("native message after close; ignored");
            return None;
        }

        let raw = match msg {
            Ok(raw) => raw,
            Err(message) => {
                warn!(%message, "native watcher error");
                self.bus.publish(WatchEvent::Error(WatchError::NativeStream(message)));
                return None;
            }
        };

        let outcome = route(
            &raw,
            self.compiler.cwd(),
            &self.registry,
            &mut self.ledger,
            &*self.enumerator,
        );
        for err in outcome.errors {
            warn!(error = %err, "auto-registration failed");
            self.bus.publish(WatchEvent::Error(err));
        }
        if let Some(event) = &outcome.event {
            self.bus.publish(WatchEvent::from(event.clone()));
        }
        outcome.event
    }
}
