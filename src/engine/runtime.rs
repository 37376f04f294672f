// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::WatchOptions;
use crate::errors::{GlobwatchError, Result, UnwatchStatus};
use crate::fs::FileSystem;
use crate::watch::native::{NativeMessage, NativeWatcher};

use super::bus::Subscription;
use super::core::{AddReport, GlobWatcher};
use super::EventFilter;

/// Capacity of the caller → runtime command channel.
const CONTROL_CHANNEL_CAPACITY: usize = 64;

/// Requests sent from a [`WatcherHandle`] to the runtime task.
#[derive(Debug)]
pub enum ControlCommand {
    Add {
        patterns: Vec<String>,
        reply: oneshot::Sender<AddReport>,
    },
    Unwatch {
        paths: Vec<String>,
        reply: oneshot::Sender<Vec<UnwatchStatus>>,
    },
    UnwatchAll {
        reply: oneshot::Sender<()>,
    },
    Subscribe {
        filter: EventFilter,
        reply: oneshot::Sender<Subscription>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Drives a [`GlobWatcher`] from two channels: raw native messages and
/// caller commands.
///
/// Both are handled on one task, one item at a time, so a raw event is
/// always fully routed before the next raw event or command is looked at.
/// Routed events therefore keep the order of their raw events.
pub struct Runtime<N: NativeWatcher> {
    core: GlobWatcher<N>,
    native_rx: mpsc::UnboundedReceiver<NativeMessage>,
    control_rx: mpsc::Receiver<ControlCommand>,
}

impl<N: NativeWatcher> fmt::Debug for Runtime<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<N: NativeWatcher> Runtime<N> {
    pub fn new(
        core: GlobWatcher<N>,
        native_rx: mpsc::UnboundedReceiver<NativeMessage>,
        control_rx: mpsc::Receiver<ControlCommand>,
    ) -> Self {
        Self {
            core,
            native_rx,
            control_rx,
        }
    }

    /// Main event loop. Returns after `Close`, or once every handle has
    /// been dropped (which closes the watcher too).
    pub async fn run(mut self) {
        info!(cwd = %self.core.cwd(), "globwatch runtime started");
        let mut native_open = true;

        loop {
            tokio::select! {
                // Caller commands first, so an `add` issued before a burst of
                // native events is applied before they are routed.
                biased;

                cmd = self.control_rx.recv() => match cmd {
                    Some(cmd) => {
                        if !self.execute(cmd) {
                            break;
                        }
                    }
                    None => {
                        info!("all watcher handles dropped; closing");
                        self.core.close();
                        break;
                    }
                },

                msg = self.native_rx.recv(), if native_open => match msg {
                    Some(msg) => {
                        self.core.handle_native(msg);
                    }
                    None => {
                        debug!("native event channel closed");
                        native_open = false;
                    }
                },
            }
        }

        info!("runtime exiting");
    }

    /// Apply one command. Returns false when the loop should stop.
    fn execute(&mut self, command: ControlCommand) -> bool {
        // A dropped reply receiver just means the caller stopped waiting.
        match command {
            ControlCommand::Add { patterns, reply } => {
                let _ = reply.send(self.core.add(patterns.as_slice()));
            }
            ControlCommand::Unwatch { paths, reply } => {
                let _ = reply.send(self.core.unwatch(paths.as_slice()));
            }
            ControlCommand::UnwatchAll { reply } => {
                self.core.unwatch_all();
                let _ = reply.send(());
            }
            ControlCommand::Subscribe { filter, reply } => {
                let _ = reply.send(self.core.subscribe(filter));
            }
            ControlCommand::Close { reply } => {
                self.core.close();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }
}

/// Cloneable async handle to a running watcher.
#[derive(Debug, Clone)]
pub struct WatcherHandle {
    control_tx: mpsc::Sender<ControlCommand>,
}

impl WatcherHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ControlCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.control_tx
            .send(make(reply))
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())
    }

    /// Compile and register patterns. Per-pattern failures are in the
    /// report and on the `Error` stream; only a stopped runtime is an `Err`.
    pub async fn add<I, S>(&self, patterns: I) -> Result<AddReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        self.request(|reply| ControlCommand::Add { patterns, reply }).await
    }

    pub async fn unwatch<I, S>(&self, paths: I) -> Result<Vec<UnwatchStatus>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        self.request(|reply| ControlCommand::Unwatch { paths, reply }).await
    }

    pub async fn unwatch_all(&self) -> Result<()> {
        self.request(|reply| ControlCommand::UnwatchAll { reply }).await
    }

    pub async fn subscribe(&self, filter: EventFilter) -> Result<Subscription> {
        self.request(|reply| ControlCommand::Subscribe { filter, reply }).await
    }

    pub async fn close(&self) -> Result<()> {
        self.request(|reply| ControlCommand::Close { reply }).await
    }
}

fn stopped() -> GlobwatchError {
    GlobwatchError::Other(anyhow!("watcher runtime has stopped"))
}

/// Build a controller around `native` and run it on a tokio task.
///
/// `native_rx` must be the receiving end of the channel `native` delivers
/// its messages into.
pub fn spawn_with_native<N>(
    options: WatchOptions,
    native: N,
    native_rx: mpsc::UnboundedReceiver<NativeMessage>,
    fs: Arc<dyn FileSystem>,
) -> Result<WatcherHandle>
where
    N: NativeWatcher + 'static,
{
    let core = GlobWatcher::new(options, native, fs)?;
    let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
    let runtime = Runtime::new(core, native_rx, control_rx);
    tokio::spawn(runtime.run());
    Ok(WatcherHandle { control_tx })
}
