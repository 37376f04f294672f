use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use globwatch::types::TargetKind;
use globwatch::watch::{NativeMessage, NativeWatcher, NormalizedPath};
use tokio::sync::mpsc;

/// A command the controller issued to the native layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Add(String, TargetKind),
    Remove(String),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<NativeCall>,
    fail_add: HashSet<String>,
    fail_remove: HashSet<String>,
}

/// A native watcher that:
/// - records every add/remove command
/// - fails commands for paths it was told to fail for.
///
/// Clones share state, so a test can keep one clone for assertions after moving
/// the other into a controller.
#[derive(Debug, Clone, Default)]
pub struct FakeNativeWatcher {
    state: Arc<Mutex<State>>,
}

impl FakeNativeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_add_for(&self, path: &str) {
        self.state.lock().unwrap().fail_add.insert(path.to_string());
    }

    pub fn fail_remove_for(&self, path: &str) {
        self.state.lock().unwrap().fail_remove.insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Paths that received an `Add` command, in order.
    pub fn added(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NativeCall::Add(p, _) => Some(p),
                NativeCall::Remove(_) => None,
            })
            .collect()
    }

    /// Paths that received a `Remove` command, in order.
    pub fn removed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NativeCall::Remove(p) => Some(p),
                NativeCall::Add(..) => None,
            })
            .collect()
    }
}

impl NativeWatcher for FakeNativeWatcher {
    fn add(&mut self, path: &NormalizedPath, kind: TargetKind) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_add.contains(path.as_str()) {
            bail!("simulated add failure");
        }
        state.calls.push(NativeCall::Add(path.to_string(), kind));
        Ok(())
    }

    fn remove(&mut self, path: &NormalizedPath) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_remove.contains(path.as_str()) {
            bail!("simulated remove failure");
        }
        state.calls.push(NativeCall::Remove(path.to_string()));
        Ok(())
    }
}

/// A fake native watcher plus the channel raw events are pushed through.
pub fn fake_native_channel() -> (
    FakeNativeWatcher,
    mpsc::UnboundedSender<NativeMessage>,
    mpsc::UnboundedReceiver<NativeMessage>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FakeNativeWatcher::new(), tx, rx)
}
