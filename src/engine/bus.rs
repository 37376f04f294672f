// src/engine/bus.rs

//! Typed fan-out of [`WatchEvent`]s to subscribers.

use tokio::sync::mpsc;
use tracing::trace;

use super::{EventFilter, WatchEvent};

/// Receiving end of a subscription. Yields `None` once the watcher closes.
pub type Subscription = mpsc::UnboundedReceiver<WatchEvent>;

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<(EventFilter, mpsc::UnboundedSender<WatchEvent>)>,
    ready_sent: bool,
    closed: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. A `Ready` subscriber that arrives after the
    /// ready signal fired receives it immediately. After [`close`] the
    /// returned stream is already finished.
    ///
    /// [`close`]: EventBus::close
    pub fn subscribe(&mut self, filter: EventFilter) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.closed {
            return rx;
        }
        if filter == EventFilter::Ready && self.ready_sent {
            // The receiver is alive (we hold it), so this cannot fail.
            let _ = tx.send(WatchEvent::Ready);
        }
        self.subscribers.push((filter, tx));
        rx
    }

    /// Deliver `event` to every subscriber whose filter accepts it, dropping
    /// subscribers whose receiver is gone. `Ready` is delivered at most once.
    pub fn publish(&mut self, event: WatchEvent) {
        if event == WatchEvent::Ready {
            if self.ready_sent {
                return;
            }
            self.ready_sent = true;
        }
        self.subscribers.retain(|(filter, tx)| {
            if tx.is_closed() {
                trace!(?filter, "dropping closed subscriber");
                return false;
            }
            !filter.accepts(&event) || tx.send(event.clone()).is_ok()
        });
    }

    pub fn ready_sent(&self) -> bool {
        self.ready_sent
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscriber; their streams end.
    pub fn close(&mut self) {
        self.closed = true;
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;
    use crate::watch::path_utils::NormalizedPath;
    use std::path::Path;

    fn added(p: &str) -> WatchEvent {
        WatchEvent::Added(NormalizedPath::from_absolute(Path::new(p)).unwrap())
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_publish() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe(EventFilter::All);
        drop(bus.subscribe(EventFilter::Kind(EventKind::Added)));
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(added("/w/a"));

        assert_eq!(bus.subscriber_count(), 1);
        drop(keep);
    }

    #[test]
    fn ready_is_published_once() {
        let mut bus = EventBus::new();
        let mut rx = bus.subscribe(EventFilter::Ready);
        bus.publish(WatchEvent::Ready);
        bus.publish(WatchEvent::Ready);

        assert!(bus.ready_sent());
        assert_eq!(rx.try_recv().ok(), Some(WatchEvent::Ready));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn filters_route_errors_and_changes_apart() {
        let mut bus = EventBus::new();
        let mut changes = bus.subscribe(EventFilter::All);
        let mut errors = bus.subscribe(EventFilter::Error);

        bus.publish(added("/w/a"));
        bus.publish(WatchEvent::Error(crate::errors::WatchError::NativeStream("x".into())));

        assert_eq!(changes.try_recv().ok(), Some(added("/w/a")));
        assert!(changes.try_recv().is_err());
        assert!(matches!(errors.try_recv(), Ok(WatchEvent::Error(_))));
        assert!(errors.try_recv().is_err());
    }
}
