//! Notification fan-out.
//!
//! The engine publishes from its tick loop; subscribers read from arbitrary
//! tasks. Publish never blocks: each subscriber gets a bounded channel, a
//! full buffer drops that delivery and a closed one evicts the subscriber on
//! the spot. A bounded newest-first history backs the pull endpoint and the
//! replay-on-connect snapshot for late subscribers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::warn;
use tokio::sync::mpsc;

use crate::models::{Notification, NotificationLevel};

/// Notifications retained for the pull endpoint.
pub const HISTORY_CAPACITY: usize = 100;
/// Most recent notifications replayed to a newly connected subscriber.
pub const BACKLOG_LIMIT: usize = 50;

const SUBSCRIBER_BUFFER: usize = 64;

/// Cross-process fan-out seam. A transport implementation republishes every
/// notification to other server instances with at-least-once semantics and
/// no cross-process ordering guarantee. Failures here are logged and dropped;
/// retries and backoff belong to the transport, never to the tick loop.
pub trait Replicator: Send + Sync {
    fn replicate(&self, notification: &Notification) -> anyhow::Result<()>;
}

struct SubscriberSlot {
    id: u64,
    tx: mpsc::Sender<Notification>,
}

struct RelayInner {
    /// Newest-first, truncated to `HISTORY_CAPACITY`.
    history: VecDeque<Notification>,
    subscribers: Vec<SubscriberSlot>,
    next_subscriber_id: u64,
}

#[derive(Clone)]
pub struct NotificationRelay {
    inner: Arc<Mutex<RelayInner>>,
    replicator: Option<Arc<dyn Replicator>>,
}

/// A live subscriber handle. Dropping it (or calling `unsubscribe`) removes
/// the subscriber from the relay immediately.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<Notification>,
    relay: NotificationRelay,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Notification, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.relay.remove_subscriber(self.id);
    }
}

impl Default for NotificationRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationRelay {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RelayInner {
                history: VecDeque::with_capacity(HISTORY_CAPACITY),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
            replicator: None,
        }
    }

    pub fn with_replicator(mut self, replicator: Arc<dyn Replicator>) -> Self {
        self.replicator = Some(replicator);
        self
    }

    /// Appends to the history and fans out to every live subscriber, at most
    /// once each and in publish order.
    pub fn publish(&self, notification: Notification) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.history.push_front(notification.clone());
            inner.history.truncate(HISTORY_CAPACITY);

            inner
                .subscribers
                .retain(|slot| match slot.tx.try_send(notification.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        // Slow subscriber: drop this delivery rather than
                        // stall the publisher.
                        warn!("subscriber {} buffer full, dropping notification", slot.id);
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => false,
                });
        }

        if let Some(replicator) = &self.replicator {
            if let Err(err) = replicator.replicate(&notification) {
                warn!("notification replication failed, dropping: {err:#}");
            }
        }
    }

    /// Registers a live subscriber and returns the replay backlog: up to
    /// `BACKLOG_LIMIT` most recent notifications, oldest-first. The snapshot
    /// and the live stream share one exact cutover point: registration and
    /// publish take the same lock, so nothing is duplicated or dropped
    /// between them.
    pub fn subscribe(&self) -> (Subscription, Vec<Notification>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);

        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_subscriber_id;
        inner.next_subscriber_id += 1;
        inner.subscribers.push(SubscriberSlot { id, tx });

        let mut backlog: Vec<Notification> =
            inner.history.iter().take(BACKLOG_LIMIT).cloned().collect();
        backlog.reverse();
        drop(inner);

        (
            Subscription {
                id,
                rx,
                relay: self.clone(),
            },
            backlog,
        )
    }

    fn remove_subscriber(&self, id: u64) {
        self.inner
            .lock()
            .unwrap()
            .subscribers
            .retain(|slot| slot.id != id);
    }

    /// Most recent notifications, newest-first (the pull endpoint shape).
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap()
            .history
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Manual notification entry point, for operator and test traffic.
    pub fn send(
        &self,
        message: impl Into<String>,
        device: Option<String>,
        level: NotificationLevel,
    ) -> Notification {
        let notification = Notification::new(message, device, level, Utc::now());
        self.publish(notification.clone());
        notification
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().history.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }
}
