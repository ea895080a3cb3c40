//! In-process `SubscriberRegistry` over bounded mpsc queues.
//!
//! The websocket handler creates one `ViewerChannel` per connection and drains its
//! receiver into the socket. This registry only holds the sending halves.
//!
//! History and viewers live behind one lock so that append + fan-out and
//! snapshot + register are each atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    EventBuffer, PushError, RelayEvent, SubscriberRegistry, Viewer, ViewerChannel, ViewerId,
    ViewerMessage,
};

struct RegistryInner {
    history: EventBuffer,
    viewers: HashMap<ViewerId, ViewerChannel>,
}

impl RegistryInner {
    /// Deliver to every viewer; prune the ones whose channel is closed.
    fn fan_out(&mut self, message: &ViewerMessage) {
        let mut closed = Vec::new();

        for (viewer_id, channel) in &self.viewers {
            match channel.push(message.clone()) {
                Ok(()) => {}
                Err(PushError::Full) => {
                    tracing::warn!("Viewer '{}' queue full, dropping message", viewer_id);
                }
                Err(_) => closed.push(*viewer_id),
            }
        }

        for viewer_id in closed {
            self.viewers.remove(&viewer_id);
            tracing::debug!("Pruned closed viewer '{}'", viewer_id);
        }
    }
}

/// Registry of connected viewers plus the replay buffer
pub struct ChannelSubscriberRegistry {
    inner: Mutex<RegistryInner>,
}

impl ChannelSubscriberRegistry {
    /// Create an empty registry keeping up to `history_capacity` events
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                history: EventBuffer::new(history_capacity),
                viewers: HashMap::new(),
            }),
        }
    }
}

#[async_trait]
impl SubscriberRegistry for ChannelSubscriberRegistry {
    async fn join(&self, viewer: Viewer) {
        let mut inner = self.inner.lock().await;

        let history = inner.history.snapshot();
        let count = history.len();
        match viewer.channel.push(ViewerMessage::History(history)) {
            Ok(()) => {}
            Err(PushError::Closed) => {
                tracing::debug!("Viewer '{}' closed before joining", viewer.id);
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to deliver history to viewer '{}': {}", viewer.id, e);
            }
        }

        inner.viewers.insert(viewer.id, viewer.channel);
        tracing::debug!(
            "Viewer '{}' joined with {} history events ({} viewers)",
            viewer.id,
            count,
            inner.viewers.len()
        );
    }

    async fn leave(&self, viewer_id: &ViewerId) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.viewers.remove(viewer_id).is_some();
        if removed {
            tracing::debug!("Viewer '{}' left ({} viewers)", viewer_id, inner.viewers.len());
        }
        removed
    }

    async fn contains(&self, viewer_id: &ViewerId) -> bool {
        let inner = self.inner.lock().await;
        inner.viewers.contains_key(viewer_id)
    }

    async fn publish(&self, event: RelayEvent) {
        let mut inner = self.inner.lock().await;

        // viewers must see the stored form (timestamp clamped)
        let event = match inner.history.append(event.clone()) {
            Some(stored) => stored.clone(),
            None => event,
        };
        inner.fan_out(&ViewerMessage::Event(event));
    }

    async fn broadcast(&self, message: ViewerMessage) {
        let mut inner = self.inner.lock().await;
        inner.fan_out(&message);
    }

    async fn reset_history(&self) {
        let mut inner = self.inner.lock().await;
        inner.history.clear();
    }

    async fn snapshot(&self) -> Vec<RelayEvent> {
        let inner = self.inner.lock().await;
        inner.history.snapshot()
    }

    async fn viewer_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.viewers.len()
    }
}
