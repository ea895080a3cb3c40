//! Viewer channels and the registry that fans events out to them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::PushError,
    event::{RelayEvent, ViewerMessage},
    value_object::{ViewerId, ViewerToken},
};

/// Outbound queue of one viewer
///
/// Bounded; a full queue drops the message instead of blocking the sender.
#[derive(Debug, Clone)]
pub struct ViewerChannel {
    sender: mpsc::Sender<ViewerMessage>,
}

impl ViewerChannel {
    pub fn new(sender: mpsc::Sender<ViewerMessage>) -> Self {
        Self { sender }
    }

    /// Create a channel and the receiver the transport drains
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ViewerMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }

    /// Enqueue a message without waiting
    pub fn push(&self, message: ViewerMessage) -> Result<(), PushError> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::Full,
            mpsc::error::TrySendError::Closed(_) => PushError::Closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A connected viewer
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: ViewerId,
    pub token: Option<ViewerToken>,
    pub channel: ViewerChannel,
}

impl Viewer {
    pub fn new(token: Option<ViewerToken>, channel: ViewerChannel) -> Self {
        Self {
            id: ViewerId::generate(),
            token,
            channel,
        }
    }
}

/// Tracks connected viewers and the replay buffer of the current session
///
/// `join` and `publish` are mutually atomic: a joining viewer receives the history
/// snapshot before any event published after it, and never an event twice.
/// Delivery failures are absorbed: closed viewers are pruned, full queues drop.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Send the viewer the current history as one message, then register it
    async fn join(&self, viewer: Viewer);

    /// Deregister a viewer. Returns whether it was registered.
    async fn leave(&self, viewer_id: &ViewerId) -> bool;

    async fn contains(&self, viewer_id: &ViewerId) -> bool;

    /// Append to history (unless a gauge) and fan out to every viewer
    async fn publish(&self, event: RelayEvent);

    /// Fan out a message without touching history
    async fn broadcast(&self, message: ViewerMessage);

    async fn reset_history(&self);

    async fn snapshot(&self) -> Vec<RelayEvent>;

    async fn viewer_count(&self) -> usize;
}
