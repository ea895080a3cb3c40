//! UseCase: one upstream room subscription and its lifecycle.
//!
//! A `RelaySession` runs as a single tokio task driving the state machine
//!
//! ```text
//! Idle -> Connecting -> Live -> Reconnecting -> Connecting -> ...
//!             |          |           |
//!             +----------+-----------+--> Closed
//! ```
//!
//! Every suspension point (handshake, upstream read, backoff delay) is raced against
//! the stop signal, so `SessionHandle::stop` reaches `Closed` without waiting out a
//! pending handshake or retry delay. Upstream events are forwarded to the
//! `SubscriberRegistry` one at a time, in arrival order.

use std::{fmt, sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};

use crate::domain::{
    ConnectError, ConnectOptions, LiveConnection, LiveConnector, LiveSource, RoomTarget,
    StatusUpdate, SubscriberRegistry, UpstreamSignal, ViewerMessage,
};

/// Lifecycle state of a relay session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Live,
    Reconnecting,
    Closed,
}

impl SessionState {
    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Live)
                | (Connecting, Reconnecting)
                | (Live, Reconnecting)
                | (Reconnecting, Connecting)
                | (Idle | Connecting | Live | Reconnecting, Closed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-delay retry policy
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Handshake attempts allowed in a row before giving up
    pub max_attempts: u32,
    /// Wait between a failure and the next attempt
    pub delay: Duration,
    /// Whether a dropped `Live` connection is re-established
    pub reconnect_on_disconnect: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(10),
            reconnect_on_disconnect: true,
        }
    }
}

/// Why a session reached `Closed`
#[derive(Debug, Clone, PartialEq, Eq)]
enum CloseReason {
    Stopped,
    StreamEnded,
    UpstreamDisconnected,
    ConnectFailed(ConnectError),
}

impl CloseReason {
    fn message(&self) -> String {
        match self {
            Self::Stopped => "Disconnected".to_string(),
            Self::StreamEnded => "Stream ended".to_string(),
            Self::UpstreamDisconnected => "Upstream disconnected".to_string(),
            Self::ConnectFailed(error) => error.message.clone(),
        }
    }
}

/// How the forwarding loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForwardEnd {
    Stopped,
    StreamEnded,
    Disconnected,
}

/// One upstream room subscription
pub struct RelaySession {
    room: RoomTarget,
    options: ConnectOptions,
    policy: ReconnectPolicy,
    connector: Arc<dyn LiveConnector>,
    registry: Arc<dyn SubscriberRegistry>,
    state: watch::Sender<SessionState>,
    attempts: u32,
}

impl RelaySession {
    /// Create an `Idle` session for `room`
    pub fn new(
        room: RoomTarget,
        options: ConnectOptions,
        policy: ReconnectPolicy,
        connector: Arc<dyn LiveConnector>,
        registry: Arc<dyn SubscriberRegistry>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            room,
            options,
            policy,
            connector,
            registry,
            state,
            attempts: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Spawn the session task. The session moves to `Connecting` immediately.
    pub fn start(self) -> SessionHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let state = self.state.subscribe();
        let room = self.room.clone();
        let task = tokio::spawn(self.run(stop_rx));

        SessionHandle {
            room,
            stop_tx,
            task,
            state,
        }
    }

    async fn run(mut self, mut stop_rx: oneshot::Receiver<()>) {
        tracing::info!("Relay session for {} starting", self.room);

        loop {
            self.attempts += 1;
            self.transition(SessionState::Connecting);
            self.notify(StatusUpdate::connecting(format!(
                "Connecting to {} (attempt {}/{})",
                self.room, self.attempts, self.policy.max_attempts
            )))
            .await;

            let outcome = tokio::select! {
                biased;
                _ = &mut stop_rx => None,
                result = self.connector.connect(&self.room, &self.options) => Some(result),
            };
            let Some(result) = outcome else {
                self.close(CloseReason::Stopped).await;
                return;
            };

            match result {
                Ok(LiveConnection {
                    room_info,
                    mut source,
                }) => {
                    self.attempts = 0;
                    self.transition(SessionState::Live);
                    tracing::info!("Connected to {} (roomId {})", self.room, room_info.room_id);
                    self.notify(StatusUpdate::connected(room_info.room_id))
                        .await;

                    let end = self.forward(source.as_mut(), &mut stop_rx).await;
                    source.disconnect().await;

                    match end {
                        ForwardEnd::Stopped => {
                            self.close(CloseReason::Stopped).await;
                            return;
                        }
                        ForwardEnd::StreamEnded => {
                            tracing::info!("Live stream of {} ended", self.room);
                            self.close(CloseReason::StreamEnded).await;
                            return;
                        }
                        ForwardEnd::Disconnected if !self.policy.reconnect_on_disconnect => {
                            self.close(CloseReason::UpstreamDisconnected).await;
                            return;
                        }
                        ForwardEnd::Disconnected => {
                            tracing::warn!(
                                "Lost upstream connection to {}, retrying in {:?}",
                                self.room,
                                self.policy.delay
                            );
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        "Failed to connect to {} (attempt {}/{}): {}",
                        self.room,
                        self.attempts,
                        self.policy.max_attempts,
                        error
                    );
                    if self.attempts >= self.policy.max_attempts {
                        tracing::error!(
                            "Giving up on {} after {} attempts",
                            self.room,
                            self.attempts
                        );
                        self.close(CloseReason::ConnectFailed(error)).await;
                        return;
                    }
                }
            }

            self.transition(SessionState::Reconnecting);
            self.notify(StatusUpdate::connecting(format!(
                "Reconnecting to {} in {}s",
                self.room,
                self.policy.delay.as_secs()
            )))
            .await;

            let resumed = tokio::select! {
                biased;
                _ = &mut stop_rx => false,
                _ = tokio::time::sleep(self.policy.delay) => true,
            };
            if !resumed {
                self.close(CloseReason::Stopped).await;
                return;
            }
        }
    }

    /// Forward upstream signals until the connection ends or the session is stopped.
    async fn forward(
        &self,
        source: &mut dyn LiveSource,
        stop_rx: &mut oneshot::Receiver<()>,
    ) -> ForwardEnd {
        loop {
            let signal = tokio::select! {
                biased;
                _ = &mut *stop_rx => return ForwardEnd::Stopped,
                signal = source.next_signal() => signal,
            };

            match signal {
                Some(UpstreamSignal::Event(event)) => {
                    tracing::trace!("Forwarding {:?} from {}", event.kind(), self.room);
                    self.registry.publish(event).await;
                }
                Some(UpstreamSignal::Error(message)) => {
                    // tolerated: transient protocol errors never end a live session
                    tracing::warn!("Upstream error on {}: {}", self.room, message);
                }
                Some(UpstreamSignal::StreamEnd) => return ForwardEnd::StreamEnded,
                Some(UpstreamSignal::Disconnected) | None => return ForwardEnd::Disconnected,
            }
        }
    }

    async fn close(&mut self, reason: CloseReason) {
        self.transition(SessionState::Closed);
        self.registry.reset_history().await;
        self.notify(StatusUpdate::disconnected(reason.message()))
            .await;
        tracing::info!("Relay session for {} closed: {}", self.room, reason.message());
    }

    async fn notify(&self, status: StatusUpdate) {
        self.registry.broadcast(ViewerMessage::Status(status)).await;
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if !previous.can_transition_to(next) {
            tracing::error!(
                "Unexpected session transition {} -> {} for {}",
                previous,
                next,
                self.room
            );
        } else {
            tracing::debug!("Session {}: {} -> {}", self.room, previous, next);
        }
    }
}

/// Control handle of a running session
///
/// Dropping the handle stops the session as well.
pub struct SessionHandle {
    room: RoomTarget,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn room(&self) -> &RoomTarget {
        &self.room
    }

    pub fn state(&self) -> SessionState {
        if self.task.is_finished() {
            return SessionState::Closed;
        }
        *self.state.borrow()
    }

    pub fn is_alive(&self) -> bool {
        !self.state().is_closed()
    }

    /// Wait until the session reaches `state` (or closes). Returns the state reached.
    pub async fn wait_for(&mut self, state: SessionState) -> SessionState {
        match self
            .state
            .wait_for(|current| *current == state || current.is_closed())
            .await
        {
            Ok(current) => *current,
            Err(_) => SessionState::Closed,
        }
    }

    /// Stop the session and wait until its task has fully finished.
    ///
    /// Cancels a pending handshake or retry delay; the upstream source is released
    /// before this returns.
    pub async fn stop(self) -> SessionState {
        let SessionHandle {
            room,
            stop_tx,
            task,
            state,
        } = self;

        // the task may already be gone (terminal failure); that is fine
        let _ = stop_tx.send(());

        if let Err(e) = task.await
            && e.is_panic()
        {
            tracing::error!("Relay session for {} panicked: {}", room, e);
        }

        let last = *state.borrow();
        if !last.is_closed() {
            tracing::warn!("Relay session for {} ended in state {}", room, last);
        }
        SessionState::Closed
    }
}
