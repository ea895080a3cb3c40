//! UseCase: serialize viewer requests against the single upstream session.
//!
//! The supervisor owns the only `SessionHandle` slot in the process. Replacing the
//! session (stop the old one, wait for its task to end, start the new one) happens
//! under the slot's lock on a detached task, so two sessions are never alive at the
//! same time, even when a request is cancelled halfway.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::domain::{
    Authorizer, ConnectOptions, Credential, LiveConnector, RelayEvent, RoomTarget, StatusUpdate,
    SubscriberRegistry, Viewer, ViewerId, ViewerMessage,
};

use super::{
    error::ConnectRequestError,
    relay_session::{ReconnectPolicy, RelaySession, SessionHandle, SessionState},
};

/// Parameters applied to every session the supervisor starts
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub policy: ReconnectPolicy,
    pub poll_interval: Duration,
    pub handshake_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let options = ConnectOptions::default();
        Self {
            policy: ReconnectPolicy::default(),
            poll_interval: options.poll_interval,
            handshake_timeout: options.handshake_timeout,
        }
    }
}

/// Snapshot of the relay for the HTTP API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub room: Option<String>,
    pub state: SessionState,
    pub viewers: usize,
    pub buffered_events: usize,
}

/// The single session slot and what it needs to start sessions
///
/// Cloned into detached tasks so that a slot operation, once begun, always runs to
/// completion even if the requesting task is cancelled.
#[derive(Clone)]
struct SessionSlot {
    registry: Arc<dyn SubscriberRegistry>,
    connector: Arc<dyn LiveConnector>,
    settings: SessionSettings,
    active: Arc<Mutex<Option<SessionHandle>>>,
}

impl SessionSlot {
    async fn replace(self, viewer: Viewer, room: RoomTarget, credential: Option<Credential>) {
        let mut active = self.active.lock().await;

        if let Some(previous) = active.take() {
            tracing::info!(
                "Stopping session for {} before connecting to {}",
                previous.room(),
                room
            );
            previous.stop().await;
        }

        self.registry.reset_history().await;
        if !self.registry.contains(&viewer.id).await {
            self.registry.join(viewer).await;
        }

        let options = ConnectOptions {
            credential,
            poll_interval: self.settings.poll_interval,
            handshake_timeout: self.settings.handshake_timeout,
        };
        let session = RelaySession::new(
            room,
            options,
            self.settings.policy.clone(),
            self.connector.clone(),
            self.registry.clone(),
        );
        *active = Some(session.start());
    }

    async fn clear(self) -> bool {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(handle) => {
                tracing::info!("Disconnect requested for {}", handle.room());
                handle.stop().await;
                true
            }
            None => false,
        }
    }
}

pub struct ConnectionSupervisor {
    authorizer: Arc<dyn Authorizer>,
    slot: SessionSlot,
}

impl ConnectionSupervisor {
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        authorizer: Arc<dyn Authorizer>,
        connector: Arc<dyn LiveConnector>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            authorizer,
            slot: SessionSlot {
                registry,
                connector,
                settings,
                active: Arc::new(Mutex::new(None)),
            },
        }
    }

    /// Switch the relay to `room` on behalf of `viewer`.
    ///
    /// A refused request is reported to the requesting viewer only and leaves the
    /// current session running. Once accepted, the switch completes even if the
    /// caller is cancelled.
    pub async fn request_connect(
        &self,
        viewer: &Viewer,
        room: &str,
        credential: Option<String>,
    ) -> Result<RoomTarget, ConnectRequestError> {
        let decision = self.authorizer.is_authorized(viewer.token.clone()).await;
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "Access denied".to_string());
            tracing::warn!("Viewer '{}' not authorized: {}", viewer.id, reason);
            return Err(self.refuse(viewer, ConnectRequestError::Unauthorized(reason)));
        }

        let room = match RoomTarget::try_from(room) {
            Ok(room) => room,
            Err(e) => {
                tracing::warn!("Viewer '{}' requested an invalid room: {}", viewer.id, e);
                return Err(self.refuse(viewer, e.into()));
            }
        };
        // a blank credential means "none"
        let credential = credential.and_then(|value| Credential::try_from(value).ok());

        let replacement = tokio::spawn(self.slot.clone().replace(
            viewer.clone(),
            room.clone(),
            credential,
        ));
        if let Err(e) = replacement.await {
            tracing::error!("Switching the relay to {} failed: {}", room, e);
        }

        tracing::info!("Viewer '{}' connected the relay to {}", viewer.id, room);
        Ok(room)
    }

    /// Stop the active session. Returns whether there was one.
    pub async fn request_disconnect(&self) -> bool {
        match tokio::spawn(self.slot.clone().clear()).await {
            Ok(stopped) => stopped,
            Err(e) => {
                tracing::error!("Stopping the relay session failed: {}", e);
                false
            }
        }
    }

    /// Register a new viewer; it receives the current history right away.
    pub async fn on_viewer_channel_open(&self, viewer: Viewer) {
        self.slot.registry.join(viewer).await;
    }

    /// Forget a viewer. The upstream session keeps running.
    pub async fn on_viewer_channel_close(&self, viewer_id: &ViewerId) {
        self.slot.registry.leave(viewer_id).await;
    }

    pub async fn session_summary(&self) -> SessionSummary {
        let (room, state) = {
            let active = self.slot.active.lock().await;
            match active.as_ref() {
                Some(handle) => (Some(handle.room().as_str().to_string()), handle.state()),
                None => (None, SessionState::Idle),
            }
        };

        SessionSummary {
            room,
            state,
            viewers: self.slot.registry.viewer_count().await,
            buffered_events: self.slot.registry.snapshot().await.len(),
        }
    }

    pub async fn history(&self) -> Vec<RelayEvent> {
        self.slot.registry.snapshot().await
    }

    /// Stop the active session on process shutdown
    pub async fn shutdown(&self) {
        if self.request_disconnect().await {
            tracing::info!("Active relay session stopped");
        }
    }

    fn refuse(&self, viewer: &Viewer, error: ConnectRequestError) -> ConnectRequestError {
        let status = ViewerMessage::Status(StatusUpdate::error(error.to_string()));
        if let Err(e) = viewer.channel.push(status) {
            tracing::debug!("Could not report refusal to viewer '{}': {}", viewer.id, e);
        }
        error
    }
}
