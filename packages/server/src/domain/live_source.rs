//! Upstream live-platform capability.
//!
//! The relay never speaks the platform protocol itself. A `LiveConnector` performs the
//! handshake for one room and hands back a `LiveSource`: a single ordered stream of
//! upstream signals, exclusively owned by the relay session that opened it.

use std::time::Duration;

use async_trait::async_trait;

use super::{
    error::ConnectError,
    event::RelayEvent,
    value_object::{Credential, RoomTarget},
};

/// Result of a successful upstream handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// Platform-side identifier of the live room
    pub room_id: String,
}

/// Options passed to the connector for every handshake
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub credential: Option<Credential>,
    pub poll_interval: Duration,
    pub handshake_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            credential: None,
            poll_interval: Duration::from_millis(1_000),
            handshake_timeout: Duration::from_secs(15),
        }
    }
}

/// One item read from the upstream connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamSignal {
    Event(RelayEvent),
    /// The broadcaster ended the live stream
    StreamEnd,
    /// The upstream connection dropped
    Disconnected,
    /// Non-fatal protocol error; the connection stays up
    Error(String),
}

/// An established upstream connection
pub struct LiveConnection {
    pub room_info: RoomInfo,
    pub source: Box<dyn LiveSource>,
}

/// Open upstream connection to one room
#[async_trait]
pub trait LiveSource: Send {
    /// Next signal in arrival order. `None` means the connection is gone.
    async fn next_signal(&mut self) -> Option<UpstreamSignal>;

    /// Release the upstream connection. Safe to call more than once.
    async fn disconnect(&mut self);
}

/// Factory performing the upstream handshake
#[async_trait]
pub trait LiveConnector: Send + Sync {
    async fn connect(
        &self,
        room: &RoomTarget,
        options: &ConnectOptions,
    ) -> Result<LiveConnection, ConnectError>;
}
