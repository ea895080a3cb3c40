//! Server configuration from command-line arguments and `LIVERELAY_*` environment
//! variables.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use thiserror::Error;

use crate::{
    domain::DEFAULT_HISTORY_CAPACITY,
    usecase::{ReconnectPolicy, SessionSettings},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Upstream must be 'simulated' or a ws:// URL, got '{0}'")]
    InvalidUpstream(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Where upstream events come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamKind {
    /// In-process synthetic feed
    Simulated,
    /// External live connector reachable over WebSocket
    WebSocket(String),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "liverelay-server")]
#[command(about = "Relay one live room's events to many websocket viewers", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "LIVERELAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "LIVERELAY_PORT", default_value = "8080")]
    pub port: u16,

    /// Upstream connector: a ws:// URL, or "simulated"
    #[arg(short = 'u', long, env = "LIVERELAY_UPSTREAM", default_value = "simulated")]
    pub upstream: String,

    /// Number of events kept for late-joining viewers
    #[arg(long, env = "LIVERELAY_HISTORY_CAPACITY", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    pub history_capacity: usize,

    /// Handshake attempts before a session gives up
    #[arg(long, env = "LIVERELAY_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    /// Delay between reconnect attempts, in seconds
    #[arg(long, env = "LIVERELAY_RECONNECT_DELAY_SECS", default_value_t = 10)]
    pub reconnect_delay_secs: u64,

    /// Do not reconnect when a live upstream connection drops
    #[arg(long, env = "LIVERELAY_NO_RECONNECT_ON_DISCONNECT")]
    pub no_reconnect_on_disconnect: bool,

    /// Upstream polling interval, in milliseconds
    #[arg(long, env = "LIVERELAY_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Upstream handshake timeout, in seconds
    #[arg(long, env = "LIVERELAY_HANDSHAKE_TIMEOUT_SECS", default_value_t = 15)]
    pub handshake_timeout_secs: u64,

    /// Outbound queue size per viewer; messages beyond it are dropped
    #[arg(long, env = "LIVERELAY_VIEWER_QUEUE", default_value_t = 256)]
    pub viewer_queue: usize,

    /// JSON user file for authorization (every viewer is allowed when omitted)
    #[arg(long, env = "LIVERELAY_USERS_FILE")]
    pub users_file: Option<PathBuf>,
}

impl ServerArgs {
    /// Reject values the relay cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Zero("history-capacity"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero("max-attempts"));
        }
        if self.viewer_queue == 0 {
            return Err(ConfigError::Zero("viewer-queue"));
        }
        self.upstream().map(|_| ())
    }

    pub fn upstream(&self) -> Result<UpstreamKind, ConfigError> {
        let upstream = self.upstream.trim();
        if upstream.eq_ignore_ascii_case("simulated") {
            return Ok(UpstreamKind::Simulated);
        }
        if upstream.starts_with("ws://") {
            return Ok(UpstreamKind::WebSocket(upstream.to_string()));
        }
        Err(ConfigError::InvalidUpstream(self.upstream.clone()))
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_secs(self.reconnect_delay_secs),
            reconnect_on_disconnect: !self.no_reconnect_on_disconnect,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            policy: self.reconnect_policy(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
        }
    }
}
