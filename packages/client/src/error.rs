//! Client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Server rejected the websocket upgrade with HTTP {0}")]
    HandshakeRejected(u16),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}
