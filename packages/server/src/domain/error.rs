//! Domain error types.

use thiserror::Error;

/// Validation errors raised when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room identifier is empty (after trimming whitespace and a leading '@')
    #[error("Room identifier must not be empty")]
    EmptyRoom,

    /// Room identifier contains characters the upstream platform does not allow
    #[error("Invalid room identifier '{0}'")]
    InvalidRoom(String),

    /// Room identifier exceeds the maximum length
    #[error("Room identifier is too long ({0} characters)")]
    RoomTooLong(usize),

    /// Credential or token is blank
    #[error("Value must not be blank")]
    Blank,
}

/// Upstream handshake failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConnectError {
    /// Human-readable reason reported to viewers on terminal failure
    pub message: String,
}

impl ConnectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-viewer delivery failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError {
    /// The viewer's channel has been closed (viewer went away)
    #[error("viewer channel closed")]
    Closed,

    /// The viewer's queue is full; the message was dropped
    #[error("viewer queue full")]
    Full,
}
