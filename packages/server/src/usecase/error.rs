//! UseCase-level error types.

use thiserror::Error;

use crate::domain::ValueObjectError;

/// Reasons a viewer's connect request is refused
///
/// Both variants are reported to the requesting viewer only; the active session is
/// left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectRequestError {
    /// The viewer failed the authorization check
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested room identifier is not usable
    #[error("Invalid room: {0}")]
    InvalidRoom(#[from] ValueObjectError),
}
