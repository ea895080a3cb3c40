//! Viewer authorization capability.

use async_trait::async_trait;

use super::value_object::ViewerToken;

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AuthDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether a viewer may drive the upstream session
///
/// Implementations own the user store; the relay only asks yes or no.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_authorized(&self, token: Option<ViewerToken>) -> AuthDecision;
}
