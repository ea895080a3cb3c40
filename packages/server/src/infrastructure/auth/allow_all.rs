//! `Authorizer` that lets every viewer drive the relay.

use async_trait::async_trait;

use crate::domain::{AuthDecision, Authorizer, ViewerToken};

/// Used when no user file is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAuthorizer;

#[async_trait]
impl Authorizer for AllowAllAuthorizer {
    async fn is_authorized(&self, _token: Option<ViewerToken>) -> AuthDecision {
        AuthDecision::allow()
    }
}
