//! `Authorizer` backed by a JSON user file.
//!
//! The viewer token is `username:password`. A user may drive the relay when the
//! password matches and it is either an admin or holds a subscription that has not
//! expired yet.
//!
//! ```json
//! [
//!   { "username": "admin", "password": "admin123", "role": "admin" },
//!   {
//!     "username": "alice",
//!     "password": "s3cret",
//!     "role": "user",
//!     "subscriptionExpiry": "2026-12-31T00:00:00Z"
//!   }
//! ]
//! ```

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{AuthDecision, Authorizer, ViewerToken};
use liverelay_shared::time::{Clock, SystemClock};

const INVALID_LOGIN: &str = "Invalid username or password";

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("Failed to read user file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse user file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// One entry of the user file
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub subscription_expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("subscription_expiry", &self.subscription_expiry)
            .finish_non_exhaustive()
    }
}

fn default_role() -> Role {
    Role::User
}

/// Split a `username:password` token
fn split_login(token: &ViewerToken) -> Option<(&str, &str)> {
    let (username, password) = token.as_str().split_once(':')?;
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some((username, password))
}

pub struct JsonUserStore {
    users: HashMap<String, UserRecord>,
    clock: Arc<dyn Clock>,
}

impl JsonUserStore {
    /// Load the user file at `path`
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, UserStoreError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| UserStoreError::Io {
                path: path_str.clone(),
                source,
            })?;
        let users: Vec<UserRecord> =
            serde_json::from_str(&content).map_err(|source| UserStoreError::Parse {
                path: path_str.clone(),
                source,
            })?;

        tracing::info!("Loaded {} users from {}", users.len(), path_str);
        Ok(Self::from_records(users, Arc::new(SystemClock)))
    }

    pub fn from_records(users: Vec<UserRecord>, clock: Arc<dyn Clock>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self { users, clock }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn decide(&self, token: Option<&ViewerToken>) -> AuthDecision {
        let Some(token) = token else {
            return AuthDecision::deny("Login required");
        };
        let Some((username, password)) = split_login(token) else {
            return AuthDecision::deny(INVALID_LOGIN);
        };
        let Some(user) = self.users.get(username) else {
            return AuthDecision::deny(INVALID_LOGIN);
        };
        if user.password != password {
            return AuthDecision::deny(INVALID_LOGIN);
        }

        if user.role == Role::Admin {
            return AuthDecision::allow();
        }

        match user.subscription_expiry {
            Some(expiry) if expiry.timestamp_millis() > self.clock.now_millis() => {
                AuthDecision::allow()
            }
            Some(_) => AuthDecision::deny("Subscription expired"),
            None => AuthDecision::deny("No active subscription"),
        }
    }
}

#[async_trait]
impl Authorizer for JsonUserStore {
    async fn is_authorized(&self, token: Option<ViewerToken>) -> AuthDecision {
        let decision = self.decide(token.as_ref());
        if let (false, Some(reason)) = (decision.allowed, decision.reason.as_deref()) {
            let username = token
                .as_ref()
                .and_then(split_login)
                .map(|(username, _)| username);
            tracing::debug!("Denied viewer {:?}: {}", username, reason);
        }
        decision
    }
}
