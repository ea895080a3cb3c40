//! UseCase layer: the relay session lifecycle and the supervisor that serializes
//! viewer requests against it.

pub mod connection_supervisor;
pub mod error;
pub mod relay_session;

#[cfg(test)]
pub(crate) mod testing;

pub use connection_supervisor::{ConnectionSupervisor, SessionSettings, SessionSummary};
pub use error::ConnectRequestError;
pub use relay_session::{ReconnectPolicy, RelaySession, SessionHandle, SessionState};
