//! Domain layer: relay events, the replay buffer, and the capabilities the relay
//! depends on (upstream connector, authorization, viewer registry).

pub mod authorizer;
pub mod error;
pub mod event;
pub mod event_buffer;
pub mod live_source;
pub mod registry;
pub mod value_object;

pub use authorizer::{AuthDecision, Authorizer};
#[cfg(test)]
pub use authorizer::MockAuthorizer;
pub use error::{ConnectError, PushError, ValueObjectError};
pub use event::{Author, ConnectionStatus, EventKind, RelayEvent, StatusUpdate, ViewerMessage};
pub use event_buffer::{DEFAULT_HISTORY_CAPACITY, EventBuffer};
pub use live_source::{
    ConnectOptions, LiveConnection, LiveConnector, LiveSource, RoomInfo, UpstreamSignal,
};
pub use registry::{SubscriberRegistry, Viewer, ViewerChannel};
pub use value_object::{Credential, RoomTarget, Timestamp, ViewerId, ViewerToken};
