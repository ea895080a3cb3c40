//! Upstream `LiveConnector` implementations.
//!
//! - `websocket`: talks to an external live connector over WebSocket
//! - `simulated`: deterministic in-process feed

pub mod simulated;
pub mod websocket;

pub use simulated::{OFFLINE_ROOM, SimulatedLiveConnector};
pub use websocket::WebSocketLiveConnector;
