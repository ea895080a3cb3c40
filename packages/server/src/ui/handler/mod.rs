//! Request handlers.

pub mod http;
pub mod websocket;

pub use http::{debug_history, get_session, health_check};
pub use websocket::websocket_handler;
