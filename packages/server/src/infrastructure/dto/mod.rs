//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: viewer-facing WebSocket message DTOs
//! - `http`: HTTP API response DTOs
//! - `upstream`: frames exchanged with the upstream live connector

pub mod conversion;
pub mod http;
pub mod upstream;
pub mod websocket;
