//! Infrastructure layer: concrete adapters behind the domain capabilities.

pub mod auth;
pub mod dto;
pub mod live_source;
pub mod registry;
