//! Terminal viewer for the liverelay server.
//!
//! Prints relayed live events and sends `/connect` and `/disconnect` requests typed at
//! the prompt.

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::run_client;
