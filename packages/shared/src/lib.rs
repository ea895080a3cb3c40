//! Utilities shared by the liverelay server and client binaries.

pub mod logger;
pub mod time;
