//! Live-stream event relay server.
//!
//! One upstream live room per process, fanned out to any number of websocket viewers,
//! with a bounded replay buffer for viewers that join late.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
