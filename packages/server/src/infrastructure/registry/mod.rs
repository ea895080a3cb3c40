//! Subscriber registry implementations.
//!
//! - `channel`: in-process registry over bounded mpsc queues

pub mod channel;

pub use channel::ChannelSubscriberRegistry;
