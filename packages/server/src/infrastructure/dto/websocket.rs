//! Viewer-facing WebSocket message DTOs.
//!
//! Every message is a JSON object discriminated by its `"type"` field; field names are
//! camelCase.

use serde::{Deserialize, Serialize};

/// Connection state carried by a `status` message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// One relayed live-stream event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RelayEventDto {
    Chat {
        nickname: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        text: String,
        timestamp: i64,
    },
    Like {
        nickname: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        like_count: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_like_count: Option<u64>,
        timestamp: i64,
    },
    Join {
        nickname: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        timestamp: i64,
    },
    Gift {
        nickname: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        gift_name: String,
        repeat_count: u32,
        timestamp: i64,
    },
    Follow {
        nickname: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        timestamp: i64,
    },
    Share {
        nickname: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        timestamp: i64,
    },
    ViewerCount {
        count: u64,
    },
    SystemNotice {
        text: String,
    },
}

/// Server → viewer message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Status {
        state: StatusState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Buffered events, oldest first
    History { events: Vec<RelayEventDto> },
    /// A live event, serialized as the event object itself
    #[serde(untagged)]
    Event(RelayEventDto),
}

/// Viewer → server message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Switch the relay to `room`
    Connect {
        room: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        credential: Option<String>,
    },
    /// Stop the active upstream session
    Disconnect,
}
