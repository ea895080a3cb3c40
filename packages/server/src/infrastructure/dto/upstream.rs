//! Frames exchanged with the upstream live connector.
//!
//! Field names follow the connector (`uniqueId`, `profilePictureUrl`, `likeCount`, ...).
//! Frames of unknown type deserialize to `UpstreamFrame::Unknown` and are skipped.

use serde::{Deserialize, Serialize};

use crate::domain::{Author, RelayEvent, Timestamp, UpstreamSignal};

/// Relay → connector request opening a room subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UpstreamRequest {
    Subscribe {
        room: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        poll_interval_ms: u64,
    },
}

/// User fields shared by every social frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamUser {
    #[serde(default)]
    pub unique_id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl UpstreamUser {
    fn into_author(self) -> Author {
        Author::new(&self.nickname, &self.unique_id, self.profile_picture_url)
    }
}

/// Room id as sent by the connector: either a string or a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomIdValue {
    Text(String),
    Number(u64),
}

impl std::fmt::Display for RoomIdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{}", number),
        }
    }
}

fn default_repeat_count() -> u32 {
    1
}

/// Connector → relay frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UpstreamFrame {
    /// Handshake success
    RoomInfo { room_id: RoomIdValue },
    Chat {
        #[serde(flatten)]
        user: UpstreamUser,
        #[serde(default)]
        comment: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Like {
        #[serde(flatten)]
        user: UpstreamUser,
        #[serde(default)]
        like_count: u64,
        #[serde(default)]
        total_like_count: Option<u64>,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    #[serde(alias = "join")]
    Member {
        #[serde(flatten)]
        user: UpstreamUser,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Gift {
        #[serde(flatten)]
        user: UpstreamUser,
        #[serde(default)]
        gift_name: String,
        #[serde(default = "default_repeat_count")]
        repeat_count: u32,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Follow {
        #[serde(flatten)]
        user: UpstreamUser,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Share {
        #[serde(flatten)]
        user: UpstreamUser,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    RoomUser { viewer_count: u64 },
    Notice { text: String },
    StreamEnd,
    Disconnected,
    /// Handshake failure, or a transient error once live
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl UpstreamFrame {
    /// Convert a frame received while live. `received_at` stamps frames without a
    /// timestamp. Returns `None` for frames that carry nothing to relay.
    pub fn into_signal(self, received_at: Timestamp) -> Option<UpstreamSignal> {
        let stamp = |timestamp: Option<i64>| timestamp.map(Timestamp::new).unwrap_or(received_at);

        let event = match self {
            Self::Chat {
                user,
                comment,
                timestamp,
            } => RelayEvent::Chat {
                author: user.into_author(),
                text: comment,
                timestamp: stamp(timestamp),
            },
            Self::Like {
                user,
                like_count,
                total_like_count,
                timestamp,
            } => RelayEvent::Like {
                author: user.into_author(),
                like_count,
                total_like_count,
                timestamp: stamp(timestamp),
            },
            Self::Member { user, timestamp } => RelayEvent::Join {
                author: user.into_author(),
                timestamp: stamp(timestamp),
            },
            Self::Gift {
                user,
                gift_name,
                repeat_count,
                timestamp,
            } => RelayEvent::Gift {
                author: user.into_author(),
                gift_name,
                repeat_count: repeat_count.max(1),
                timestamp: stamp(timestamp),
            },
            Self::Follow { user, timestamp } => RelayEvent::Follow {
                author: user.into_author(),
                timestamp: stamp(timestamp),
            },
            Self::Share { user, timestamp } => RelayEvent::Share {
                author: user.into_author(),
                timestamp: stamp(timestamp),
            },
            Self::RoomUser { viewer_count } => RelayEvent::ViewerCount {
                count: viewer_count,
            },
            Self::Notice { text } => RelayEvent::SystemNotice { text },
            Self::StreamEnd => return Some(UpstreamSignal::StreamEnd),
            Self::Disconnected => return Some(UpstreamSignal::Disconnected),
            Self::Error { message } => return Some(UpstreamSignal::Error(message)),
            Self::RoomInfo { .. } | Self::Unknown => return None,
        };

        Some(UpstreamSignal::Event(event))
    }
}
