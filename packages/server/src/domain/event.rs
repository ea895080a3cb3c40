//! Relay events and the messages delivered to viewers.

use super::value_object::Timestamp;

/// Display identity of the user behind a social event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub nickname: String,
    pub avatar_url: Option<String>,
}

impl Author {
    /// Build an author, falling back to the platform unique id when the nickname is blank.
    pub fn new(nickname: &str, unique_id: &str, avatar_url: Option<String>) -> Self {
        let nickname = if nickname.trim().is_empty() {
            unique_id.trim()
        } else {
            nickname.trim()
        };
        let nickname = if nickname.is_empty() {
            "anonymous"
        } else {
            nickname
        };

        Self {
            nickname: nickname.to_string(),
            avatar_url: avatar_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Kind of relay event, used for logging and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Chat,
    Like,
    Join,
    Gift,
    Follow,
    Share,
    ViewerCount,
    SystemNotice,
}

/// One live-stream social event relayed to viewers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Chat {
        author: Author,
        text: String,
        timestamp: Timestamp,
    },
    Like {
        author: Author,
        like_count: u64,
        total_like_count: Option<u64>,
        timestamp: Timestamp,
    },
    Join {
        author: Author,
        timestamp: Timestamp,
    },
    Gift {
        author: Author,
        gift_name: String,
        repeat_count: u32,
        timestamp: Timestamp,
    },
    Follow {
        author: Author,
        timestamp: Timestamp,
    },
    Share {
        author: Author,
        timestamp: Timestamp,
    },
    /// Current audience size. A gauge: never stored in history.
    ViewerCount { count: u64 },
    SystemNotice { text: String },
}

impl RelayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Chat { .. } => EventKind::Chat,
            Self::Like { .. } => EventKind::Like,
            Self::Join { .. } => EventKind::Join,
            Self::Gift { .. } => EventKind::Gift,
            Self::Follow { .. } => EventKind::Follow,
            Self::Share { .. } => EventKind::Share,
            Self::ViewerCount { .. } => EventKind::ViewerCount,
            Self::SystemNotice { .. } => EventKind::SystemNotice,
        }
    }

    /// Gauge events describe current state rather than something that happened.
    pub fn is_gauge(&self) -> bool {
        matches!(self, Self::ViewerCount { .. })
    }

    pub fn author(&self) -> Option<&Author> {
        match self {
            Self::Chat { author, .. }
            | Self::Like { author, .. }
            | Self::Join { author, .. }
            | Self::Gift { author, .. }
            | Self::Follow { author, .. }
            | Self::Share { author, .. } => Some(author),
            Self::ViewerCount { .. } | Self::SystemNotice { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Chat { timestamp, .. }
            | Self::Like { timestamp, .. }
            | Self::Join { timestamp, .. }
            | Self::Gift { timestamp, .. }
            | Self::Follow { timestamp, .. }
            | Self::Share { timestamp, .. } => Some(*timestamp),
            Self::ViewerCount { .. } | Self::SystemNotice { .. } => None,
        }
    }

    pub(crate) fn timestamp_mut(&mut self) -> Option<&mut Timestamp> {
        match self {
            Self::Chat { timestamp, .. }
            | Self::Like { timestamp, .. }
            | Self::Join { timestamp, .. }
            | Self::Gift { timestamp, .. }
            | Self::Follow { timestamp, .. }
            | Self::Share { timestamp, .. } => Some(timestamp),
            Self::ViewerCount { .. } | Self::SystemNotice { .. } => None,
        }
    }
}

/// Connection state reported to viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Status notification sent to viewers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub state: ConnectionStatus,
    pub room_id: Option<String>,
    pub message: Option<String>,
}

impl StatusUpdate {
    pub fn connecting(message: impl Into<String>) -> Self {
        Self {
            state: ConnectionStatus::Connecting,
            room_id: None,
            message: Some(message.into()),
        }
    }

    pub fn connected(room_id: impl Into<String>) -> Self {
        Self {
            state: ConnectionStatus::Connected,
            room_id: Some(room_id.into()),
            message: None,
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self {
            state: ConnectionStatus::Disconnected,
            room_id: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: ConnectionStatus::Error,
            room_id: None,
            message: Some(message.into()),
        }
    }
}

/// Everything a viewer channel can receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerMessage {
    Status(StatusUpdate),
    /// Buffered events, oldest first, sent once when the viewer joins
    History(Vec<RelayEvent>),
    Event(RelayEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_falls_back_to_unique_id() {
        // テスト項目: nickname が空の場合 unique_id が表示名として使われる
        // given (前提条件):
        let nickname = "  ";
        let unique_id = "user_42";

        // when (操作):
        let author = Author::new(nickname, unique_id, Some(String::new()));

        // then (期待する結果):
        assert_eq!(author.nickname, "user_42");
        assert_eq!(author.avatar_url, None);
    }

    #[test]
    fn test_author_without_any_identity_is_anonymous() {
        // テスト項目: nickname も unique_id も空の場合は "anonymous" になる
        // given (前提条件):

        // when (操作):
        let author = Author::new("", "", None);

        // then (期待する結果):
        assert_eq!(author.nickname, "anonymous");
    }

    #[test]
    fn test_viewer_count_is_the_only_gauge() {
        // テスト項目: ViewerCount のみがゲージとして扱われる
        // given (前提条件):
        let author = Author::new("alice", "alice", None);
        let chat = RelayEvent::Chat {
            author: author.clone(),
            text: "hi".to_string(),
            timestamp: Timestamp::new(1),
        };
        let gauge = RelayEvent::ViewerCount { count: 10 };
        let notice = RelayEvent::SystemNotice {
            text: "welcome".to_string(),
        };

        // when (操作) / then (期待する結果):
        assert!(!chat.is_gauge());
        assert!(gauge.is_gauge());
        assert!(!notice.is_gauge());
        assert_eq!(chat.author(), Some(&author));
        assert_eq!(gauge.timestamp(), None);
    }
}
