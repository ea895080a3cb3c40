//! Conversion logic between DTOs and domain entities.

use crate::domain::{Author, ConnectionStatus, RelayEvent, StatusUpdate, Timestamp, ViewerMessage};
use crate::infrastructure::dto::{
    http::SessionSummaryDto,
    websocket::{RelayEventDto, ServerMessage, StatusState},
};
use crate::usecase::SessionSummary;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ConnectionStatus> for StatusState {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connecting => Self::Connecting,
            ConnectionStatus::Connected => Self::Connected,
            ConnectionStatus::Disconnected => Self::Disconnected,
            ConnectionStatus::Error => Self::Error,
        }
    }
}

impl From<RelayEvent> for RelayEventDto {
    fn from(model: RelayEvent) -> Self {
        match model {
            RelayEvent::Chat {
                author,
                text,
                timestamp,
            } => Self::Chat {
                nickname: author.nickname,
                avatar_url: author.avatar_url,
                text,
                timestamp: timestamp.value(),
            },
            RelayEvent::Like {
                author,
                like_count,
                total_like_count,
                timestamp,
            } => Self::Like {
                nickname: author.nickname,
                avatar_url: author.avatar_url,
                like_count,
                total_like_count,
                timestamp: timestamp.value(),
            },
            RelayEvent::Join { author, timestamp } => Self::Join {
                nickname: author.nickname,
                avatar_url: author.avatar_url,
                timestamp: timestamp.value(),
            },
            RelayEvent::Gift {
                author,
                gift_name,
                repeat_count,
                timestamp,
            } => Self::Gift {
                nickname: author.nickname,
                avatar_url: author.avatar_url,
                gift_name,
                repeat_count,
                timestamp: timestamp.value(),
            },
            RelayEvent::Follow { author, timestamp } => Self::Follow {
                nickname: author.nickname,
                avatar_url: author.avatar_url,
                timestamp: timestamp.value(),
            },
            RelayEvent::Share { author, timestamp } => Self::Share {
                nickname: author.nickname,
                avatar_url: author.avatar_url,
                timestamp: timestamp.value(),
            },
            RelayEvent::ViewerCount { count } => Self::ViewerCount { count },
            RelayEvent::SystemNotice { text } => Self::SystemNotice { text },
        }
    }
}

impl From<StatusUpdate> for ServerMessage {
    fn from(model: StatusUpdate) -> Self {
        Self::Status {
            state: model.state.into(),
            room_id: model.room_id,
            message: model.message,
        }
    }
}

impl From<ViewerMessage> for ServerMessage {
    fn from(model: ViewerMessage) -> Self {
        match model {
            ViewerMessage::Status(status) => status.into(),
            ViewerMessage::History(events) => Self::History {
                events: events.into_iter().map(RelayEventDto::from).collect(),
            },
            ViewerMessage::Event(event) => Self::Event(event.into()),
        }
    }
}

impl From<SessionSummary> for SessionSummaryDto {
    fn from(model: SessionSummary) -> Self {
        Self {
            room: model.room,
            state: model.state.as_str().to_string(),
            viewers: model.viewers,
            buffered_events: model.buffered_events,
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================

impl From<StatusState> for ConnectionStatus {
    fn from(dto: StatusState) -> Self {
        match dto {
            StatusState::Connecting => Self::Connecting,
            StatusState::Connected => Self::Connected,
            StatusState::Disconnected => Self::Disconnected,
            StatusState::Error => Self::Error,
        }
    }
}

impl From<RelayEventDto> for RelayEvent {
    fn from(dto: RelayEventDto) -> Self {
        let author = |nickname: String, avatar_url: Option<String>| Author {
            nickname,
            avatar_url,
        };

        match dto {
            RelayEventDto::Chat {
                nickname,
                avatar_url,
                text,
                timestamp,
            } => Self::Chat {
                author: author(nickname, avatar_url),
                text,
                timestamp: Timestamp::new(timestamp),
            },
            RelayEventDto::Like {
                nickname,
                avatar_url,
                like_count,
                total_like_count,
                timestamp,
            } => Self::Like {
                author: author(nickname, avatar_url),
                like_count,
                total_like_count,
                timestamp: Timestamp::new(timestamp),
            },
            RelayEventDto::Join {
                nickname,
                avatar_url,
                timestamp,
            } => Self::Join {
                author: author(nickname, avatar_url),
                timestamp: Timestamp::new(timestamp),
            },
            RelayEventDto::Gift {
                nickname,
                avatar_url,
                gift_name,
                repeat_count,
                timestamp,
            } => Self::Gift {
                author: author(nickname, avatar_url),
                gift_name,
                repeat_count,
                timestamp: Timestamp::new(timestamp),
            },
            RelayEventDto::Follow {
                nickname,
                avatar_url,
                timestamp,
            } => Self::Follow {
                author: author(nickname, avatar_url),
                timestamp: Timestamp::new(timestamp),
            },
            RelayEventDto::Share {
                nickname,
                avatar_url,
                timestamp,
            } => Self::Share {
                author: author(nickname, avatar_url),
                timestamp: Timestamp::new(timestamp),
            },
            RelayEventDto::ViewerCount { count } => Self::ViewerCount { count },
            RelayEventDto::SystemNotice { text } => Self::SystemNotice { text },
        }
    }
}

impl From<ServerMessage> for ViewerMessage {
    fn from(dto: ServerMessage) -> Self {
        match dto {
            ServerMessage::Status {
                state,
                room_id,
                message,
            } => Self::Status(StatusUpdate {
                state: state.into(),
                room_id,
                message,
            }),
            ServerMessage::History { events } => {
                Self::History(events.into_iter().map(RelayEvent::from).collect())
            }
            ServerMessage::Event(event) => Self::Event(event.into()),
        }
    }
}
