//! Message formatting utilities for client display.

use liverelay_server::infrastructure::dto::websocket::{RelayEventDto, ServerMessage, StatusState};
use liverelay_shared::time::{timestamp_to_jst_clock, timestamp_to_jst_rfc3339};

const HEAVY_RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any message received from the relay
    pub fn format_server_message(message: &ServerMessage) -> String {
        match message {
            ServerMessage::Status {
                state,
                room_id,
                message,
            } => Self::format_status(*state, room_id.as_deref(), message.as_deref()),
            ServerMessage::History { events } => Self::format_history(events),
            ServerMessage::Event(event) => format!("\n{}\n", Self::format_event(event)),
        }
    }

    /// Format a connection status change
    ///
    /// # Arguments
    ///
    /// * `state` - The relay's connection state
    /// * `room_id` - Upstream room id, present once connected
    /// * `message` - Human-readable detail
    ///
    /// # Returns
    ///
    /// A one-line status notice
    pub fn format_status(state: StatusState, room_id: Option<&str>, message: Option<&str>) -> String {
        let label = match state {
            StatusState::Connecting => "connecting",
            StatusState::Connected => "connected",
            StatusState::Disconnected => "disconnected",
            StatusState::Error => "error",
        };

        let mut line = format!("\n[status] {}", label);
        if let Some(room_id) = room_id {
            line.push_str(&format!(" (room {})", room_id));
        }
        if let Some(message) = message {
            line.push_str(&format!(": {}", message));
        }
        line.push('\n');
        line
    }

    /// Format the replay buffer delivered on connect
    ///
    /// # Arguments
    ///
    /// * `events` - Buffered events, oldest first
    ///
    /// # Returns
    ///
    /// A framed block with one line per event
    pub fn format_history(events: &[RelayEventDto]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", HEAVY_RULE));

        if events.is_empty() {
            output.push_str("History: (no recent events)\n");
        } else {
            let since = events
                .iter()
                .find_map(event_timestamp)
                .map(timestamp_to_jst_rfc3339);
            match since {
                Some(since) => output.push_str(&format!(
                    "History: {} events since {}\n",
                    events.len(),
                    since
                )),
                None => output.push_str(&format!("History: {} events\n", events.len())),
            }
            for event in events {
                output.push_str(&Self::format_event(event));
                output.push('\n');
            }
        }

        output.push_str(HEAVY_RULE);
        output.push('\n');
        output
    }

    /// Format one relayed event as a single line
    pub fn format_event(event: &RelayEventDto) -> String {
        let clock = event_timestamp(event)
            .map(timestamp_to_jst_clock)
            .unwrap_or_else(|| "--:--:--".to_string());

        match event {
            RelayEventDto::Chat { nickname, text, .. } => {
                format!("[{}] {}: {}", clock, nickname, text)
            }
            RelayEventDto::Like {
                nickname,
                like_count,
                total_like_count,
                ..
            } => match total_like_count {
                Some(total) => format!(
                    "[{}] {} liked x{} (total {})",
                    clock, nickname, like_count, total
                ),
                None => format!("[{}] {} liked x{}", clock, nickname, like_count),
            },
            RelayEventDto::Join { nickname, .. } => format!("[{}] + {} joined", clock, nickname),
            RelayEventDto::Gift {
                nickname,
                gift_name,
                repeat_count,
                ..
            } => format!(
                "[{}] {} sent {} x{}",
                clock, nickname, gift_name, repeat_count
            ),
            RelayEventDto::Follow { nickname, .. } => {
                format!("[{}] {} followed", clock, nickname)
            }
            RelayEventDto::Share { nickname, .. } => {
                format!("[{}] {} shared the stream", clock, nickname)
            }
            RelayEventDto::ViewerCount { count } => format!("[{}] viewers: {}", clock, count),
            RelayEventDto::SystemNotice { text } => format!("[{}] * {}", clock, text),
        }
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

fn event_timestamp(event: &RelayEventDto) -> Option<i64> {
    match event {
        RelayEventDto::Chat { timestamp, .. }
        | RelayEventDto::Like { timestamp, .. }
        | RelayEventDto::Join { timestamp, .. }
        | RelayEventDto::Gift { timestamp, .. }
        | RelayEventDto::Follow { timestamp, .. }
        | RelayEventDto::Share { timestamp, .. } => Some(*timestamp),
        RelayEventDto::ViewerCount { .. } | RelayEventDto::SystemNotice { .. } => None,
    }
}
