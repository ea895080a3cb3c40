//! In-process `LiveConnector` producing a deterministic synthetic feed.
//!
//! Used for local development (`--upstream simulated`) and integration tests.
//! The room `offline` always fails the handshake.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Author, ConnectError, ConnectOptions, LiveConnection, LiveConnector, LiveSource, RelayEvent,
    RoomInfo, RoomTarget, Timestamp, UpstreamSignal,
};
use liverelay_shared::time::{Clock, SystemClock};

/// Room name whose handshake always fails
pub const OFFLINE_ROOM: &str = "offline";

const AUDIENCE: [&str; 4] = ["sakura", "kenji", "mika", "taro"];

pub struct SimulatedLiveConnector {
    clock: Arc<dyn Clock>,
    /// 指定した件数のイベントの後に streamEnd を送る (None なら無限)
    stream_length: Option<usize>,
}

impl SimulatedLiveConnector {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            stream_length: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// End every stream after `events` signals
    pub fn with_stream_length(mut self, events: usize) -> Self {
        self.stream_length = Some(events);
        self
    }
}

impl Default for SimulatedLiveConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiveConnector for SimulatedLiveConnector {
    async fn connect(
        &self,
        room: &RoomTarget,
        options: &ConnectOptions,
    ) -> Result<LiveConnection, ConnectError> {
        if room.as_str().eq_ignore_ascii_case(OFFLINE_ROOM) {
            return Err(ConnectError::new(format!("{} is not live", room)));
        }

        tracing::info!(
            "Simulating live room {} every {:?}",
            room,
            options.poll_interval
        );

        Ok(LiveConnection {
            room_info: RoomInfo {
                room_id: format!("sim-{}", room.as_str()),
            },
            source: Box::new(SimulatedLiveSource {
                clock: self.clock.clone(),
                interval: options.poll_interval,
                remaining: self.stream_length,
                sequence: 0,
                open: true,
            }),
        })
    }
}

pub struct SimulatedLiveSource {
    clock: Arc<dyn Clock>,
    interval: std::time::Duration,
    remaining: Option<usize>,
    sequence: u64,
    open: bool,
}

impl SimulatedLiveSource {
    /// Event number `sequence` of the synthetic cycle
    fn event_at(&self, sequence: u64, now: Timestamp) -> RelayEvent {
        let name = AUDIENCE[(sequence as usize) % AUDIENCE.len()];
        let author = Author::new(name, name, None);

        match sequence % 7 {
            0 => RelayEvent::Join {
                author,
                timestamp: now,
            },
            1 => RelayEvent::Chat {
                author,
                text: format!("hello #{}", sequence),
                timestamp: now,
            },
            2 => RelayEvent::Like {
                author,
                like_count: 1 + sequence % 5,
                total_like_count: Some(sequence * 3),
                timestamp: now,
            },
            3 => RelayEvent::ViewerCount {
                count: 100 + sequence,
            },
            4 => RelayEvent::Gift {
                author,
                gift_name: "Rose".to_string(),
                repeat_count: 1 + (sequence % 3) as u32,
                timestamp: now,
            },
            5 => RelayEvent::Follow {
                author,
                timestamp: now,
            },
            _ => RelayEvent::Share {
                author,
                timestamp: now,
            },
        }
    }
}

#[async_trait]
impl LiveSource for SimulatedLiveSource {
    async fn next_signal(&mut self) -> Option<UpstreamSignal> {
        if !self.open {
            return None;
        }

        if self.remaining == Some(0) {
            self.open = false;
            return Some(UpstreamSignal::StreamEnd);
        }

        tokio::time::sleep(self.interval).await;

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        let now = Timestamp::new(self.clock.now_millis());
        let event = self.event_at(self.sequence, now);
        self.sequence += 1;
        Some(UpstreamSignal::Event(event))
    }

    async fn disconnect(&mut self) {
        self.open = false;
    }
}
