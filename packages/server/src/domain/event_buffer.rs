//! Bounded replay buffer of recent relay events.

use std::collections::VecDeque;

use super::{event::RelayEvent, value_object::Timestamp};

/// Default number of events kept for late-joining viewers
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// FIFO buffer of the most recent relay events
///
/// Invariants:
/// - `len() <= capacity()` at all times; appending at capacity evicts the oldest entry.
/// - Stored timestamps never decrease in insertion order. An event stamped earlier than
///   the newest stored event is clamped up to that timestamp.
/// - Gauge events (`ViewerCount`) are never stored.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: VecDeque<RelayEvent>,
    capacity: usize,
    last_timestamp: Option<Timestamp>,
}

impl EventBuffer {
    /// Create an empty buffer. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            last_timestamp: None,
        }
    }

    /// Append an event, evicting the oldest one when full.
    ///
    /// Returns the event as stored (timestamp possibly clamped), or `None` for gauges.
    pub fn append(&mut self, mut event: RelayEvent) -> Option<&RelayEvent> {
        if event.is_gauge() {
            return None;
        }

        if let Some(timestamp) = event.timestamp_mut() {
            if let Some(last) = self.last_timestamp
                && *timestamp < last
            {
                *timestamp = last;
            }
            self.last_timestamp = Some(*timestamp);
        }

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self.events.back()
    }

    /// Owned copy of the buffered events, oldest first
    pub fn snapshot(&self) -> Vec<RelayEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.last_timestamp = None;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Author;

    fn chat(text: &str, at: i64) -> RelayEvent {
        RelayEvent::Chat {
            author: Author::new("alice", "alice", None),
            text: text.to_string(),
            timestamp: Timestamp::new(at),
        }
    }

    fn texts(events: &[RelayEvent]) -> Vec<String> {
        events
            .iter()
            .map(|e| match e {
                RelayEvent::Chat { text, .. } => text.clone(),
                other => format!("{:?}", other.kind()),
            })
            .collect()
    }

    #[test]
    fn test_snapshot_keeps_last_capacity_events_in_order() {
        // テスト項目: 容量を超えて追加すると直近 C 件が到着順で残る
        // given (前提条件):
        let capacity = 3;
        let mut buffer = EventBuffer::new(capacity);

        // when (操作):
        for i in 0..7 {
            buffer.append(chat(&format!("m{}", i), i));
        }

        // then (期待する結果):
        assert_eq!(buffer.len(), capacity);
        assert_eq!(texts(&buffer.snapshot()), vec!["m4", "m5", "m6"]);
    }

    #[test]
    fn test_snapshot_below_capacity_returns_everything() {
        // テスト項目: 容量未満なら追加したすべてのイベントが返る
        // given (前提条件):
        let mut buffer = EventBuffer::new(10);

        // when (操作):
        buffer.append(chat("a", 1));
        buffer.append(chat("b", 2));

        // then (期待する結果):
        assert_eq!(texts(&buffer.snapshot()), vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_appends() {
        // テスト項目: 取得済みのスナップショットは後続の追加の影響を受けない
        // given (前提条件):
        let mut buffer = EventBuffer::new(2);
        buffer.append(chat("a", 1));
        let snapshot = buffer.snapshot();

        // when (操作):
        buffer.append(chat("b", 2));
        buffer.append(chat("c", 3));

        // then (期待する結果):
        assert_eq!(texts(&snapshot), vec!["a"]);
    }

    #[test]
    fn test_gauge_events_are_not_stored() {
        // テスト項目: ViewerCount は履歴に保存されない
        // given (前提条件):
        let mut buffer = EventBuffer::new(5);

        // when (操作):
        let stored = buffer.append(RelayEvent::ViewerCount { count: 12 }).is_some();

        // then (期待する結果):
        assert!(!stored);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_timestamps_never_decrease() {
        // テスト項目: 過去のタイムスタンプは直前のタイムスタンプに引き上げられる
        // given (前提条件):
        let mut buffer = EventBuffer::new(5);
        buffer.append(chat("late", 2_000));

        // when (操作):
        buffer.append(chat("skewed", 1_500));

        // then (期待する結果):
        let stamps: Vec<i64> = buffer
            .snapshot()
            .iter()
            .filter_map(|e| e.timestamp().map(|t| t.value()))
            .collect();
        assert_eq!(stamps, vec![2_000, 2_000]);
    }

    #[test]
    fn test_clear_empties_the_buffer() {
        // テスト項目: clear で空になり、タイムスタンプの基準もリセットされる
        // given (前提条件):
        let mut buffer = EventBuffer::new(5);
        buffer.append(chat("a", 5_000));

        // when (操作):
        buffer.clear();
        buffer.append(chat("b", 1_000));

        // then (期待する結果):
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.snapshot()[0].timestamp(), Some(Timestamp::new(1_000)));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        // テスト項目: 容量 0 を指定しても 1 件は保持される
        // given (前提条件):
        let mut buffer = EventBuffer::new(0);

        // when (操作):
        buffer.append(chat("a", 1));
        buffer.append(chat("b", 2));

        // then (期待する結果):
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(texts(&buffer.snapshot()), vec!["b"]);
    }
}
