//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn to_jst(timestamp_millis: i64) -> Option<DateTime<FixedOffset>> {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    jst.timestamp_millis_opt(timestamp_millis).single()
}

/// Convert Unix timestamp (milliseconds) to JST RFC 3339 format
///
/// Out-of-range timestamps are rendered as the raw millisecond value.
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> String {
    match to_jst(timestamp_millis) {
        Some(dt) => dt.to_rfc3339(),
        None => timestamp_millis.to_string(),
    }
}

/// Convert Unix timestamp (milliseconds) to a JST wall-clock time (`HH:MM:SS`)
pub fn timestamp_to_jst_clock(timestamp_millis: i64) -> String {
    match to_jst(timestamp_millis) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_non_zero_timestamp() {
        // テスト項目: SystemClock が 0 以外のタイムスタンプを返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let timestamp = clock.now_millis();

        // then (期待する結果):
        assert!(timestamp > 0);
    }

    #[test]
    fn test_fixed_clock_returns_consistent_timestamp() {
        // テスト項目: FixedClock が複数回呼び出しても同じタイムスタンプを返す
        // given (前提条件):
        let fixed_time = 9876543210987;
        let clock = FixedClock::new(fixed_time);

        // when (操作):
        let first = clock.now_millis();
        let second = clock.now_millis();

        // then (期待する結果):
        assert_eq!(first, fixed_time);
        assert_eq!(second, fixed_time);
    }

    #[test]
    fn test_timestamp_to_jst_rfc3339_format() {
        // テスト項目: タイムスタンプが JST の RFC 3339 形式に変換される
        // given (前提条件):
        // 2023-01-01 00:00:00 JST
        let timestamp = 1672498800000;

        // when (操作):
        let result = timestamp_to_jst_rfc3339(timestamp);

        // then (期待する結果):
        assert!(result.starts_with("2023-01-01T00:00:00"));
        assert!(result.ends_with("+09:00"));
    }

    #[test]
    fn test_timestamp_to_jst_clock_format() {
        // テスト項目: タイムスタンプが JST の時刻表記 (HH:MM:SS) に変換される
        // given (前提条件):
        // 2023-01-01 12:34:56 JST
        let timestamp = 1672498800000 + (12 * 3600 + 34 * 60 + 56) * 1000;

        // when (操作):
        let result = timestamp_to_jst_clock(timestamp);

        // then (期待する結果):
        assert_eq!(result, "12:34:56");
    }

    #[test]
    fn test_out_of_range_timestamp_does_not_panic() {
        // テスト項目: 範囲外のタイムスタンプでもパニックしない
        // given (前提条件):
        let timestamp = i64::MAX;

        // when (操作):
        let rfc = timestamp_to_jst_rfc3339(timestamp);
        let clock = timestamp_to_jst_clock(timestamp);

        // then (期待する結果):
        assert_eq!(rfc, i64::MAX.to_string());
        assert_eq!(clock, "--:--:--");
    }
}
