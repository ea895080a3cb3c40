//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::RelayEventDto;

/// `GET /api/session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub state: String,
    pub viewers: usize,
    pub buffered_events: usize,
}

/// `GET /debug/history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDto {
    pub events: Vec<RelayEventDto>,
    /// 最も古いイベントの時刻 (JST, RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest: Option<String>,
    /// 最も新しいイベントの時刻 (JST, RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest: Option<String>,
}
