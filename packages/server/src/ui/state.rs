//! Shared application state.

use std::sync::Arc;

use crate::usecase::ConnectionSupervisor;

pub struct AppState {
    /// ConnectionSupervisor（上流セッションと視聴者の管理）
    pub supervisor: Arc<ConnectionSupervisor>,
    /// 視聴者ごとの送信キューの容量
    pub viewer_queue: usize,
}
