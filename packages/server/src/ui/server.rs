//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::ConnectionSupervisor;

use super::{
    handler::{debug_history, get_session, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Live event relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(supervisor, 256);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectionSupervisor（上流セッション管理のユースケース）
    supervisor: Arc<ConnectionSupervisor>,
    /// 視聴者ごとの送信キューの容量
    viewer_queue: usize,
}

impl Server {
    pub fn new(supervisor: Arc<ConnectionSupervisor>, viewer_queue: usize) -> Self {
        Self {
            supervisor,
            viewer_queue,
        }
    }

    /// Build the router without binding a socket
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            supervisor: self.supervisor.clone(),
            viewer_queue: self.viewer_queue,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/session", get(get_session))
            .route("/debug/history", get(debug_history))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server until Ctrl+C / SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Live relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        // release the upstream connection even if serving failed
        self.supervisor.shutdown().await;
        result?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
