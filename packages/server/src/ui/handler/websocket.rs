//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{StatusUpdate, Viewer, ViewerChannel, ViewerMessage, ViewerToken},
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    ui::state::AppState,
    usecase::ConnectionSupervisor,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    // blank tokens count as anonymous; authorization happens on connect requests
    let token = query
        .token
        .and_then(|token| ViewerToken::try_from(token).ok());

    ws.on_upgrade(move |socket| handle_socket(socket, state, token))
}

/// Spawns a task that drains the viewer's queue into the WebSocket sender.
///
/// Ends when the queue is closed or the socket refuses a write.
fn pusher_loop(
    mut rx: mpsc::Receiver<ViewerMessage>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            // Domain Model から DTO への変換
            let dto = ServerMessage::from(message);
            let json = match serde_json::to_string(&dto) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize viewer message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, token: Option<ViewerToken>) {
    let (channel, rx) = ViewerChannel::bounded(state.viewer_queue);
    let viewer = Viewer::new(token, channel);
    let viewer_id = viewer.id;
    tracing::info!("Viewer '{}' connected", viewer_id);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    // history is delivered right away, possibly empty
    state.supervisor.on_viewer_channel_open(viewer.clone()).await;

    let supervisor = state.supervisor.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error from viewer '{}': {}", viewer.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_message(&supervisor, &viewer, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Viewer '{}' requested close", viewer.id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.supervisor.on_viewer_channel_close(&viewer_id).await;
    tracing::info!("Viewer '{}' disconnected", viewer_id);
}

async fn handle_client_message(supervisor: &ConnectionSupervisor, viewer: &Viewer, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Invalid message from viewer '{}': {}", viewer.id, e);
            reply(viewer, StatusUpdate::error(format!("Invalid message: {}", e)));
            return;
        }
    };

    match message {
        ClientMessage::Connect { room, credential } => {
            tracing::debug!("Viewer '{}' requested room '{}'", viewer.id, room);
            if let Err(e) = supervisor.request_connect(viewer, &room, credential).await {
                tracing::info!("Connect request from viewer '{}' refused: {}", viewer.id, e);
            }
        }
        ClientMessage::Disconnect => {
            if !supervisor.request_disconnect().await {
                reply(viewer, StatusUpdate::disconnected("No active session"));
            }
        }
    }
}

/// Send a status to this viewer only
fn reply(viewer: &Viewer, status: StatusUpdate) {
    if let Err(e) = viewer.channel.push(ViewerMessage::Status(status)) {
        tracing::debug!("Could not reply to viewer '{}': {}", viewer.id, e);
    }
}
