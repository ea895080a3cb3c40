//! Client execution logic with reconnection support.

use std::time::Duration;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use liverelay_server::infrastructure::dto::websocket::ClientMessage;

use super::{
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
    ui::PROMPT,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Read prompt lines on a blocking thread and forward them to the session.
///
/// The thread ends on Ctrl+C / Ctrl+D, which closes the channel.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Run the relay viewer with reconnection logic
///
/// # Arguments
///
/// * `url` - Relay WebSocket URL (e.g., "ws://127.0.0.1:8080/ws")
/// * `token` - Viewer identity presented to the relay's authorizer
/// * `room` - Room to request as soon as the first connection opens
pub async fn run_client(
    url: String,
    token: Option<String>,
    room: Option<String>,
) -> Result<(), ClientError> {
    let mut input_rx = spawn_input_thread();
    let mut pending = room.map(|room| ClientMessage::Connect {
        room,
        credential: None,
    });
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, token.as_deref(), &mut pending, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    tracing::error!("{}", e);
                    return Err(e);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
