//! WebSocket client session management.

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use liverelay_server::infrastructure::dto::websocket::{ClientMessage, ServerMessage};

use crate::{
    command::{Command, HELP},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Build the relay URL, passing the viewer token as a query parameter
pub fn session_url(url: &str, token: Option<&str>) -> String {
    match token {
        Some(token) => format!("{}?token={}", url, encode_query_value(token)),
        None => url.to_string(),
    }
}

/// Percent-encode everything but RFC 3986 unreserved characters
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Run one WebSocket session against the relay
///
/// `pending` is sent as soon as the socket opens and is consumed once delivered.
/// Returns `Ok` when the user quits or input ends, and an error when the connection
/// could not be opened or was lost.
pub async fn run_client_session(
    url: &str,
    token: Option<&str>,
    pending: &mut Option<ClientMessage>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let url = session_url(url, token);

    let (ws_stream, _response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(tungstenite::Error::Http(response)) => {
            return Err(ClientError::HandshakeRejected(response.status().as_u16()));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to relay server!");
    println!("\nType /connect <room> to start relaying, /help for commands.\n");

    let (mut write, mut read) = ws_stream.split();

    if let Some(message) = pending.as_ref() {
        send_message(&mut write, message).await?;
        pending.take();
    }

    loop {
        tokio::select! {
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let formatted = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(message) => MessageFormatter::format_server_message(&message),
                            Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                        };
                        print!("{}", formatted);
                        redisplay_prompt();
                    }
                    Some(Ok(Message::Binary(data))) => {
                        print!("{}", MessageFormatter::format_binary_message(data.len()));
                        redisplay_prompt();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Server closed the connection");
                        return Err(ClientError::ConnectionError("Connection lost".to_string()));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        return Err(ClientError::ConnectionError(e.to_string()));
                    }
                }
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // readline ended (Ctrl+C / Ctrl+D)
                    write.send(Message::Close(None)).await.ok();
                    return Ok(());
                };

                let command = Command::parse(&line);
                match &command {
                    Command::Quit => {
                        write.send(Message::Close(None)).await.ok();
                        return Ok(());
                    }
                    Command::Help => print!("{}", HELP),
                    Command::Invalid(hint) => println!("{}", hint),
                    Command::Connect { .. } | Command::Disconnect => {}
                }

                if let Some(message) = command.to_client_message() {
                    send_message(&mut write, &message).await?;
                }
                redisplay_prompt();
            }
        }
    }
}

async fn send_message<S>(write: &mut S, message: &ClientMessage) -> Result<(), ClientError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(message)
        .map_err(|e| ClientError::ConnectionError(format!("Failed to serialize message: {}", e)))?;

    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send message: {}", e);
        ClientError::ConnectionError(e.to_string())
    })
}
