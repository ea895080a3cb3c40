//! `LiveConnector` speaking to an upstream connector over WebSocket.
//!
//! Handshake: open the socket, send a `subscribe` frame, then wait for `roomInfo`
//! (success) or `error` (failure) within the handshake timeout. Afterwards every text
//! frame is one upstream signal.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::{
    domain::{
        ConnectError, ConnectOptions, LiveConnection, LiveConnector, LiveSource, RoomInfo,
        RoomTarget, Timestamp, UpstreamSignal,
    },
    infrastructure::dto::upstream::{UpstreamFrame, UpstreamRequest},
};
use liverelay_shared::time::{Clock, SystemClock};

type UpstreamStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WebSocketLiveConnector {
    /// 上流コネクタの WebSocket URL
    endpoint: String,
    /// タイムスタンプのないフレームに付与する時刻
    clock: Arc<dyn Clock>,
}

impl WebSocketLiveConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_clock(endpoint, Arc::new(SystemClock))
    }

    pub fn with_clock(endpoint: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            endpoint: endpoint.into(),
            clock,
        }
    }

    async fn handshake(
        &self,
        room: &RoomTarget,
        options: &ConnectOptions,
    ) -> Result<(UpstreamStream, RoomInfo), ConnectError> {
        let (mut stream, _response) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|e| ConnectError::new(format!("Failed to reach upstream connector: {}", e)))?;

        let request = UpstreamRequest::Subscribe {
            room: room.as_str().to_string(),
            session_id: options
                .credential
                .as_ref()
                .map(|credential| credential.expose().to_string()),
            poll_interval_ms: u64::try_from(options.poll_interval.as_millis()).unwrap_or(u64::MAX),
        };
        let payload = serde_json::to_string(&request)
            .map_err(|e| ConnectError::new(format!("Failed to encode subscribe request: {}", e)))?;
        stream
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| ConnectError::new(format!("Failed to send subscribe request: {}", e)))?;

        while let Some(message) = stream.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => return Err(ConnectError::new(format!("Upstream handshake failed: {}", e))),
            };

            match serde_json::from_str::<UpstreamFrame>(&text) {
                Ok(UpstreamFrame::RoomInfo { room_id }) => {
                    let room_info = RoomInfo {
                        room_id: room_id.to_string(),
                    };
                    return Ok((stream, room_info));
                }
                Ok(UpstreamFrame::Error { message }) => return Err(ConnectError::new(message)),
                Ok(frame) => {
                    tracing::debug!("Ignoring {:?} received before roomInfo", frame);
                }
                Err(e) => {
                    return Err(ConnectError::new(format!(
                        "Malformed handshake reply: {}",
                        e
                    )));
                }
            }
        }

        Err(ConnectError::new("Upstream closed the connection during handshake"))
    }
}

#[async_trait]
impl LiveConnector for WebSocketLiveConnector {
    async fn connect(
        &self,
        room: &RoomTarget,
        options: &ConnectOptions,
    ) -> Result<LiveConnection, ConnectError> {
        tracing::debug!("Opening upstream connection to {} for {}", self.endpoint, room);

        let (stream, room_info) =
            match tokio::time::timeout(options.handshake_timeout, self.handshake(room, options))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ConnectError::new(format!(
                        "Timed out connecting to {} after {}s",
                        room,
                        options.handshake_timeout.as_secs()
                    )));
                }
            };

        Ok(LiveConnection {
            room_info,
            source: Box::new(WebSocketLiveSource {
                room: room.clone(),
                stream: Some(stream),
                clock: self.clock.clone(),
                close_timeout: options.handshake_timeout,
            }),
        })
    }
}

/// Live upstream socket for one room
pub struct WebSocketLiveSource {
    room: RoomTarget,
    stream: Option<UpstreamStream>,
    clock: Arc<dyn Clock>,
    /// 切断時のクローズハンドシェイクの上限
    close_timeout: Duration,
}

#[async_trait]
impl LiveSource for WebSocketLiveSource {
    async fn next_signal(&mut self) -> Option<UpstreamSignal> {
        loop {
            let stream = self.stream.as_mut()?;

            let message = match stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    tracing::warn!("Upstream read error for {}: {}", self.room, e);
                    self.stream = None;
                    return Some(UpstreamSignal::Disconnected);
                }
                None => {
                    self.stream = None;
                    return Some(UpstreamSignal::Disconnected);
                }
            };

            match message {
                Message::Text(text) => match serde_json::from_str::<UpstreamFrame>(&text) {
                    Ok(frame) => {
                        let received_at = Timestamp::new(self.clock.now_millis());
                        match frame.into_signal(received_at) {
                            Some(signal) => return Some(signal),
                            None => tracing::debug!("Skipping upstream frame: {}", text.as_str()),
                        }
                    }
                    Err(e) => {
                        return Some(UpstreamSignal::Error(format!(
                            "Malformed upstream frame: {}",
                            e
                        )));
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Upstream closed the connection for {}", self.room);
                    self.stream = None;
                    return Some(UpstreamSignal::Disconnected);
                }
                // ping/pong are answered by tungstenite
                _ => {}
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = close_within(&mut stream, self.close_timeout).await {
                tracing::warn!("Closing upstream socket for {}: {}", self.room, e);
            }
            tracing::debug!("Upstream connection for {} released", self.room);
        }
    }
}

/// Send a close frame and flush it, giving up after `limit`.
/// The socket is released by the caller either way.
async fn close_within<S>(stream: &mut S, limit: Duration) -> Result<(), String>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    match tokio::time::timeout(limit, stream.close()).await {
        Ok(Ok(())) | Ok(Err(tungstenite::Error::ConnectionClosed)) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("close timed out after {}ms", limit.as_millis())),
    }
}
