//! Test doubles shared by the usecase tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::mpsc, time::timeout};

use crate::domain::{
    ConnectError, ConnectOptions, ConnectionStatus, LiveConnection, LiveConnector, LiveSource,
    RoomInfo, RoomTarget, StatusUpdate, UpstreamSignal, ViewerMessage,
};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Scripted outcome of one handshake
enum Handshake {
    Fail(String),
    Hang,
    Accept {
        room_id: String,
        feed: mpsc::UnboundedReceiver<UpstreamSignal>,
    },
}

#[derive(Default)]
struct ScriptState {
    scripts: StdMutex<VecDeque<Handshake>>,
    log: StdMutex<Vec<String>>,
    open: AtomicUsize,
    max_open: AtomicUsize,
    disconnect_delay: Duration,
}

/// Connector replaying queued handshake outcomes
///
/// Records "connect <room>" / "disconnect <room>" and tracks how many upstream
/// connections (pending handshakes included) are open at once.
#[derive(Clone, Default)]
pub(crate) struct ScriptedConnector {
    state: Arc<ScriptState>,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sources from this connector take `delay` to release their connection.
    pub(crate) fn with_disconnect_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(ScriptState {
                disconnect_delay: delay,
                ..ScriptState::default()
            }),
        }
    }

    pub(crate) fn fail(&self, message: &str) {
        self.push(Handshake::Fail(message.to_string()));
    }

    pub(crate) fn hang(&self) {
        self.push(Handshake::Hang);
    }

    /// Queue a successful handshake; the returned sender feeds the upstream source.
    pub(crate) fn accept(&self, room_id: &str) -> mpsc::UnboundedSender<UpstreamSignal> {
        let (tx, feed) = mpsc::unbounded_channel();
        self.push(Handshake::Accept {
            room_id: room_id.to_string(),
            feed,
        });
        tx
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }

    pub(crate) fn open(&self) -> usize {
        self.state.open.load(Ordering::SeqCst)
    }

    pub(crate) fn max_open(&self) -> usize {
        self.state.max_open.load(Ordering::SeqCst)
    }

    fn push(&self, handshake: Handshake) {
        self.state.scripts.lock().unwrap().push_back(handshake);
    }
}

struct OpenGuard(Arc<ScriptState>);

impl OpenGuard {
    fn new(state: Arc<ScriptState>) -> Self {
        let open = state.open.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_open.fetch_max(open, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.0.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LiveConnector for ScriptedConnector {
    async fn connect(
        &self,
        room: &RoomTarget,
        _options: &ConnectOptions,
    ) -> Result<LiveConnection, ConnectError> {
        self.state
            .log
            .lock()
            .unwrap()
            .push(format!("connect {}", room.as_str()));
        let guard = OpenGuard::new(self.state.clone());
        tokio::task::yield_now().await;

        let script = self.state.scripts.lock().unwrap().pop_front();
        match script {
            Some(Handshake::Fail(message)) => Err(ConnectError::new(message)),
            Some(Handshake::Hang) => std::future::pending().await,
            Some(Handshake::Accept { room_id, feed }) => Ok(LiveConnection {
                room_info: RoomInfo { room_id },
                source: Box::new(ScriptedSource {
                    room: room.as_str().to_string(),
                    feed,
                    state: self.state.clone(),
                    guard: Some(guard),
                }),
            }),
            None => Err(ConnectError::new("no handshake scripted")),
        }
    }
}

struct ScriptedSource {
    room: String,
    feed: mpsc::UnboundedReceiver<UpstreamSignal>,
    state: Arc<ScriptState>,
    guard: Option<OpenGuard>,
}

#[async_trait]
impl LiveSource for ScriptedSource {
    async fn next_signal(&mut self) -> Option<UpstreamSignal> {
        self.feed.recv().await
    }

    async fn disconnect(&mut self) {
        if let Some(guard) = self.guard.take() {
            self.state
                .log
                .lock()
                .unwrap()
                .push(format!("disconnect {}", self.room));
            tokio::time::sleep(self.state.disconnect_delay).await;
            drop(guard);
        }
    }
}

/// Next message on a viewer channel, failing the test after a timeout
pub(crate) async fn next_message(rx: &mut mpsc::Receiver<ViewerMessage>) -> ViewerMessage {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for viewer message")
        .expect("viewer channel closed")
}

/// Skip messages until a status with the given state arrives
pub(crate) async fn wait_for_status(
    rx: &mut mpsc::Receiver<ViewerMessage>,
    state: ConnectionStatus,
) -> StatusUpdate {
    loop {
        if let ViewerMessage::Status(status) = next_message(rx).await
            && status.state == state
        {
            return status;
        }
    }
}

/// Collect everything currently queued on a viewer channel
pub(crate) fn drain(rx: &mut mpsc::Receiver<ViewerMessage>) -> Vec<ViewerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}
