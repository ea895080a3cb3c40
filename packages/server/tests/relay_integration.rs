//! End-to-end tests: axum router on a real port, viewers over tokio-tungstenite,
//! upstream served by the simulated connector.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::{
    net::{TcpListener, TcpStream},
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use liverelay_server::{
    domain::Authorizer,
    infrastructure::{
        auth::{AllowAllAuthorizer, JsonUserStore, json_file::UserRecord},
        dto::{
            http::{HistoryDto, SessionSummaryDto},
            websocket::{RelayEventDto, ServerMessage, StatusState},
        },
        live_source::SimulatedLiveConnector,
        registry::ChannelSubscriberRegistry,
    },
    ui::Server,
    usecase::{ConnectionSupervisor, ReconnectPolicy, SessionSettings},
};
use liverelay_shared::time::SystemClock;

type Viewer = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server(authorizer: Arc<dyn Authorizer>, max_attempts: u32) -> String {
    let settings = SessionSettings {
        policy: ReconnectPolicy {
            max_attempts,
            delay: Duration::from_millis(50),
            reconnect_on_disconnect: true,
        },
        poll_interval: Duration::from_millis(20),
        handshake_timeout: Duration::from_secs(2),
    };
    let supervisor = Arc::new(ConnectionSupervisor::new(
        Arc::new(ChannelSubscriberRegistry::new(50)),
        authorizer,
        Arc::new(SimulatedLiveConnector::new()),
        settings,
    ));
    let app = Server::new(supervisor, 256).router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn open_viewer(addr: &str, token: Option<&str>) -> Viewer {
    let url = match token {
        Some(token) => format!("ws://{}/ws?token={}", addr, token),
        None => format!("ws://{}/ws", addr),
    };
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn recv(viewer: &mut Viewer) -> ServerMessage {
    loop {
        let message = timeout(RECV_TIMEOUT, viewer.next())
            .await
            .expect("timed out waiting for server message")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn recv_status(viewer: &mut Viewer, state: StatusState) -> ServerMessage {
    loop {
        let message = recv(viewer).await;
        if let ServerMessage::Status { state: current, .. } = &message
            && *current == state
        {
            return message;
        }
    }
}

fn admin_store() -> JsonUserStore {
    let users: Vec<UserRecord> = serde_json::from_str(
        r#"[{"username": "admin", "password": "admin123", "role": "admin"}]"#,
    )
    .unwrap();
    JsonUserStore::from_records(users, Arc::new(SystemClock))
}

async fn send(viewer: &mut Viewer, json: &str) {
    viewer.send(Message::Text(json.into())).await.unwrap();
}

async fn get_json<T: DeserializeOwned>(addr: &str, path: &str) -> T {
    let response = reqwest::Client::new()
        .get(format!("http://{}{}", addr, path))
        .timeout(RECV_TIMEOUT)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json::<T>().await.unwrap()
}

async fn wait_for_live_events(viewer: &mut Viewer, count: usize) {
    let mut live = 0;
    while live < count {
        if let ServerMessage::Event(_) = recv(viewer).await {
            live += 1;
        }
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: /api/health が {"status":"ok"} を返す
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 3).await;

    // when (操作):
    let health = get_json::<serde_json::Value>(&addr, "/api/health").await;

    // then (期待する結果):
    assert_eq!(health, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_viewer_receives_history_then_live_events() {
    // テスト項目: 接続直後に空の履歴、接続要求後に connected と ライブイベントを受け取り、途中参加者は履歴を先に受け取る
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 3).await;
    let mut first = open_viewer(&addr, Some("alice")).await;
    assert_eq!(recv(&mut first).await, ServerMessage::History { events: vec![] });

    // when (操作):
    send(&mut first, r#"{"type":"connect","room":"@foo"}"#).await;

    // then (期待する結果):
    match recv_status(&mut first, StatusState::Connected).await {
        ServerMessage::Status { room_id, .. } => assert_eq!(room_id.as_deref(), Some("sim-foo")),
        other => panic!("unexpected message: {:?}", other),
    }
    wait_for_live_events(&mut first, 5).await;

    let mut late = open_viewer(&addr, None).await;
    match recv(&mut late).await {
        ServerMessage::History { events } => {
            assert!(!events.is_empty());
            assert!(
                events
                    .iter()
                    .all(|event| !matches!(event, RelayEventDto::ViewerCount { .. }))
            );
        }
        other => panic!("expected history first, got {:?}", other),
    }
    assert!(matches!(recv(&mut late).await, ServerMessage::Event(_)));
}

#[tokio::test]
async fn test_session_endpoint_reports_live_room() {
    // テスト項目: /api/session が接続中のルームと状態を返す
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 3).await;
    let mut viewer = open_viewer(&addr, None).await;
    recv(&mut viewer).await;
    send(&mut viewer, r#"{"type":"connect","room":"foo"}"#).await;
    recv_status(&mut viewer, StatusState::Connected).await;

    // when (操作):
    let summary = get_json::<SessionSummaryDto>(&addr, "/api/session").await;

    // then (期待する結果):
    assert_eq!(summary.room.as_deref(), Some("foo"));
    assert_eq!(summary.state, "live");
    assert_eq!(summary.viewers, 1);
}

#[tokio::test]
async fn test_debug_history_returns_buffered_events() {
    // テスト項目: /debug/history がバッファ済みイベントと最古・最新の時刻を返し、roomUser は含まない
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 3).await;
    let mut viewer = open_viewer(&addr, None).await;
    recv(&mut viewer).await;
    send(&mut viewer, r#"{"type":"connect","room":"foo"}"#).await;
    recv_status(&mut viewer, StatusState::Connected).await;
    wait_for_live_events(&mut viewer, 5).await;

    // when (操作):
    let history = get_json::<HistoryDto>(&addr, "/debug/history").await;
    let summary = get_json::<SessionSummaryDto>(&addr, "/api/session").await;

    // then (期待する結果):
    assert!(!history.events.is_empty());
    assert!(
        history
            .events
            .iter()
            .all(|event| !matches!(event, RelayEventDto::ViewerCount { .. }))
    );
    assert!(history.oldest.is_some());
    assert!(history.oldest <= history.newest);
    assert!(summary.buffered_events >= history.events.len());
}

#[tokio::test]
async fn test_invalid_message_gets_error_status() {
    // テスト項目: 不正な JSON を送った視聴者にだけ error ステータスが返る
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 3).await;
    let mut viewer = open_viewer(&addr, None).await;
    recv(&mut viewer).await;

    // when (操作):
    send(&mut viewer, "hello?").await;

    // then (期待する結果):
    match recv(&mut viewer).await {
        ServerMessage::Status { state, message, .. } => {
            assert_eq!(state, StatusState::Error);
            assert!(message.unwrap().starts_with("Invalid message"));
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn test_offline_room_ends_with_disconnected_status() {
    // テスト項目: ハンドシェイクがリトライ上限まで失敗すると disconnected が通知される
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 2).await;
    let mut viewer = open_viewer(&addr, None).await;
    recv(&mut viewer).await;

    // when (操作):
    send(&mut viewer, r#"{"type":"connect","room":"offline"}"#).await;

    // then (期待する結果):
    match recv_status(&mut viewer, StatusState::Disconnected).await {
        ServerMessage::Status { message, .. } => {
            assert_eq!(message.as_deref(), Some("@offline is not live"))
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_viewer_cannot_connect() {
    // テスト項目: パスワードが誤っている視聴者の接続要求は Unauthorized になり、セッションは開始されない
    // given (前提条件):
    let addr = start_server(Arc::new(admin_store()), 3).await;
    let mut viewer = open_viewer(&addr, Some("admin:wrong")).await;
    recv(&mut viewer).await;

    // when (操作):
    send(&mut viewer, r#"{"type":"connect","room":"foo"}"#).await;

    // then (期待する結果):
    assert_eq!(
        recv(&mut viewer).await,
        ServerMessage::Status {
            state: StatusState::Error,
            room_id: None,
            message: Some("Unauthorized: Invalid username or password".to_string()),
        }
    );
    let summary = get_json::<SessionSummaryDto>(&addr, "/api/session").await;
    assert_eq!(summary.state, "idle");
    assert_eq!(summary.room, None);
}

#[tokio::test]
async fn test_viewer_with_password_can_connect() {
    // テスト項目: 正しいユーザー名とパスワードを持つ視聴者は接続要求が受け付けられる
    // given (前提条件):
    let addr = start_server(Arc::new(admin_store()), 3).await;
    let mut viewer = open_viewer(&addr, Some("admin:admin123")).await;
    recv(&mut viewer).await;

    // when (操作):
    send(&mut viewer, r#"{"type":"connect","room":"foo"}"#).await;

    // then (期待する結果):
    recv_status(&mut viewer, StatusState::Connected).await;
    let summary = get_json::<SessionSummaryDto>(&addr, "/api/session").await;
    assert_eq!(summary.room.as_deref(), Some("foo"));
}

#[tokio::test]
async fn test_disconnect_request_notifies_viewers() {
    // テスト項目: disconnect 要求でセッションが停止し、全視聴者に disconnected が届く
    // given (前提条件):
    let addr = start_server(Arc::new(AllowAllAuthorizer), 3).await;
    let mut owner = open_viewer(&addr, Some("admin")).await;
    let mut watcher = open_viewer(&addr, None).await;
    recv(&mut owner).await;
    recv(&mut watcher).await;
    send(&mut owner, r#"{"type":"connect","room":"foo"}"#).await;
    recv_status(&mut watcher, StatusState::Connected).await;

    // when (操作):
    send(&mut owner, r#"{"type":"disconnect"}"#).await;

    // then (期待する結果):
    match recv_status(&mut watcher, StatusState::Disconnected).await {
        ServerMessage::Status { message, .. } => {
            assert_eq!(message.as_deref(), Some("Disconnected"))
        }
        other => panic!("unexpected message: {:?}", other),
    }
}
