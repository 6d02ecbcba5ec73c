use super::*;

use std::{net::SocketAddr, time::Duration};

use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use rand::{rngs::StdRng, SeedableRng};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use crate::app::AppConfig;
use crate::infrastructure::catalog::StaticItemCatalog;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::ports::{ClockPort, ItemCatalogPort, ProgressionPort};
use crate::infrastructure::progression::LoggingProgression;

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn test_app(config: AppConfig) -> Arc<App> {
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let catalog: Arc<dyn ItemCatalogPort> = Arc::new(StaticItemCatalog::new());
    let progression: Arc<dyn ProgressionPort> = Arc::new(LoggingProgression::new());

    Arc::new(App::new(
        config,
        Arc::new(ConnectionManager::new()),
        clock,
        catalog,
        progression,
        StdRng::seed_from_u64(7),
    ))
}

pub(crate) fn ws_state(app: Arc<App>) -> Arc<WsState> {
    let connections = app.connections.clone();
    Arc::new(WsState { app, connections })
}

pub(crate) async fn spawn_ws_server(
    state: Arc<WsState>,
) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = axum::Router::new().route("/ws", get(ws_handler).with_state(state));

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

pub(crate) async fn ws_connect(
    addr: SocketAddr,
) -> tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>> {
    let url = format!("ws://{}/ws", addr);
    let (ws, _resp) = connect_async(url).await.unwrap();
    ws
}

pub(crate) async fn ws_send_client(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    msg: &taberna_protocol::ClientMessage,
) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(WsMessage::Text(json.into())).await.unwrap();
}

pub(crate) async fn ws_recv_server(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) -> taberna_protocol::ServerMessage {
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        match msg {
            WsMessage::Text(text) => {
                return serde_json::from_str::<taberna_protocol::ServerMessage>(&text).unwrap();
            }
            WsMessage::Binary(bin) => {
                let text = String::from_utf8(bin).unwrap();
                return serde_json::from_str::<taberna_protocol::ServerMessage>(&text).unwrap();
            }
            _ => {}
        }
    }
}

pub(crate) async fn ws_expect_message<F>(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    timeout: Duration,
    mut predicate: F,
) -> taberna_protocol::ServerMessage
where
    F: FnMut(&taberna_protocol::ServerMessage) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                return msg;
            }
        }
    })
    .await
    .unwrap()
}

pub(crate) async fn ws_expect_no_message_matching<F>(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    timeout: Duration,
    mut predicate: F,
) where
    F: FnMut(&taberna_protocol::ServerMessage) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                panic!("unexpected message: {:?}", msg);
            }
        }
    })
    .await;

    // We only succeed if we timed out without seeing a matching message.
    assert!(result.is_err());
}

/// Join the tavern under `name` and return the assigned player id.
pub(crate) async fn join_as(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    name: &str,
) -> Uuid {
    ws_send_client(
        ws,
        &taberna_protocol::ClientMessage::JoinGame {
            name: name.to_string(),
        },
    )
    .await;

    let msg = ws_expect_message(ws, RECV_TIMEOUT, |msg| {
        matches!(msg, taberna_protocol::ServerMessage::PlayerAssigned { .. })
    })
    .await;

    match msg {
        taberna_protocol::ServerMessage::PlayerAssigned { player_id } => player_id,
        other => panic!("expected PlayerAssigned, got {:?}", other),
    }
}

/// Drive two joined clients through a challenge and its acceptance,
/// returning the combat id once both sides hold the opening state.
pub(crate) async fn start_duel(
    ws_challenger: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    ws_challenged: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    challenged_id: Uuid,
) -> Uuid {
    ws_send_client(
        ws_challenger,
        &taberna_protocol::ClientMessage::ChallengePlayer {
            target_id: challenged_id,
        },
    )
    .await;

    let invite = ws_expect_message(ws_challenged, RECV_TIMEOUT, |msg| {
        matches!(msg, taberna_protocol::ServerMessage::CombatChallenge { .. })
    })
    .await;
    let challenge_id = match invite {
        taberna_protocol::ServerMessage::CombatChallenge { challenge } => challenge.id,
        other => panic!("expected CombatChallenge, got {:?}", other),
    };

    ws_send_client(
        ws_challenged,
        &taberna_protocol::ClientMessage::RespondToChallenge {
            challenge_id,
            accepted: true,
        },
    )
    .await;

    let update = ws_expect_message(ws_challenger, RECV_TIMEOUT, |msg| {
        matches!(msg, taberna_protocol::ServerMessage::CombatStateUpdate { .. })
    })
    .await;
    let combat_id = match update {
        taberna_protocol::ServerMessage::CombatStateUpdate { combat_state, .. } => combat_state.id,
        other => panic!("expected CombatStateUpdate, got {:?}", other),
    };

    ws_expect_message(ws_challenged, RECV_TIMEOUT, |msg| {
        matches!(msg, taberna_protocol::ServerMessage::CombatStateUpdate { .. })
    })
    .await;

    combat_id
}
