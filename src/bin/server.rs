use std::sync::Arc;
use std::time::Duration;

use arena_shooter_server::config::ServerConfig;
use arena_shooter_server::engine::{GameEngine, GameEngineOptions};
use arena_shooter_server::error::{ServerError, ServerResult};
use arena_shooter_server::logging::init_tracing;
use arena_shooter_server::session::{
    disconnect_client, handle_client_message, push_corrections, tick_game, OutboundMessage,
    ServerState, SharedState, OUTBOUND_QUEUE_CAPACITY,
};
use arena_shooter_server::world::StaticWorld;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> ServerResult<()> {
    init_tracing();

    let config = ServerConfig::parse().validate()?;
    let seed = config.seed.unwrap_or_else(rand::random::<u32>);
    let game = GameEngine::new(
        GameEngineOptions {
            bot_target: config.bot_count,
            world: StaticWorld::default(),
        },
        seed,
    );
    info!(
        seed,
        bots = config.bot_count,
        tick_ms = config.tick_ms,
        correction_ms = config.correction_ms,
        started_at = %chrono::Utc::now().to_rfc3339(),
        "arena created"
    );

    let state: SharedState = Arc::new(Mutex::new(ServerState::new(game)));
    start_tick_loop(state.clone(), config.tick_ms);
    start_correction_loop(state.clone(), config.correction_ms);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = config.resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.display(), "serving static client");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("static client directory not found; serving the websocket endpoint only");
        app
    };

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;

    info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(OUTBOUND_QUEUE_CAPACITY);
    let client_id = {
        let mut guard = state.lock().await;
        guard.register_client(tx)
    };
    info!(%client_id, "session connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(OutboundMessage::Text(payload)) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        let raw = match message {
            Message::Text(raw) => raw.to_string(),
            Message::Binary(raw) => match String::from_utf8(raw.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    debug!(%client_id, "dropping non-utf8 frame");
                    continue;
                }
            },
            Message::Close(_) => break,
            _ => continue,
        };

        let mut guard = state.lock().await;
        handle_client_message(&mut guard, &client_id, &raw);
        if !guard.is_registered(&client_id) {
            break;
        }
    }

    {
        let mut guard = state.lock().await;
        disconnect_client(&mut guard, &client_id);
    }
    info!(%client_id, "session closed");
    let _ = writer.await;
}

fn start_tick_loop(state: SharedState, tick_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_game(&mut guard, tick_ms);
        }
    });
}

fn start_correction_loop(state: SharedState, correction_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(correction_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            push_corrections(&mut guard);
        }
    });
}
