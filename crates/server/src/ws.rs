//! axum web server for the control client.
//!
//! Serves the embedded single-page client at `/` and speaks the JSON
//! message vocabulary over WebSocket at `/ws`: commands in, periodic state
//! updates plus direct replies out.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use swarm_engine::protocol::{BehaviorAction, ClientMessage, CommandAction, ServerMessage};
use tokio::net::TcpListener;

use crate::state::AppState;

/// Broadcast cadence toward each client. Deliberately slower than the tick
/// rate; the watch channel skips intermediate frames.
const BROADCAST_INTERVAL: Duration = Duration::from_millis(33);

/// Serve the control page and WebSocket endpoint until shutdown.
pub async fn run(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_upgrade))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve the embedded single-page client.
async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// Upgrade an HTTP request to a WebSocket connection.
async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Push state updates and answer commands for one connected client.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    state.metrics.client_connected();

    let rx = state.subscribe();
    let mut ticker = tokio::time::interval(BROADCAST_INTERVAL);

    // First paint before any broadcast tick.
    let initial = ServerMessage::StateUpdate(rx.borrow().clone());
    if send_json(&mut socket, &initial).await.is_err() {
        state.metrics.client_disconnected();
        return;
    }

    loop {
        tokio::select! {
            // Push the freshest snapshot at the broadcast cadence.
            _ = ticker.tick() => {
                let update = ServerMessage::StateUpdate(rx.borrow().clone());
                if send_json(&mut socket, &update).await.is_err() {
                    break;
                }
                state.metrics.record_update_sent();
            }

            // Handle one inbound message.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = dispatch(&state, &text) {
                            if send_json(&mut socket, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ignore pings, binary, etc.
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.metrics.client_disconnected();
}

/// Apply one client message to the engine.
///
/// Request/response messages (recording fetch, behavior validation) return a
/// direct reply; everything else surfaces through the next broadcast. The
/// engine lock is held once per message and released before publishing.
pub fn dispatch(state: &AppState, text: &str) -> Option<ServerMessage> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("Discarding malformed message: {}", e);
            return None;
        }
    };
    state.metrics.record_command();

    match message {
        ClientMessage::Command { action, recording } => {
            {
                let mut engine = state.engine();
                match action {
                    CommandAction::Start => engine.start(),
                    CommandAction::Stop => engine.stop(),
                    CommandAction::Reset => engine.reset(),
                    CommandAction::StartRecording => {
                        engine.start_recording();
                    }
                    CommandAction::StopRecording => engine.stop_recording(),
                    CommandAction::StartPlayback => {
                        engine.start_playback(recording);
                    }
                    CommandAction::StopPlayback => engine.stop_playback(),
                }
            }
            state.publish_current();
            None
        }
        ClientMessage::Parameter { name, value } => {
            state.engine().set_parameter(&name, value);
            state.publish_current();
            None
        }
        ClientMessage::Pattern { name } => {
            state.engine().set_pattern(&name);
            state.publish_current();
            None
        }
        ClientMessage::CustomBehavior { action, code } => {
            let (success, message) = {
                let mut engine = state.engine();
                match action {
                    BehaviorAction::Save => engine.save_behavior(&code),
                    BehaviorAction::Test => engine.test_behavior(&code),
                }
            };
            Some(ServerMessage::BehaviorResponse { success, message })
        }
        ClientMessage::GetRecording => {
            let recording = state.engine().recording().to_vec();
            Some(ServerMessage::RecordingData { recording })
        }
    }
}

async fn send_json(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), ()> {
    let text = match serde_json::to_string(message) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Reply serialization failed: {}", e);
            return Err(());
        }
    };
    socket.send(Message::Text(text.into())).await.map_err(|_| ())
}
