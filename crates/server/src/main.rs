use std::sync::Arc;

use swarm_engine::SwarmEngine;
use swarm_server::{AppState, sim, ws};

const DEFAULT_PORT: u16 = 8087;
const DEFAULT_TICK_HZ: u32 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::args()
        .skip_while(|a| a != "--port")
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let tick_hz: u32 = std::env::args()
        .skip_while(|a| a != "--tick-hz")
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TICK_HZ)
        .clamp(1, 240);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    tracing::info!("Swarm simulation server");

    let state = Arc::new(AppState::new(SwarmEngine::new()));
    let tick_task = sim::start(Arc::clone(&state), tick_hz);

    tokio::select! {
        result = ws::run(Arc::clone(&state), port) => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down...");
        }
    }

    tick_task.abort();
    tracing::info!("Final counters: {}", serde_json::to_string(&state.metrics.snapshot())?);
    Ok(())
}
