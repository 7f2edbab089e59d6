//! The engine tick loop.
//!
//! One tokio task drives the engine at a fixed target cadence. Each tick
//! locks the engine for the duration of one update, passes the measured
//! wall-clock delta as `dt`, and publishes the resulting snapshot for the
//! broadcast side to pick up at its own pace.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawn the tick task at the given cadence.
pub fn start(state: Arc<AppState>, tick_hz: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs_f64(1.0 / f64::from(tick_hz));
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; skip it so the first measured
        // delta spans a real frame.
        interval.tick().await;

        tracing::info!("Tick loop started ({} Hz)", tick_hz);

        let mut last = Instant::now();
        loop {
            interval.tick().await;

            let now = Instant::now();
            let dt = (now - last).as_secs_f64();
            last = now;

            let started = Instant::now();
            let snapshot = {
                let mut engine = state.engine();
                if !engine.is_running() {
                    continue;
                }
                engine.tick(dt);
                engine.snapshot()
            };
            state.metrics.record_tick(started.elapsed());
            state.publish(snapshot);
        }
    })
}
