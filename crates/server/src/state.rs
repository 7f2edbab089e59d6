//! Shared server state.
//!
//! Design contract with the tick loop:
//!   • The engine sits behind one mutex held only for a discrete operation
//!     (one tick, one command, one snapshot copy), never across an await.
//!   • Snapshots are published via `tokio::sync::watch` (non-blocking send,
//!     overwrites previous value; a slow client just sees the latest
//!     snapshot and never stalls the tick loop).
//!   • Metrics are atomic fetch_adds, safe from any task.

use std::sync::{Mutex, MutexGuard, PoisonError};

use swarm_engine::SwarmEngine;
use swarm_engine::protocol::StateUpdate;
use tokio::sync::watch;

use crate::metrics::Metrics;

/// Central state shared via `Arc<AppState>`.
pub struct AppState {
    engine: Mutex<SwarmEngine>,
    pub metrics: Metrics,
    state_tx: watch::Sender<StateUpdate>,
}

impl AppState {
    pub fn new(engine: SwarmEngine) -> Self {
        let initial = engine.snapshot();
        let (state_tx, _) = watch::channel(initial);
        Self {
            engine: Mutex::new(engine),
            metrics: Metrics::new(),
            state_tx,
        }
    }

    /// Exclusive engine access for one discrete operation. A poisoned lock
    /// is recovered rather than wedging every later command: the engine's
    /// state stays consistent between its `&mut self` calls.
    pub fn engine(&self) -> MutexGuard<'_, SwarmEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a fresh snapshot. Non-blocking (overwrites previous).
    pub fn publish(&self, snapshot: StateUpdate) {
        let _ = self.state_tx.send(snapshot);
    }

    /// Snapshot the engine under the lock and publish the result.
    pub fn publish_current(&self) {
        let snapshot = self.engine().snapshot();
        self.publish(snapshot);
    }

    /// Create a new snapshot receiver (one per WebSocket client).
    pub fn subscribe(&self) -> watch::Receiver<StateUpdate> {
        self.state_tx.subscribe()
    }
}
