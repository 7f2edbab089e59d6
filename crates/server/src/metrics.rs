//! Lock-free server counters.
//!
//! The tick loop and connection handlers update these via atomic operations,
//! never blocking each other. Read at shutdown for the final report, and
//! cheap enough to sample anywhere else.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Monotonic counters
    ticks_completed: AtomicU64,
    tick_ns_sum: AtomicU64,
    commands_dispatched: AtomicU64,
    updates_sent: AtomicU64,
    connections_opened: AtomicU64,

    // Gauges
    clients_connected: AtomicU64,

    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            ticks_completed: AtomicU64::new(0),
            tick_ns_sum: AtomicU64::new(0),
            commands_dispatched: AtomicU64::new(0),
            updates_sent: AtomicU64::new(0),
            connections_opened: AtomicU64::new(0),
            clients_connected: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Called after each engine tick completes.
    pub fn record_tick(&self, duration: Duration) {
        self.ticks_completed.fetch_add(1, Relaxed);
        self.tick_ns_sum
            .fetch_add(duration.as_nanos() as u64, Relaxed);
    }

    pub fn record_command(&self) {
        self.commands_dispatched.fetch_add(1, Relaxed);
    }

    pub fn record_update_sent(&self) {
        self.updates_sent.fetch_add(1, Relaxed);
    }

    pub fn client_connected(&self) {
        self.connections_opened.fetch_add(1, Relaxed);
        self.clients_connected.fetch_add(1, Relaxed);
    }

    pub fn client_disconnected(&self) {
        self.clients_connected.fetch_sub(1, Relaxed);
    }

    /// Read all counters into a serializable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            ticks_completed: self.ticks_completed.load(Relaxed),
            tick_ns_sum: self.tick_ns_sum.load(Relaxed),
            commands_dispatched: self.commands_dispatched.load(Relaxed),
            updates_sent: self.updates_sent.load(Relaxed),
            connections_opened: self.connections_opened.load(Relaxed),
            clients_connected: self.clients_connected.load(Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of all counters. Consumers compute rates by diffing
/// consecutive snapshots.
#[derive(Clone, Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub ticks_completed: u64,
    pub tick_ns_sum: u64,
    pub commands_dispatched: u64,
    pub updates_sent: u64,
    pub connections_opened: u64,
    pub clients_connected: u64,
}
