//! WebSocket transport and tick scheduling around the swarm engine.
//!
//! Four pieces wired together by the binary: an [`AppState`] holding the
//! engine behind a per-operation mutex, a tick task driving it at a fixed
//! cadence, an axum server speaking the JSON vocabulary over `/ws`, and the
//! embedded control page at `/`.

pub mod metrics;
pub mod sim;
pub mod state;
pub mod ws;

pub use state::AppState;
