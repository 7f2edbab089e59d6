//! JSON vocabulary shared with the rendering client.
//!
//! Inbound messages are tagged by `type`. Outbound shapes are a binding
//! contract: field names must stay exactly as the canvas client expects,
//! and analytics floats are rounded to two decimals at serialization only,
//! never inside the engine.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Organization, Role};
use crate::analytics::{Analytics, InteractionZones, RoleCounts};
use crate::recorder::Frame;

// ── Inbound ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Command {
        action: CommandAction,
        /// Inline recording, honored only by `start_playback`.
        #[serde(default)]
        recording: Option<Vec<Frame>>,
    },
    Parameter {
        name: String,
        value: f64,
    },
    Pattern {
        name: String,
    },
    CustomBehavior {
        action: BehaviorAction,
        code: String,
    },
    GetRecording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Start,
    Stop,
    Reset,
    StartRecording,
    StopRecording,
    StartPlayback,
    StopPlayback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorAction {
    Save,
    Test,
}

// ── Outbound ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    StateUpdate(StateUpdate),
    RecordingData { recording: Vec<Frame> },
    BehaviorResponse { success: bool, message: String },
}

/// Per-agent fields broadcast to renderers. Narrower than [`Agent`]: the
/// dead-weight velocity components travel only inside recorded frames.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AgentWire {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub role: Role,
    pub state: Organization,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsWire {
    pub avg_distance: f64,
    pub predator_prey_distances: Vec<f64>,
    pub role_counts: RoleCounts,
    pub pattern_switches: u64,
    pub cohesion_score: f64,
    pub alignment_score: f64,
    pub interaction_zones: InteractionZones,
}

/// The periodic broadcast payload: the full population plus the analytics
/// snapshot, already rounded for the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateUpdate {
    pub agents: Vec<AgentWire>,
    pub analytics: AnalyticsWire,
}

impl StateUpdate {
    pub fn build(agents: &[Agent], analytics: &Analytics, pattern_switches: u64) -> Self {
        let agents = agents
            .iter()
            .map(|a| AgentWire {
                x: a.x,
                y: a.y,
                angle: a.angle,
                role: a.role,
                state: a.state,
            })
            .collect();
        let analytics = AnalyticsWire {
            avg_distance: round2(analytics.avg_distance),
            predator_prey_distances: analytics
                .predator_prey_distances
                .iter()
                .map(|&d| round2(d))
                .collect(),
            role_counts: analytics.role_counts,
            pattern_switches,
            cohesion_score: round2(analytics.cohesion_score),
            alignment_score: round2(analytics.alignment_score),
            interaction_zones: analytics.interaction_zones,
        };
        Self { agents, analytics }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
