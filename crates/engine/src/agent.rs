//! Agent records and population construction.
//!
//! The population is an ordered `Vec<Agent>`: ordinal index and index parity
//! are semantic (wave lanes, split/merge group assignment), so nothing may
//! reorder the sequence within an epoch. Playback replaces it wholesale.

use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// Simulated area, wrapped toroidally after every tick.
pub const WORLD_WIDTH: f64 = 800.0;
pub const WORLD_HEIGHT: f64 = 600.0;
pub const WORLD_CENTER_X: f64 = 400.0;
pub const WORLD_CENTER_Y: f64 = 300.0;

/// Fresh populations spawn this far inside every edge.
const SPAWN_MARGIN: f64 = 100.0;

/// Behavioral class of an agent. Assigned by quota at population reset;
/// the collective-action rule reclassifies normals to prey at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Normal,
    Predator,
    Prey,
}

/// Whether an agent is part of the collective-action formation.
/// Serialized as the `state` field on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Organization {
    #[default]
    Normal,
    Organized,
}

/// A single point agent.
///
/// `angle` is the heading in radians and is deliberately never normalized:
/// it only ever feeds `sin`/`cos`, which are total. `vx`/`vy` are carried
/// for wire compatibility with recorded frames but no rule reads them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub state: Organization,
}

impl Agent {
    pub fn new(x: f64, y: f64, angle: f64, role: Role) -> Self {
        Self {
            x,
            y,
            angle,
            vx: 0.0,
            vy: 0.0,
            role,
            state: Organization::Normal,
        }
    }

    /// Translate along the current heading.
    pub fn advance(&mut self, distance: f64) {
        self.x += self.angle.cos() * distance;
        self.y += self.angle.sin() * distance;
    }

    /// Wrap the position back into `[0, 800) × [0, 600)`. Idempotent.
    pub fn wrap(&mut self) {
        self.x = self.x.rem_euclid(WORLD_WIDTH);
        self.y = self.y.rem_euclid(WORLD_HEIGHT);
    }

    /// Heading from this agent toward a point.
    pub fn angle_to(&self, x: f64, y: f64) -> f64 {
        (y - self.y).atan2(x - self.x)
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// ── Population construction ──────────────────────────────────────────────

/// Predator quota for a population of `count`: `max(2, round(0.10 × count))`.
pub fn predator_quota(count: usize) -> usize {
    ((count as f64 * 0.10).round() as usize).max(2)
}

/// Prey quota for a population of `count`: `max(3, round(0.15 × count))`.
pub fn prey_quota(count: usize) -> usize {
    ((count as f64 * 0.15).round() as usize).max(3)
}

/// Build a fresh population of exactly `count` agents: predators first, then
/// prey, then normals, positioned uniformly inside the spawn region with
/// uniform random headings.
pub fn spawn_population(count: usize, rng: &mut SmallRng) -> Vec<Agent> {
    let predators = predator_quota(count);
    let prey = prey_quota(count);

    (0..count)
        .map(|i| {
            let role = if i < predators {
                Role::Predator
            } else if i < predators + prey {
                Role::Prey
            } else {
                Role::Normal
            };
            Agent::new(
                rng.gen_range(SPAWN_MARGIN..WORLD_WIDTH - SPAWN_MARGIN),
                rng.gen_range(SPAWN_MARGIN..WORLD_HEIGHT - SPAWN_MARGIN),
                rng.gen_range(0.0..std::f64::consts::TAU),
                role,
            )
        })
        .collect()
}
