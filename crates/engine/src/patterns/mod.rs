//! Movement rules ("patterns") and their dispatcher.
//!
//! Every rule has the same frame contract: mutate headings, then translate
//! each agent along its heading. The caller applies the toroidal boundary
//! wrap afterwards, regardless of pattern. Per-frame distance for all rules
//! is `max(agentSpeed, 2) × 4.0 × dt`; role boosts multiply on top.

pub mod formation;
pub mod roles;
pub mod swarm;

use rand::rngs::SmallRng;

use crate::agent::{Agent, WORLD_CENTER_X, WORLD_CENTER_Y};
use crate::params::Params;

/// Relaxation gain for the `angle += gain × sin(target − angle)` steering
/// law used by every rule that chases a target angle.
pub(crate) const STEER_GAIN: f64 = 0.1;

/// Half-width of the uniform heading perturbation used wherever a rule
/// wanders (scatter, and the drift arms of the role rules).
pub(crate) const WANDER_SPREAD: f64 = 0.1;

/// Cohesion/alignment sliders are scaled by this before use.
pub(crate) const GAIN_SCALE: f64 = 0.02;

const SPEED_SCALE: f64 = 4.0;

/// The closed set of movement rules. `custom` is listed here so pattern
/// selection stays one exhaustive dispatch, but its per-tick work runs
/// through the behavior interpreter instead of [`apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    Flocking,
    Circle,
    Scatter,
    PredatorPrey,
    Vortex,
    SplitMerge,
    Wave,
    CollectiveAction,
    Custom,
}

impl Pattern {
    /// Parse a wire name. Unknown names are `None`, not an error.
    pub fn parse(name: &str) -> Option<Pattern> {
        Some(match name {
            "flocking" => Pattern::Flocking,
            "circle" => Pattern::Circle,
            "scatter" => Pattern::Scatter,
            "predator_prey" => Pattern::PredatorPrey,
            "vortex" => Pattern::Vortex,
            "split_merge" => Pattern::SplitMerge,
            "wave" => Pattern::Wave,
            "collective_action" => Pattern::CollectiveAction,
            "custom" => Pattern::Custom,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Flocking => "flocking",
            Pattern::Circle => "circle",
            Pattern::Scatter => "scatter",
            Pattern::PredatorPrey => "predator_prey",
            Pattern::Vortex => "vortex",
            Pattern::SplitMerge => "split_merge",
            Pattern::Wave => "wave",
            Pattern::CollectiveAction => "collective_action",
            Pattern::Custom => "custom",
        }
    }
}

/// Per-tick read-only inputs shared by every rule.
pub struct TickCtx<'a> {
    pub params: &'a Params,
    pub dt: f64,
    /// Accumulated simulation time, seconds.
    pub time: f64,
}

/// State that persists across ticks for rules that need it.
pub struct PatternState {
    /// Collective-action formation center; drifts toward the predators.
    pub formation_center: (f64, f64),
}

impl PatternState {
    pub fn new() -> Self {
        Self {
            formation_center: (WORLD_CENTER_X, WORLD_CENTER_Y),
        }
    }
}

impl Default for PatternState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one frame of the given built-in rule over the population.
pub fn apply(
    pattern: Pattern,
    agents: &mut [Agent],
    ctx: &TickCtx,
    state: &mut PatternState,
    rng: &mut SmallRng,
) {
    match pattern {
        Pattern::Flocking => swarm::flocking(agents, ctx),
        Pattern::Circle => swarm::circle(agents, ctx),
        Pattern::Scatter => swarm::scatter(agents, ctx, rng),
        Pattern::PredatorPrey => roles::predator_prey(agents, ctx, rng),
        Pattern::Vortex => swarm::vortex(agents, ctx),
        Pattern::SplitMerge => formation::split_merge(agents, ctx),
        Pattern::Wave => formation::wave(agents, ctx),
        Pattern::CollectiveAction => roles::collective_action(agents, ctx, state, rng),
        // The engine routes custom through the behavior interpreter.
        Pattern::Custom => {}
    }
}

/// Base speed before the per-frame scale: `max(agentSpeed, 2)`.
pub(crate) fn base_speed(params: &Params) -> f64 {
    params.agent_speed.max(2.0)
}

/// Distance an unboosted agent covers this frame.
pub(crate) fn frame_speed(params: &Params, dt: f64) -> f64 {
    base_speed(params) * SPEED_SCALE * dt
}
