//! The engine facade: owns the population and every subsystem that reads or
//! mutates it, and exposes the discrete operations the transport layer calls.
//!
//! All mutation funnels through `&mut self` methods, so a caller that wraps
//! the engine in a mutex gets the whole concurrency contract for free: one
//! tick, one command, or one snapshot copy per lock acquisition, and never a
//! torn population.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::agent::{self, Agent};
use crate::analytics::Analytics;
use crate::behavior::{self, Env, Program};
use crate::epoch::Epoch;
use crate::params::{ParamUpdate, Params};
use crate::patterns::{self, Pattern, PatternState, TickCtx};
use crate::protocol::StateUpdate;
use crate::recorder::{Frame, Recorder};

pub struct SwarmEngine {
    agents: Vec<Agent>,
    params: Params,
    epoch: Epoch,
    analytics: Analytics,
    recorder: Recorder,
    /// Last custom program accepted by `save_behavior`. Survives resets.
    behavior: Option<Program>,
    pattern_state: PatternState,
    rng: SmallRng,
}

impl SwarmEngine {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Deterministic construction for tests and replays on the same build.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        let mut engine = Self {
            agents: Vec::new(),
            params: Params::default(),
            epoch: Epoch::new(Pattern::Flocking),
            analytics: Analytics::default(),
            recorder: Recorder::new(),
            behavior: None,
            pattern_state: PatternState::new(),
            rng,
        };
        engine.reset();
        engine
    }

    // ── Tick pipeline ───────────────────────────────────────────────────

    /// Advance one frame. `dt` is the measured wall-clock delta in seconds.
    ///
    /// Stopped engines ignore the call. In playback mode the frame comes from
    /// the recorded buffer instead of the movement rules; exhausting the
    /// buffer stops the simulation.
    pub fn tick(&mut self, dt: f64) {
        if !self.epoch.running {
            return;
        }

        if self.recorder.is_playing() {
            match self.recorder.next_frame() {
                Some(frame) => {
                    self.agents = frame.agents;
                    self.analytics.recompute(&self.agents);
                }
                None => {
                    self.epoch.running = false;
                    tracing::info!("Playback exhausted, simulation stopped");
                }
            }
            return;
        }

        self.epoch.advance(dt);

        match self.epoch.pattern() {
            Pattern::Custom => self.run_custom(dt),
            pattern => {
                let ctx = TickCtx {
                    params: &self.params,
                    dt,
                    time: self.epoch.time(),
                };
                patterns::apply(
                    pattern,
                    &mut self.agents,
                    &ctx,
                    &mut self.pattern_state,
                    &mut self.rng,
                );
            }
        }

        for agent in &mut self.agents {
            agent.wrap();
        }

        self.analytics.recompute(&self.agents);
        self.recorder.capture(&self.agents);
    }

    /// Run the saved custom program over a scratch copy of the population.
    /// The copy replaces the live population only if every agent's update
    /// succeeds; any failure leaves this tick a no-op.
    fn run_custom(&mut self, dt: f64) {
        let Some(program) = &self.behavior else {
            tracing::warn!("Custom pattern active with no saved behavior");
            return;
        };

        let speed = patterns::frame_speed(&self.params, dt);
        let count = self.agents.len();
        let mut scratch = self.agents.clone();
        let mut budget = behavior::OP_BUDGET;

        for (index, agent) in scratch.iter_mut().enumerate() {
            let env = Env {
                index: index as f64,
                count: count as f64,
                dt,
                speed,
                time: self.epoch.time(),
                params: &self.params,
            };
            if let Err(e) = behavior::run(program, agent, &env, &mut self.rng, &mut budget) {
                tracing::warn!("Custom behavior failed on agent {}: {}", index, e);
                return;
            }
            // The interpreter is total over IEEE arithmetic, so `1 / 0` comes
            // back Ok with an infinite coordinate. Committing that would turn
            // into NaN under the boundary wrap and stick until reset.
            if !(agent.x.is_finite() && agent.y.is_finite() && agent.angle.is_finite()) {
                tracing::warn!("Custom behavior produced non-finite state on agent {}", index);
                return;
            }
        }

        self.agents = scratch;
    }

    // ── Lifecycle commands ──────────────────────────────────────────────

    pub fn start(&mut self) {
        self.epoch.running = true;
    }

    pub fn stop(&mut self) {
        self.epoch.running = false;
    }

    /// Rebuild the population at the current agent count and discard all
    /// accumulated state: simulation clock, pattern durations, analytics,
    /// and the recording buffer. The selected pattern and any saved custom
    /// behavior carry over; the engine comes back stopped.
    pub fn reset(&mut self) {
        let count = self.params.agent_count;
        self.agents = agent::spawn_population(count, &mut self.rng);
        self.epoch = Epoch::new(self.epoch.pattern());
        self.analytics = Analytics::default();
        self.pattern_state = PatternState::new();
        self.recorder.clear();
        tracing::info!(
            "Population reset: {} agents ({} predators, {} prey)",
            count,
            agent::predator_quota(count),
            agent::prey_quota(count)
        );
    }

    // ── Parameters and patterns ─────────────────────────────────────────

    /// Apply one named parameter. Returns false for unknown names, which are
    /// ignored rather than treated as errors. An agent-count change rebuilds
    /// the population via `reset`.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> bool {
        match self.params.set(name, value) {
            ParamUpdate::Applied => true,
            ParamUpdate::CountChanged => {
                self.reset();
                true
            }
            ParamUpdate::Unknown => {
                tracing::warn!("Ignoring unknown parameter {:?}", name);
                false
            }
        }
    }

    /// Switch the active movement rule by wire name. Switching to the custom
    /// rule requires a previously saved behavior.
    pub fn set_pattern(&mut self, name: &str) -> bool {
        let Some(pattern) = Pattern::parse(name) else {
            tracing::warn!("Ignoring unknown pattern {:?}", name);
            return false;
        };
        if pattern == Pattern::Custom && self.behavior.is_none() {
            tracing::warn!("Rejecting custom pattern: no behavior saved");
            return false;
        }
        if self.epoch.set_pattern(pattern) {
            tracing::info!("Pattern switched to {}", pattern.name());
        }
        true
    }

    // ── Recording and playback ──────────────────────────────────────────

    /// Begin capturing one frame per live tick. Refused during playback.
    /// Starting over discards the previous recording.
    pub fn start_recording(&mut self) -> bool {
        if self.recorder.begin_capture() {
            tracing::info!("Recording started");
            true
        } else {
            tracing::warn!("Recording refused while playback is active");
            false
        }
    }

    pub fn stop_recording(&mut self) {
        self.recorder.end_capture();
        tracing::info!("Recording stopped: {} frames", self.recorder.frame_count());
    }

    pub fn recording(&self) -> &[Frame] {
        self.recorder.frames()
    }

    /// Replay a recording frame by frame. A provided recording replaces the
    /// buffer first; otherwise the last captured one plays. Refused when the
    /// buffer is empty. Entering playback forces the simulation to run.
    pub fn start_playback(&mut self, recording: Option<Vec<Frame>>) -> bool {
        if let Some(frames) = recording {
            self.recorder.load(frames);
        }
        if self.recorder.begin_playback() {
            self.epoch.running = true;
            tracing::info!("Playback started: {} frames", self.recorder.frame_count());
            true
        } else {
            tracing::warn!("Playback refused: buffer is empty");
            false
        }
    }

    pub fn stop_playback(&mut self) {
        self.recorder.end_playback();
        self.epoch.running = false;
    }

    // ── Custom behavior ─────────────────────────────────────────────────

    /// Validate and store a custom program. Only a stored program makes the
    /// custom pattern selectable.
    pub fn save_behavior(&mut self, source: &str) -> (bool, String) {
        match behavior::validate(source) {
            Ok(program) => {
                self.behavior = Some(program);
                tracing::info!("Custom behavior saved");
                (true, "behavior saved".to_string())
            }
            Err(e) => {
                tracing::warn!("Rejected custom behavior: {}", e);
                (false, e.to_string())
            }
        }
    }

    /// Validate without storing. The dry-run path for editor feedback.
    pub fn test_behavior(&self, source: &str) -> (bool, String) {
        match behavior::validate(source) {
            Ok(_) => (true, "behavior compiles".to_string()),
            Err(e) => (false, e.to_string()),
        }
    }

    // ── Readers ─────────────────────────────────────────────────────────

    /// Wire-shaped copy of the population and analytics, taken atomically
    /// with respect to the other operations on this engine.
    pub fn snapshot(&self) -> StateUpdate {
        StateUpdate::build(&self.agents, &self.analytics, self.epoch.switches())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn is_running(&self) -> bool {
        self.epoch.running
    }

    pub fn pattern(&self) -> Pattern {
        self.epoch.pattern()
    }

    pub fn sim_time(&self) -> f64 {
        self.epoch.time()
    }

    pub fn pattern_switches(&self) -> u64 {
        self.epoch.switches()
    }

    pub fn pattern_duration(&self, pattern: Pattern) -> f64 {
        self.epoch.duration_of(pattern)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_capturing()
    }

    pub fn is_playing(&self) -> bool {
        self.recorder.is_playing()
    }
}

impl Default for SwarmEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_is_stopped_with_default_population() {
        let engine = SwarmEngine::seeded(1);
        assert!(!engine.is_running());
        assert_eq!(engine.agents().len(), Params::default().agent_count);
        assert_eq!(engine.pattern(), Pattern::Flocking);
    }

    #[test]
    fn seeded_engines_spawn_identical_populations() {
        let a = SwarmEngine::seeded(7);
        let b = SwarmEngine::seeded(7);
        assert_eq!(a.agents(), b.agents());
    }

    #[test]
    fn stopped_engine_ignores_ticks() {
        let mut engine = SwarmEngine::seeded(2);
        let before = engine.agents().to_vec();
        engine.tick(0.1);
        assert_eq!(engine.agents(), &before[..]);
        assert_eq!(engine.sim_time(), 0.0);
    }

    #[test]
    fn reset_keeps_pattern_and_stops() {
        let mut engine = SwarmEngine::seeded(3);
        engine.start();
        assert!(engine.set_pattern("vortex"));
        engine.reset();
        assert!(!engine.is_running());
        assert_eq!(engine.pattern(), Pattern::Vortex);
        assert_eq!(engine.sim_time(), 0.0);
    }

    #[test]
    fn custom_pattern_needs_saved_behavior() {
        let mut engine = SwarmEngine::seeded(4);
        assert!(!engine.set_pattern("custom"));
        let (ok, _) = engine.save_behavior("behavior update\n  advance speed\nend");
        assert!(ok);
        assert!(engine.set_pattern("custom"));
    }
}
