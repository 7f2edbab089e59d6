//! The tunable parameter set.
//!
//! Keys are fixed and use the wire spelling (`agentCount`, `agentSpeed`, ...).
//! Unknown keys are rejected as a no-op, never an error: callers treat the
//! returned [`ParamUpdate`] as the only success signal.

/// Population size bounds enforced on every `agentCount` write.
pub const MIN_AGENTS: usize = 5;
pub const MAX_AGENTS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    pub agent_count: usize,
    pub agent_speed: f64,
    pub swarm_cohesion: f64,
    pub swarm_alignment: f64,
    pub wave_frequency: f64,
    pub wave_amplitude: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            agent_count: 20,
            agent_speed: 5.0,
            swarm_cohesion: 5.0,
            swarm_alignment: 5.0,
            wave_frequency: 2.0,
            wave_amplitude: 50.0,
        }
    }
}

/// Outcome of a parameter write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamUpdate {
    /// Value stored; nothing else to do.
    Applied,
    /// `agentCount` stored (clamped); the population must be rebuilt.
    CountChanged,
    /// Unknown key; state unchanged.
    Unknown,
}

impl Params {
    /// Apply one named write. `agentCount` is rounded and clamped to
    /// `[MIN_AGENTS, MAX_AGENTS]`; every other known key stores the value
    /// verbatim.
    pub fn set(&mut self, name: &str, value: f64) -> ParamUpdate {
        match name {
            "agentCount" => {
                self.agent_count = clamp_count(value);
                ParamUpdate::CountChanged
            }
            "agentSpeed" => {
                self.agent_speed = value;
                ParamUpdate::Applied
            }
            "swarmCohesion" => {
                self.swarm_cohesion = value;
                ParamUpdate::Applied
            }
            "swarmAlignment" => {
                self.swarm_alignment = value;
                ParamUpdate::Applied
            }
            "waveFrequency" => {
                self.wave_frequency = value;
                ParamUpdate::Applied
            }
            "waveAmplitude" => {
                self.wave_amplitude = value;
                ParamUpdate::Applied
            }
            _ => ParamUpdate::Unknown,
        }
    }
}

fn clamp_count(value: f64) -> usize {
    let rounded = value.round();
    if rounded.is_nan() {
        return MIN_AGENTS;
    }
    rounded.clamp(MIN_AGENTS as f64, MAX_AGENTS as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_count_rounds_and_clamps() {
        let mut params = Params::default();
        assert_eq!(params.set("agentCount", 1.0), ParamUpdate::CountChanged);
        assert_eq!(params.agent_count, MIN_AGENTS);
        params.set("agentCount", 1000.0);
        assert_eq!(params.agent_count, MAX_AGENTS);
        params.set("agentCount", 7.4);
        assert_eq!(params.agent_count, 7);
        params.set("agentCount", f64::NAN);
        assert_eq!(params.agent_count, MIN_AGENTS);
        params.set("agentCount", f64::INFINITY);
        assert_eq!(params.agent_count, MAX_AGENTS);
    }

    #[test]
    fn unknown_keys_leave_state_untouched() {
        let mut params = Params::default();
        let before = params;
        assert_eq!(params.set("warpFactor", 9.0), ParamUpdate::Unknown);
        assert_eq!(params, before);
    }

    #[test]
    fn known_keys_store_verbatim() {
        let mut params = Params::default();
        assert_eq!(params.set("waveAmplitude", -3.25), ParamUpdate::Applied);
        assert_eq!(params.wave_amplitude, -3.25);
        assert_eq!(params.set("agentSpeed", 0.0), ParamUpdate::Applied);
        assert_eq!(params.agent_speed, 0.0);
    }
}
