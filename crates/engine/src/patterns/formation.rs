//! Index-driven formation rules: split/merge and wave.
//!
//! Both assign each agent a moving target from its ordinal position in the
//! population, which is why the agent sequence must never be reordered.

use std::f64::consts::TAU;

use super::{STEER_GAIN, TickCtx, base_speed, frame_speed};
use crate::agent::{Agent, WORLD_CENTER_X, WORLD_CENTER_Y, WORLD_WIDTH};

/// Seconds per breathing cycle of the split/merge centers.
const BREATH_PERIOD: f64 = 5.0;
/// Orbit rate of the paired centers around the screen center, rad/s.
const ORBIT_RATE: f64 = 0.5;
/// Center separation breathes between 50 and 250 units.
const SPREAD_BASE: f64 = 150.0;
const SPREAD_SWING: f64 = 100.0;

/// Horizontal lane offset per ordinal index.
const LANE_SPACING: f64 = 40.0;
/// Lane drift multiplier applied to `time × base_speed`.
const LANE_DRIFT: f64 = 50.0;
/// Per-agent phase offset along the wave.
const PHASE_STEP: f64 = 0.5;

/// Two attraction centers orbit the screen center while their separation
/// breathes on a sine; agents alternate centers by index parity.
pub fn split_merge(agents: &mut [Agent], ctx: &TickCtx) {
    let step = frame_speed(ctx.params, ctx.dt);
    let breath = (ctx.time * TAU / BREATH_PERIOD).sin();
    let spread = SPREAD_BASE + SPREAD_SWING * breath;
    let orbit = ctx.time * ORBIT_RATE;
    let (ox, oy) = (orbit.cos() * spread, orbit.sin() * spread);
    let centers = [
        (WORLD_CENTER_X + ox, WORLD_CENTER_Y + oy),
        (WORLD_CENTER_X - ox, WORLD_CENTER_Y - oy),
    ];

    for (i, agent) in agents.iter_mut().enumerate() {
        let (cx, cy) = centers[i % 2];
        let target = agent.angle_to(cx, cy);
        agent.angle += STEER_GAIN * (target - agent.angle).sin();
        agent.advance(step);
    }
}

/// Each agent chases a target sliding along its own horizontal lane, with
/// the lane's y following a sine of the configured frequency/amplitude.
pub fn wave(agents: &mut [Agent], ctx: &TickCtx) {
    let step = frame_speed(ctx.params, ctx.dt);
    let drift = ctx.time * base_speed(ctx.params) * LANE_DRIFT;

    for (i, agent) in agents.iter_mut().enumerate() {
        let idx = i as f64;
        let tx = (idx * LANE_SPACING + drift).rem_euclid(WORLD_WIDTH);
        let ty = WORLD_CENTER_Y
            + ctx.params.wave_amplitude
                * (ctx.time * ctx.params.wave_frequency + idx * PHASE_STEP).sin();
        let target = agent.angle_to(tx, ty);
        agent.angle += STEER_GAIN * (target - agent.angle).sin();
        agent.advance(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use crate::params::Params;

    #[test]
    fn split_merge_splits_by_parity() {
        let params = Params::default();
        let ctx = TickCtx {
            params: &params,
            dt: 0.1,
            time: 1.25,
        };
        // Two agents at the same spot with the same heading: only the
        // parity-assigned center differs, so their turns must differ.
        let mut agents = vec![
            Agent::new(400.0, 100.0, 0.0, Role::Normal),
            Agent::new(400.0, 100.0, 0.0, Role::Normal),
        ];
        split_merge(&mut agents, &ctx);
        assert_ne!(agents[0].angle, agents[1].angle);
    }

    #[test]
    fn wave_targets_advance_with_time() {
        let params = Params::default();
        let mut early = vec![Agent::new(0.0, 300.0, 0.0, Role::Normal)];
        let mut late = early.clone();
        wave(
            &mut early,
            &TickCtx {
                params: &params,
                dt: 0.1,
                time: 0.0,
            },
        );
        wave(
            &mut late,
            &TickCtx {
                params: &params,
                dt: 0.1,
                time: 0.3,
            },
        );
        // At t=0 the first lane target sits at x=0 (agent already there);
        // later the target has drifted, so the steering response differs.
        assert_ne!(early[0].angle, late[0].angle);
    }
}
