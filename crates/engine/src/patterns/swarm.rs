//! Whole-population rules: flocking, circle, scatter, vortex.
//!
//! Neighbor-reading rules work from a pre-tick copy of the population, so
//! every agent sees the same frame and iteration order cannot leak into the
//! result.

use std::f64::consts::FRAC_PI_2;

use rand::Rng;
use rand::rngs::SmallRng;

use super::{GAIN_SCALE, STEER_GAIN, TickCtx, WANDER_SPREAD, frame_speed};
use crate::agent::{Agent, WORLD_CENTER_X, WORLD_CENTER_Y};

/// Inward bias blended into the tangent heading for the vortex spiral.
const VORTEX_SPIRAL: f64 = 0.3;

/// Each agent steers toward the mean position and mean heading of all the
/// *other* agents, blended by the cohesion/alignment gains. A population of
/// one has no others to average; it just advances.
pub fn flocking(agents: &mut [Agent], ctx: &TickCtx) {
    let n = agents.len();
    let step = frame_speed(ctx.params, ctx.dt);

    if n < 2 {
        for agent in agents.iter_mut() {
            agent.advance(step);
        }
        return;
    }

    let cohesion = ctx.params.swarm_cohesion * GAIN_SCALE;
    let alignment = ctx.params.swarm_alignment * GAIN_SCALE;
    let before: Vec<Agent> = agents.to_vec();
    let others = (n - 1) as f64;

    for (i, agent) in agents.iter_mut().enumerate() {
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut heading_sum = 0.0;
        for (j, other) in before.iter().enumerate() {
            if j != i {
                cx += other.x;
                cy += other.y;
                heading_sum += other.angle;
            }
        }
        cx /= others;
        cy /= others;
        let mean_heading = heading_sum / others;

        let toward_center = agent.angle_to(cx, cy);
        agent.angle += cohesion * (toward_center - agent.angle).sin()
            + alignment * (mean_heading - agent.angle).sin();
        agent.advance(step);
    }
}

/// Steer toward the tangent of a ring around the screen center.
pub fn circle(agents: &mut [Agent], ctx: &TickCtx) {
    let step = frame_speed(ctx.params, ctx.dt);
    for agent in agents.iter_mut() {
        let target = agent.angle_to(WORLD_CENTER_X, WORLD_CENTER_Y) + FRAC_PI_2;
        agent.angle += STEER_GAIN * (target - agent.angle).sin();
        agent.advance(step);
    }
}

/// Pure random walk: bounded uniform heading perturbation, no coupling.
pub fn scatter(agents: &mut [Agent], ctx: &TickCtx, rng: &mut SmallRng) {
    let step = frame_speed(ctx.params, ctx.dt);
    for agent in agents.iter_mut() {
        agent.angle += rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD);
        agent.advance(step);
    }
}

/// Tangent-plus-inward-bias heading around the screen center, producing a
/// slow inward spiral.
pub fn vortex(agents: &mut [Agent], ctx: &TickCtx) {
    let step = frame_speed(ctx.params, ctx.dt);
    for agent in agents.iter_mut() {
        let toward_center = agent.angle_to(WORLD_CENTER_X, WORLD_CENTER_Y);
        let target = toward_center + FRAC_PI_2 - VORTEX_SPIRAL;
        agent.angle += STEER_GAIN * (target - agent.angle).sin();
        agent.advance(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use crate::params::Params;
    use rand::SeedableRng;

    fn ctx(params: &Params) -> TickCtx<'_> {
        TickCtx {
            params,
            dt: 0.1,
            time: 0.0,
        }
    }

    #[test]
    fn flocking_with_one_agent_advances_without_steering() {
        let params = Params::default();
        let mut agents = vec![Agent::new(400.0, 300.0, 0.0, Role::Normal)];
        flocking(&mut agents, &ctx(&params));
        assert_eq!(agents[0].angle, 0.0);
        assert!(agents[0].x > 400.0);
        assert_eq!(agents[0].y, 300.0);
    }

    #[test]
    fn flocking_turns_toward_the_rest_of_the_group() {
        let mut params = Params::default();
        params.swarm_alignment = 0.0;
        // One straggler west of a clump, heading due north. Cohesion should
        // bend its heading toward the clump (east).
        let mut agents = vec![
            Agent::new(100.0, 300.0, FRAC_PI_2, Role::Normal),
            Agent::new(500.0, 300.0, FRAC_PI_2, Role::Normal),
            Agent::new(520.0, 300.0, FRAC_PI_2, Role::Normal),
        ];
        flocking(&mut agents, &ctx(&params));
        // Target angle is 0 (due east), so sin(0 - π/2) = -1 pulls it down.
        assert!(agents[0].angle < FRAC_PI_2);
    }

    #[test]
    fn circle_holds_and_seeks_the_tangent() {
        let params = Params::default();
        // East of center the orbit tangent is due south (-π/2). An agent
        // already on it does not turn.
        let mut on_tangent = vec![Agent::new(500.0, 300.0, -FRAC_PI_2, Role::Normal)];
        circle(&mut on_tangent, &ctx(&params));
        assert!((on_tangent[0].angle + FRAC_PI_2).abs() < 1e-9);

        // An agent heading straight out (east) gets pulled toward it.
        let mut outward = vec![Agent::new(500.0, 300.0, 0.0, Role::Normal)];
        circle(&mut outward, &ctx(&params));
        assert!(outward[0].angle < 0.0);
    }

    #[test]
    fn scatter_keeps_perturbations_bounded() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(99);
        let mut agents: Vec<Agent> = (0..10)
            .map(|i| Agent::new(400.0, 300.0, i as f64, Role::Normal))
            .collect();
        let before = agents.clone();
        scatter(&mut agents, &ctx(&params), &mut rng);
        for (old, new) in before.iter().zip(&agents) {
            assert!((new.angle - old.angle).abs() <= WANDER_SPREAD);
        }
    }
}
