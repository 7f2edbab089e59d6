//! Role-driven rules: predator/prey chase-flee and emergent collective action.

use rand::Rng;
use rand::rngs::SmallRng;

use super::{PatternState, STEER_GAIN, TickCtx, WANDER_SPREAD, frame_speed};
use crate::agent::{Agent, Organization, Role};
use crate::math::wrap_signed;

/// Prey only react to a predator inside this range.
const PURSUIT_RANGE: f64 = 200.0;
/// Speed multipliers while chasing / fleeing.
const PREDATOR_BOOST: f64 = 1.2;
const PREY_BOOST: f64 = 1.1;

/// Prey fraction of the population that triggers organization.
pub const ORGANIZATION_THRESHOLD: f64 = 0.15;
/// A normal agent this close to an organized prey is recruited.
pub const CONVERSION_RADIUS: f64 = 30.0;
/// Predators this close to the formation center run.
pub const FLEE_DISTANCE: f64 = 150.0;

/// Spacing between arrow formation slots.
const FORMATION_SPACING: f64 = 25.0;
/// Direct proportional steering gain used inside the formation.
const FORMATION_STEER: f64 = 0.3;
/// Exponential drift rate of the formation center toward the predators, 1/s.
const FORMATION_DRIFT: f64 = 0.5;
/// Predators flee the formation at this multiple of base speed.
const FLEE_BOOST: f64 = 1.5;

/// Predators chase their nearest prey at 1.2×; prey flee a predator inside
/// [`PURSUIT_RANGE`] at 1.1×, otherwise keep moving; normals drift.
/// Targets are taken from the pre-tick population.
pub fn predator_prey(agents: &mut [Agent], ctx: &TickCtx, rng: &mut SmallRng) {
    let step = frame_speed(ctx.params, ctx.dt);
    let before: Vec<Agent> = agents.to_vec();

    for agent in agents.iter_mut() {
        match agent.role {
            Role::Predator => {
                match nearest_with_role(&before, agent, Role::Prey) {
                    Some(prey) => {
                        let target = agent.angle_to(prey.x, prey.y);
                        agent.angle += STEER_GAIN * (target - agent.angle).sin();
                    }
                    None => agent.angle += rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD),
                }
                agent.advance(step * PREDATOR_BOOST);
            }
            Role::Prey => match nearest_with_role(&before, agent, Role::Predator) {
                Some(threat) if agent.distance_to(threat) < PURSUIT_RANGE => {
                    let away = (agent.y - threat.y).atan2(agent.x - threat.x);
                    agent.angle += STEER_GAIN * (away - agent.angle).sin();
                    agent.advance(step * PREY_BOOST);
                }
                _ => agent.advance(step),
            },
            Role::Normal => {
                agent.angle += rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD);
                agent.advance(step);
            }
        }
    }
}

/// Two-phase emergent rule.
///
/// Below the prey quorum everyone wanders (predators at 1.2×). At or above
/// it, prey form an arrow around a center that drifts toward the predators'
/// centroid, nearby normals are permanently recruited as prey, and predators
/// caught within [`FLEE_DISTANCE`] of the center bolt at 1.5×. Recruitment
/// only ever raises the prey count, so organization is irreversible within
/// an epoch.
pub fn collective_action(
    agents: &mut [Agent],
    ctx: &TickCtx,
    state: &mut PatternState,
    rng: &mut SmallRng,
) {
    let step = frame_speed(ctx.params, ctx.dt);
    let prey_count = agents.iter().filter(|a| a.role == Role::Prey).count();
    let quorum = agents.len() as f64 * ORGANIZATION_THRESHOLD;

    if (prey_count as f64) < quorum {
        for agent in agents.iter_mut() {
            agent.angle += rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD);
            let boost = if agent.role == Role::Predator {
                PREDATOR_BOOST
            } else {
                1.0
            };
            agent.advance(step * boost);
        }
        return;
    }

    let before: Vec<Agent> = agents.to_vec();
    let predator_centroid = centroid(&before, Role::Predator);

    if let Some((px, py)) = predator_centroid {
        let (fx, fy) = state.formation_center;
        let k = (FORMATION_DRIFT * ctx.dt).min(1.0);
        state.formation_center = (fx + (px - fx) * k, fy + (py - fy) * k);
    }
    let (fx, fy) = state.formation_center;
    // The arrow tip faces the predators; with none to face, point east.
    let facing = match predator_centroid {
        Some((px, py)) => (py - fy).atan2(px - fx),
        None => 0.0,
    };

    let mut slot = 0usize;
    for agent in agents.iter_mut() {
        match agent.role {
            Role::Prey => {
                agent.state = Organization::Organized;
                let (tx, ty) = arrow_slot(fx, fy, facing, slot);
                slot += 1;
                let delta = wrap_signed(agent.angle_to(tx, ty) - agent.angle);
                agent.angle += delta * FORMATION_STEER;
                agent.advance(step);
            }
            Role::Predator => {
                let from_center = ((agent.x - fx).powi(2) + (agent.y - fy).powi(2)).sqrt();
                if from_center < FLEE_DISTANCE {
                    let away = (agent.y - fy).atan2(agent.x - fx);
                    agent.angle += STEER_GAIN * (away - agent.angle).sin();
                    agent.advance(step * FLEE_BOOST);
                } else {
                    agent.angle += rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD);
                    agent.advance(step);
                }
            }
            Role::Normal => {
                agent.angle += rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD);
                agent.advance(step);
            }
        }
    }

    // Recruitment, judged on pre-tick proximity. Converts this frame but
    // the recruit moves in formation starting next frame.
    for (i, old) in before.iter().enumerate() {
        if old.role != Role::Normal {
            continue;
        }
        let near_organized = before
            .iter()
            .filter(|a| a.role == Role::Prey)
            .any(|prey| old.distance_to(prey) < CONVERSION_RADIUS);
        if near_organized {
            agents[i].role = Role::Prey;
            agents[i].state = Organization::Organized;
        }
    }
}

fn nearest_with_role<'a>(agents: &'a [Agent], from: &Agent, role: Role) -> Option<&'a Agent> {
    agents
        .iter()
        .filter(|a| a.role == role)
        .min_by(|a, b| dist2(from, a).total_cmp(&dist2(from, b)))
}

fn dist2(a: &Agent, b: &Agent) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

fn centroid(agents: &[Agent], role: Role) -> Option<(f64, f64)> {
    let mut x = 0.0;
    let mut y = 0.0;
    let mut count = 0usize;
    for agent in agents.iter().filter(|a| a.role == role) {
        x += agent.x;
        y += agent.y;
        count += 1;
    }
    (count > 0).then(|| (x / count as f64, y / count as f64))
}

/// Arrow layout: slot 0 is the tip at the formation center, later slots
/// trail behind it on alternating wings.
fn arrow_slot(fx: f64, fy: f64, facing: f64, slot: usize) -> (f64, f64) {
    let rank = slot.div_ceil(2) as f64;
    let side = if slot % 2 == 1 { 1.0 } else { -1.0 };
    let back = -rank * FORMATION_SPACING;
    let across = side * rank * FORMATION_SPACING * 0.6;
    let (sin, cos) = facing.sin_cos();
    (fx + back * cos - across * sin, fy + back * sin + across * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn prey_outside_pursuit_range_keeps_its_heading() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut agents = vec![
            Agent::new(100.0, 100.0, 0.0, Role::Predator),
            Agent::new(700.0, 500.0, 1.0, Role::Prey),
        ];
        predator_prey(&mut agents, &ctx(&params), &mut rng);
        assert_eq!(agents[1].angle, 1.0);
    }

    #[test]
    fn predator_turns_toward_nearest_prey() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(3);
        // Predator heading north; nearest prey due east.
        let mut agents = vec![
            Agent::new(200.0, 300.0, std::f64::consts::FRAC_PI_2, Role::Predator),
            Agent::new(400.0, 300.0, 0.0, Role::Prey),
            Agent::new(700.0, 300.0, 0.0, Role::Prey),
        ];
        let old = wrap_signed(0.0 - agents[0].angle).abs();
        predator_prey(&mut agents, &ctx(&params), &mut rng);
        let new = wrap_signed(0.0 - agents[0].angle).abs();
        assert!(new < old);
    }

    #[test]
    fn unorganized_population_just_wanders() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut state = PatternState::new();
        // One prey out of twenty is below the 15% quorum.
        let mut agents = vec![Agent::new(400.0, 300.0, 0.0, Role::Prey)];
        for _ in 0..19 {
            agents.push(Agent::new(200.0, 200.0, 0.0, Role::Normal));
        }
        collective_action(&mut agents, &ctx(&params), &mut state, &mut rng);
        assert!(agents.iter().all(|a| a.state == Organization::Normal));
    }

    #[test]
    fn quorum_marks_prey_and_recruits_neighbors() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut state = PatternState::new();
        let mut agents = vec![
            Agent::new(300.0, 300.0, 0.0, Role::Prey),
            Agent::new(320.0, 300.0, 0.0, Role::Prey),
            Agent::new(340.0, 300.0, 0.0, Role::Prey),
            // Within CONVERSION_RADIUS of the last prey.
            Agent::new(350.0, 300.0, 0.0, Role::Normal),
            // Far away; stays normal.
            Agent::new(700.0, 500.0, 0.0, Role::Normal),
            Agent::new(100.0, 100.0, 0.0, Role::Predator),
            Agent::new(120.0, 100.0, 0.0, Role::Predator),
        ];
        collective_action(&mut agents, &ctx(&params), &mut state, &mut rng);
        assert_eq!(agents[3].role, Role::Prey);
        assert_eq!(agents[3].state, Organization::Organized);
        assert_eq!(agents[4].role, Role::Normal);
        assert!(
            agents
                .iter()
                .filter(|a| a.role == Role::Prey)
                .all(|a| a.state == Organization::Organized)
        );
    }

    #[test]
    fn formation_center_drifts_toward_predators() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut state = PatternState::new();
        let mut agents = vec![
            Agent::new(300.0, 300.0, 0.0, Role::Prey),
            Agent::new(320.0, 300.0, 0.0, Role::Prey),
            Agent::new(340.0, 300.0, 0.0, Role::Prey),
            Agent::new(700.0, 500.0, 0.0, Role::Predator),
            Agent::new(700.0, 520.0, 0.0, Role::Predator),
        ];
        let before = state.formation_center;
        collective_action(&mut agents, &ctx(&params), &mut state, &mut rng);
        let after = state.formation_center;
        // Centroid (700, 510) is right and below the screen center.
        assert!(after.0 > before.0);
        assert!(after.1 > before.1);
    }
}
