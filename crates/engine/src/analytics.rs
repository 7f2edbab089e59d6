//! Population-level metrics, recomputed wholesale from the agent list once
//! per tick. Derived state only: nothing here feeds back into movement.

use std::collections::VecDeque;

use serde::Serialize;

use crate::agent::{Agent, Role};

/// Pairwise-distance histogram boundaries.
const ZONE_CLOSE: f64 = 50.0;
const ZONE_FAR: f64 = 150.0;
/// How many recent predator↔prey distances are kept.
const DISTANCE_WINDOW: usize = 5;
/// Normalizer for the cohesion index.
const COHESION_SCALE: f64 = 400.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub normal: usize,
    pub predator: usize,
    pub prey: usize,
}

impl RoleCounts {
    pub fn total(&self) -> usize {
        self.normal + self.predator + self.prey
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InteractionZones {
    pub close: usize,
    pub medium: usize,
    pub far: usize,
}

/// The derived snapshot. `cohesion_score` and `alignment_score` are heuristic
/// indices that can go negative; they are reported as computed, not clamped.
#[derive(Clone, Debug, Default)]
pub struct Analytics {
    pub avg_distance: f64,
    pub predator_prey_distances: VecDeque<f64>,
    pub role_counts: RoleCounts,
    pub cohesion_score: f64,
    pub alignment_score: f64,
    pub interaction_zones: InteractionZones,
}

impl Analytics {
    /// One full O(n²) pass over the population. With fewer than two agents
    /// there are no pairs to measure; the previous snapshot is kept.
    pub fn recompute(&mut self, agents: &[Agent]) {
        let n = agents.len();
        if n < 2 {
            return;
        }

        let mut pair_sum = 0.0;
        let mut pairs = 0usize;
        let mut zones = InteractionZones::default();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = agents[i].distance_to(&agents[j]);
                pair_sum += d;
                pairs += 1;
                if d < ZONE_CLOSE {
                    zones.close += 1;
                } else if d <= ZONE_FAR {
                    zones.medium += 1;
                } else {
                    zones.far += 1;
                }
            }
        }
        self.avg_distance = pair_sum / pairs as f64;
        self.interaction_zones = zones;

        let mut counts = RoleCounts::default();
        for agent in agents {
            match agent.role {
                Role::Normal => counts.normal += 1,
                Role::Predator => counts.predator += 1,
                Role::Prey => counts.prey += 1,
            }
        }
        self.role_counts = counts;

        for predator in agents.iter().filter(|a| a.role == Role::Predator) {
            for prey in agents.iter().filter(|a| a.role == Role::Prey) {
                if self.predator_prey_distances.len() == DISTANCE_WINDOW {
                    self.predator_prey_distances.pop_front();
                }
                self.predator_prey_distances
                    .push_back(predator.distance_to(prey));
            }
        }

        let inv_n = 1.0 / n as f64;
        let cx = agents.iter().map(|a| a.x).sum::<f64>() * inv_n;
        let cy = agents.iter().map(|a| a.y).sum::<f64>() * inv_n;
        let mean_spread = agents
            .iter()
            .map(|a| ((a.x - cx).powi(2) + (a.y - cy).powi(2)).sqrt())
            .sum::<f64>()
            * inv_n;
        self.cohesion_score = 100.0 * (1.0 - mean_spread / (n as f64 * COHESION_SCALE));

        let mean_heading = agents.iter().map(|a| a.angle).sum::<f64>() * inv_n;
        let mean_abs_sin = agents
            .iter()
            .map(|a| (a.angle - mean_heading).sin().abs())
            .sum::<f64>()
            * inv_n;
        self.alignment_score = 100.0 * (1.0 - mean_abs_sin);
    }
}
