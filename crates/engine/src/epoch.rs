//! Run-of-simulation bookkeeping: the running flag, accumulated simulation
//! time, and pattern-switch accounting. Re-created wholesale on every reset
//! (the selected pattern carries over; it is an operator choice, not run
//! state).

use std::collections::HashMap;

use crate::patterns::Pattern;

#[derive(Debug)]
pub struct Epoch {
    pub running: bool,
    pattern: Pattern,
    /// Accumulated simulation time in seconds. Advances by measured wall
    /// delta on live ticks only; playback does not move it.
    time: f64,
    switches: u64,
    /// Simulation time at which the current pattern became active.
    pattern_since: f64,
    durations: HashMap<Pattern, f64>,
}

impl Epoch {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            running: false,
            pattern,
            time: 0.0,
            switches: 0,
            pattern_since: 0.0,
            durations: HashMap::new(),
        }
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn switches(&self) -> u64 {
        self.switches
    }

    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
    }

    /// Switch the active pattern. Selecting the already-active pattern is a
    /// complete no-op; a real transition banks the outgoing pattern's
    /// elapsed time and bumps the switch counter. Returns whether a
    /// transition happened.
    pub fn set_pattern(&mut self, next: Pattern) -> bool {
        if next == self.pattern {
            return false;
        }
        *self.durations.entry(self.pattern).or_insert(0.0) += self.time - self.pattern_since;
        self.pattern_since = self.time;
        self.pattern = next;
        self.switches += 1;
        true
    }

    /// Cumulative active time for a pattern, including the in-progress span
    /// when it is the current one.
    pub fn duration_of(&self, pattern: Pattern) -> f64 {
        let banked = self.durations.get(&pattern).copied().unwrap_or(0.0);
        if pattern == self.pattern {
            banked + (self.time - self.pattern_since)
        } else {
            banked
        }
    }
}
