//! Frame-stepped swarm simulation engine.
//!
//! Computes, frame by frame, the positions and headings of a population of
//! point agents under one of several interchangeable movement rules, plus
//! live analytics over the population, a record/playback subsystem, and a
//! sandboxed user-supplied rule.
//!
//! Design contract:
//! - Every operation on [`SwarmEngine`] is a discrete `&mut self` call.
//!   The tick loop is the single writer of the population; wrapping the
//!   engine in a mutex held per call gives the full concurrency story.
//! - Positions wrap into the 800x600 world after every tick. Headings are
//!   plain radians and never normalized.
//! - The shapes in [`protocol`] are a compatibility contract with the
//!   rendering client and must not drift.

pub mod agent;
pub mod analytics;
pub mod behavior;
pub mod engine;
pub mod epoch;
pub mod math;
pub mod params;
pub mod patterns;
pub mod protocol;
pub mod recorder;

pub use agent::{Agent, Organization, Role};
pub use engine::SwarmEngine;
pub use params::Params;
pub use patterns::Pattern;
