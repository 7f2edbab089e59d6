//! Interpreter for compiled behavior programs.
//!
//! Every expression node costs one unit of the shared per-tick budget, so a
//! pathological program stops with [`BehaviorError::Budget`] instead of
//! stalling the tick loop. All arithmetic is IEEE-total: division by zero
//! and domain errors produce inf/NaN rather than faults.

use rand::Rng;
use rand::rngs::SmallRng;

use super::BehaviorError;
use super::parse::{BinOp, Expr, Func, Program, Stmt};
use crate::agent::Agent;
use crate::math::wrap_signed;
use crate::params::Params;

/// Read-only tick inputs exposed to a program, alongside the agent fields.
pub struct Env<'a> {
    /// Ordinal position of the agent being updated.
    pub index: f64,
    /// Population size.
    pub count: f64,
    pub dt: f64,
    /// Per-frame base travel distance, same derivation as the built-ins.
    pub speed: f64,
    /// Accumulated simulation time.
    pub time: f64,
    pub params: &'a Params,
}

/// Run one program over one agent. Mutates the agent in place; on error the
/// caller is expected to throw the whole scratch population away.
pub fn run(
    program: &Program,
    agent: &mut Agent,
    env: &Env,
    rng: &mut SmallRng,
    budget: &mut u32,
) -> Result<(), BehaviorError> {
    let mut locals: Vec<(&str, f64)> = Vec::new();

    for stmt in &program.stmts {
        match stmt {
            Stmt::Let(name, expr) => {
                let value = eval(expr, agent, env, &locals, rng, budget)?;
                match locals.iter_mut().find(|(n, _)| *n == name.as_str()) {
                    Some(slot) => slot.1 = value,
                    None => locals.push((name.as_str(), value)),
                }
            }
            Stmt::SetX(expr) => agent.x = eval(expr, agent, env, &locals, rng, budget)?,
            Stmt::SetY(expr) => agent.y = eval(expr, agent, env, &locals, rng, budget)?,
            Stmt::SetAngle(expr) => agent.angle = eval(expr, agent, env, &locals, rng, budget)?,
            Stmt::Advance(expr) => {
                let distance = eval(expr, agent, env, &locals, rng, budget)?;
                agent.advance(distance);
            }
        }
    }
    Ok(())
}

fn eval(
    expr: &Expr,
    agent: &Agent,
    env: &Env,
    locals: &[(&str, f64)],
    rng: &mut SmallRng,
    budget: &mut u32,
) -> Result<f64, BehaviorError> {
    if *budget == 0 {
        return Err(BehaviorError::Budget);
    }
    *budget -= 1;

    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Var(name) => lookup(name, agent, env, locals)
            .ok_or_else(|| BehaviorError::UnknownVar(name.clone())),
        Expr::Neg(inner) => Ok(-eval(inner, agent, env, locals, rng, budget)?),
        Expr::Binary { op, lhs, rhs } => {
            let a = eval(lhs, agent, env, locals, rng, budget)?;
            let b = eval(rhs, agent, env, locals, rng, budget)?;
            Ok(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Rem => a % b,
            })
        }
        Expr::Call { func, args } => {
            let mut values = [0.0f64; 3];
            for (slot, arg) in values.iter_mut().zip(args) {
                *slot = eval(arg, agent, env, locals, rng, budget)?;
            }
            Ok(apply(*func, &values, rng))
        }
    }
}

fn apply(func: Func, v: &[f64; 3], rng: &mut SmallRng) -> f64 {
    match func {
        Func::Sin => v[0].sin(),
        Func::Cos => v[0].cos(),
        Func::Tan => v[0].tan(),
        Func::Atan2 => v[0].atan2(v[1]),
        Func::Abs => v[0].abs(),
        Func::Sqrt => v[0].sqrt(),
        Func::Floor => v[0].floor(),
        Func::Min => v[0].min(v[1]),
        Func::Max => v[0].max(v[1]),
        // Manual clamp: std's panics on inverted or NaN bounds.
        Func::Clamp => v[0].max(v[1]).min(v[2]),
        Func::Pow => v[0].powf(v[1]),
        Func::Hypot => v[0].hypot(v[1]),
        Func::Wrap => wrap_signed(v[0]),
        Func::Rand => rng.gen_range(0.0..1.0),
        Func::RandRange => v[0] + (v[1] - v[0]) * rng.gen_range(0.0..1.0),
    }
}

fn lookup(name: &str, agent: &Agent, env: &Env, locals: &[(&str, f64)]) -> Option<f64> {
    if let Some((_, value)) = locals.iter().rev().find(|(n, _)| *n == name) {
        return Some(*value);
    }
    Some(match name {
        "x" => agent.x,
        "y" => agent.y,
        "angle" => agent.angle,
        "index" => env.index,
        "count" => env.count,
        "dt" => env.dt,
        "speed" => env.speed,
        "time" => env.time,
        "agentCount" => env.params.agent_count as f64,
        "agentSpeed" => env.params.agent_speed,
        "swarmCohesion" => env.params.swarm_cohesion,
        "swarmAlignment" => env.params.swarm_alignment,
        "waveFrequency" => env.params.wave_frequency,
        "waveAmplitude" => env.params.wave_amplitude,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use crate::behavior::parse::parse;
    use rand::SeedableRng;

    fn run_on_agent(source: &str, agent: &mut Agent) -> Result<(), BehaviorError> {
        let program = parse(source).unwrap();
        let params = Params::default();
        let env = Env {
            index: 0.0,
            count: 1.0,
            dt: 0.1,
            speed: 2.0,
            time: 0.0,
            params: &params,
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let mut budget = 10_000;
        run(&program, agent, &env, &mut rng, &mut budget)
    }

    #[test]
    fn arithmetic_respects_precedence() {
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        run_on_agent("behavior update x = 1 + 2 * 3 - 4 / 2 end", &mut agent).unwrap();
        assert_eq!(agent.x, 5.0);
    }

    #[test]
    fn statements_apply_sequentially() {
        let mut agent = Agent::new(100.0, 100.0, 1.0, Role::Normal);
        run_on_agent(
            "behavior update angle = 0 advance 10 angle = angle + 1 end",
            &mut agent,
        )
        .unwrap();
        // advance ran with angle already zeroed.
        assert_eq!(agent.x, 110.0);
        assert_eq!(agent.y, 100.0);
        assert_eq!(agent.angle, 1.0);
    }

    #[test]
    fn locals_shadow_and_update() {
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        run_on_agent(
            "behavior update let a = 2 let a = a * 3 x = a end",
            &mut agent,
        )
        .unwrap();
        assert_eq!(agent.x, 6.0);
    }

    #[test]
    fn tick_inputs_are_visible() {
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        run_on_agent("behavior update x = speed y = dt * 10 end", &mut agent).unwrap();
        assert_eq!(agent.x, 2.0);
        assert!((agent.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_identifier_fails_at_run_time() {
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        let err = run_on_agent("behavior update x = velocity end", &mut agent).unwrap_err();
        assert!(matches!(err, BehaviorError::UnknownVar(name) if name == "velocity"));
    }

    #[test]
    fn budget_exhaustion_stops_evaluation() {
        let program = parse("behavior update x = 1 + 2 + 3 + 4 + 5 end").unwrap();
        let params = Params::default();
        let env = Env {
            index: 0.0,
            count: 1.0,
            dt: 0.1,
            speed: 2.0,
            time: 0.0,
            params: &params,
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        let mut budget = 3;
        let err = run(&program, &mut agent, &env, &mut rng, &mut budget).unwrap_err();
        assert!(matches!(err, BehaviorError::Budget));
    }

    #[test]
    fn rand_range_stays_in_bounds() {
        let program = parse("behavior update x = rand_range(5, 6) end").unwrap();
        let params = Params::default();
        let env = Env {
            index: 0.0,
            count: 1.0,
            dt: 0.1,
            speed: 2.0,
            time: 0.0,
            params: &params,
        };
        let mut rng = SmallRng::seed_from_u64(17);
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        for _ in 0..100 {
            let mut budget = 100;
            run(&program, &mut agent, &env, &mut rng, &mut budget).unwrap();
            assert!((5.0..6.0).contains(&agent.x));
        }
    }

    #[test]
    fn division_by_zero_is_not_a_failure() {
        let mut agent = Agent::new(0.0, 0.0, 0.0, Role::Normal);
        run_on_agent("behavior update x = 1 / 0 end", &mut agent).unwrap();
        assert!(agent.x.is_infinite());
    }
}
