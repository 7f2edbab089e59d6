//! User-supplied movement rules, as a closed expression DSL.
//!
//! Untrusted source never touches host-language execution: it is parsed into
//! a small AST and interpreted with a per-tick operation budget. The surface
//! is arithmetic, a fixed function table, per-agent fields, and the tick
//! inputs. There are no loops, no I/O, and nothing to escape into.
//!
//! The program shape is one entry block:
//!
//! ```text
//! behavior update
//!     let home = atan2(300 - y, 400 - x)
//!     angle = angle + 0.2 * sin(home - angle)
//!     advance speed
//! end
//! ```
//!
//! Statements run top to bottom for each agent in turn; `x`, `y` and `angle`
//! are the only assignable fields, and `advance d` translates along the
//! current heading. `#` starts a comment.
//!
//! Validation happens in two layers. A substring denylist rejects source
//! that smells like host-language injection (deliberately coarse: any
//! occurrence counts, even inside a comment). Then the parser requires a
//! well-formed `behavior update … end` block. Name resolution is deferred
//! to run time: a typo'd identifier passes `test` but makes the tick a
//! logged no-op.

pub mod eval;
pub mod parse;

use thiserror::Error;

pub use eval::{Env, run};
pub use parse::Program;

/// Substrings that fail validation outright.
pub const FORBIDDEN_TOKENS: &[&str] = &["import", "eval", "exec", "__"];

/// Interpreter operations allowed per tick across the whole population.
pub const OP_BUDGET: u32 = 10_000;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("forbidden token `{0}`")]
    Forbidden(&'static str),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("unknown identifier `{0}`")]
    UnknownVar(String),
    #[error("operation budget exhausted")]
    Budget,
}

/// Check a source text against the denylist, then compile it.
pub fn validate(source: &str) -> Result<Program, BehaviorError> {
    for &token in FORBIDDEN_TOKENS {
        if source.contains(token) {
            tracing::warn!("Rejected behavior source containing `{}`", token);
            return Err(BehaviorError::Forbidden(token));
        }
    }
    parse::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denylist_rejects_each_token_anywhere() {
        for source in [
            "import os\nbehavior update end",
            "behavior update end # eval",
            "behavior update let exec_now = 1 end",
            "behavior update let a__b = 1 end",
        ] {
            assert!(matches!(
                validate(source),
                Err(BehaviorError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn minimal_entry_block_is_accepted() {
        assert!(validate("behavior update end").is_ok());
    }

    #[test]
    fn missing_entry_block_is_rejected() {
        assert!(matches!(
            validate("let a = 1"),
            Err(BehaviorError::Syntax { .. })
        ));
    }
}
