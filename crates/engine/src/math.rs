//! Angle arithmetic shared by the movement rules.

use std::f64::consts::{PI, TAU};

/// Wrap an angle difference into `(-π, π]`.
///
/// Stored headings are never normalized (they grow without bound and only
/// ever feed `sin`/`cos`); this is for *differences*, where the sign tells
/// a steering rule which way to turn. Non-finite input collapses to 0.
pub fn wrap_signed(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}
