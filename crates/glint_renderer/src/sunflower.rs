//! Sunflower (golden-angle spiral) point distribution on the unit disk.
//!
//! Point `k` of `n` sits at angle `2 pi k / phi^2` and at a radius chosen so
//! that equal index ranges cover equal areas. The last `round(alpha sqrt(n))`
//! points are pushed onto the rim, which gives the disk a crisp boundary.
//! Every call is a direct lookup, so sample `k` of a pixel costs the same as
//! sample 0 and no draws are wasted on rejection.

use std::f64::consts::TAU;

use rand::{Rng, RngCore};

/// Golden ratio.
const PHI: f64 = 1.618_033_988_749_895;

/// Point `point_number` (1-based) of `amount_points` spread over the unit
/// disk.
///
/// With `rng`, the index is jittered by up to half a step in either
/// direction so that repeated frames do not reuse the exact same spiral.
pub fn sunflower(
    amount_points: u32,
    alpha: f64,
    point_number: u32,
    rng: Option<&mut dyn RngCore>,
) -> (f64, f64) {
    let n = amount_points as f64;
    let boundary = (alpha * n.sqrt()).round();

    let mut k = point_number as f64;
    if let Some(rng) = rng {
        k += rng.gen_range(-0.5..0.5);
    }

    let r = radius(k, n, boundary);
    let theta = TAU * k / (PHI * PHI);

    (r * theta.cos(), r * theta.sin())
}

/// Radius of (possibly fractional) point `k` with `boundary` rim points.
fn radius(k: f64, n: f64, boundary: f64) -> f64 {
    if k > n - boundary {
        return 1.0;
    }

    let r = (k - 0.5).max(0.0).sqrt() / (n - (boundary + 1.0) / 2.0).sqrt();
    if r.is_finite() {
        r.min(1.0)
    } else {
        0.0
    }
}
