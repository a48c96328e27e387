//! Seeded Gaussian continent and basin blobs.
//!
//! Blobs give the macro field a few dominant land masses and ocean basins
//! that pure fBm does not guarantee. Distances wrap in X.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::HeightParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    /// Centre in plane units.
    pub x: f64,
    pub y: f64,
    pub sigma: f64,
    /// `+1` for a continent, `-1` for a basin.
    pub sign: f64,
}

/// Draw `params.blob_count` blobs on a plane `period` wide and `depth` tall.
/// Centres avoid the outer 15 % of rows.
pub fn generate_blobs(seed: u64, params: &HeightParams, period: f64, depth: f64) -> Vec<Blob> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0xB10B_5EED);
    let (r_lo, r_hi) = params.blob_radius;
    (0..params.blob_count)
        .map(|_| {
            let x = rng.gen_range(0.0..period);
            let y = rng.gen_range(0.15 * depth..0.85 * depth);
            let sigma = rng.gen_range(r_lo..=r_hi) * period;
            let sign = if rng.gen_bool(params.basin_chance.clamp(0.0, 1.0)) { -1.0 } else { 1.0 };
            Blob { x, y, sigma, sign }
        })
        .collect()
}

/// Summed blob contribution at plane point `(x, y)`.
pub fn blob_value(blobs: &[Blob], x: f64, y: f64, period: f64) -> f64 {
    blobs
        .iter()
        .map(|b| {
            let mut dx = (x - b.x).rem_euclid(period);
            if dx > period * 0.5 {
                dx = period - dx;
            }
            let dy = y - b.y;
            b.sign * (-(dx * dx + dy * dy) / (2.0 * b.sigma * b.sigma)).exp()
        })
        .sum()
}
