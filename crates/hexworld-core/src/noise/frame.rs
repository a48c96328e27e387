//! Meridional frame: pole-to-pole land spines alternating with ocean channels.
//!
//! Four bands run the full height of the map, land and ocean in turn around
//! the cylinder. Each band has a core, forced to the extreme of the raw range
//! so rank normalisation puts it deep on its side of sea level, and a soft
//! shoulder that blends into the surrounding noise. Two spines separated by two
//! channels give at least two land masses and at least two ocean basins for
//! every seed.
//!
//! A band's core must stay at least three cells wide in every row, and its
//! centre may drift less than one cell per row, so that neither side can cross
//! it under hex adjacency.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::HeightParams;

/// Raw value of a core cell. Far outside the range of fBm plus blobs.
const CORE: f64 = 1.0e3;
const BANDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Centre in plane units at `y = 0`.
    pub x: f64,
    /// `+1` for a land spine, `-1` for an ocean channel.
    pub sign: f64,
    /// Meander amplitude in plane units.
    pub amplitude: f64,
    /// Meander phase in radians.
    pub phase: f64,
}

impl Band {
    /// Centre of the band at height `y` on a plane `depth` tall.
    pub fn centre(&self, y: f64, depth: f64, cycles: f64) -> f64 {
        self.x + self.amplitude * (TAU * cycles * y / depth.max(1.0) + self.phase).sin()
    }
}

/// Meander cycles from pole to pole.
const MEANDER_CYCLES: f64 = 1.5;

/// Draw the four bands. Even bands are spines, odd bands are channels.
pub fn generate_frame(seed: u64, params: &HeightParams, period: f64) -> Vec<Band> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0xF4A3_E5B1);
    let origin = rng.gen_range(0.0..period);
    let spacing = period / BANDS as f64;
    let jitter = params.frame_jitter.clamp(0.0, 0.1) * period;
    (0..BANDS)
        .map(|k| Band {
            x: (origin + k as f64 * spacing + rng.gen_range(-jitter..=jitter)).rem_euclid(period),
            sign: if k % 2 == 0 { 1.0 } else { -1.0 },
            amplitude: rng.gen_range(0.5..=1.0) * params.frame_meander * period,
            phase: rng.gen_range(0.0..TAU),
        })
        .collect()
}

/// Frame contribution at plane point `(x, y)`. Core cells return `±CORE`.
pub fn frame_value(
    bands: &[Band],
    params: &HeightParams,
    x: f64,
    y: f64,
    period: f64,
    depth: f64,
) -> f64 {
    let core = params.frame_core * period;
    let shoulder = (params.frame_shoulder * period).max(1e-9);
    let mut total = 0.0;
    for b in bands {
        let mut dx = (x - b.centre(y, depth, MEANDER_CYCLES)).rem_euclid(period);
        if dx > period * 0.5 {
            dx = period - dx;
        }
        if dx <= core {
            return b.sign * CORE;
        }
        let t = (dx - core) / shoulder;
        total += b.sign * params.frame_weight as f64 * (-t * t).exp();
    }
    total
}
