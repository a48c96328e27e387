//! Base height synthesis.
//!
//! Pipeline:
//!   1. On the macro grid, sum cylinder fBm, seeded continent/basin blobs and
//!      the meridional frame of land spines and ocean channels.
//!   2. Percentile-rank the sum so exactly `ocean_fraction` of macro cells
//!      fall below sea level, then shape land and sea hypsometry.
//!   3. Resample each active chunk from the macro field (bilinear, X wraps).
//!   4. Despeckle single-cell islands and lakes.

pub mod blobs;
pub mod fbm;
pub mod frame;

use crate::chunk::{ChunkBounds, Window};
use crate::config::{Size, WorldConfig};
use crate::coords::HexCoord;
use crate::heightfield::{HeightField, SEA_LEVEL};
use crate::params::HeightParams;
use crate::seeds::noise_seed;

use blobs::{blob_value, generate_blobs};
use fbm::Fbm;
use frame::{frame_value, generate_frame};

/// Land hypsometry exponent: most land sits low, peaks are rare.
const LAND_SHAPE: f32 = 1.8;
/// Sea hypsometry exponent: shelves are shallow, basins fill the rest.
const SEA_SHAPE: f32 = 0.7;

/// Generate the normalised macro-grid height field.
pub fn synthesize_macro(config: &WorldConfig, params: &HeightParams, seed: u64) -> HeightField {
    let Size { width, height } = config.macro_size;
    let (w, h) = (width as usize, height as usize);
    let period = width as f64;
    let (_, depth) = HexCoord::new(0, height as i32).to_plane();

    let fbm = Fbm::new(noise_seed(seed), params.hurst, params.octaves);
    let blobs = generate_blobs(seed, params, period, depth);
    let bands = generate_frame(seed, params, period);

    let mut raw = Vec::with_capacity(w * h);
    for r in 0..h {
        for q in 0..w {
            let (x, y) = HexCoord::new(q as i32, r as i32).to_plane();
            let n = fbm.sample_cylinder(x, y, period, params.base_cycles);
            let b = blob_value(&blobs, x, y, period);
            let f = frame_value(&bands, params, x, y, period, depth);
            raw.push((params.fbm_weight as f64 * n + params.blob_weight as f64 * b + f) as f32);
        }
    }

    HeightField::from_vec(w, h, rank_normalize(&raw, params.ocean_fraction))
}

/// Map values to `[-1, 1]` by percentile rank. The lowest `ocean_fraction`
/// of cells land in `[-1, 0)`, the rest in `(0, 1]`. Equal values are ranked
/// by index.
pub fn rank_normalize(values: &[f32], ocean_fraction: f32) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let sea = ((ocean_fraction.clamp(0.0, 1.0) as f64 * n as f64).round() as usize).min(n);
    let land = n - sea;
    let mut out = vec![0.0f32; n];
    for (rank, &idx) in order.iter().enumerate() {
        out[idx] = if rank < sea {
            let v = (sea - rank) as f32 / sea as f32;
            -v.powf(SEA_SHAPE)
        } else {
            let u = (rank - sea + 1) as f32 / land as f32;
            u.powf(LAND_SHAPE)
        };
    }
    out
}

/// Resample one active chunk from the macro field, row-major.
pub fn resample_chunk(
    config: &WorldConfig,
    macro_field: &HeightField,
    bounds: ChunkBounds,
) -> Vec<f32> {
    let active = config.active_size();
    let sx = macro_field.width as f64 / active.width as f64;
    let sy = macro_field.height as f64 / active.height as f64;
    bounds
        .coords()
        .map(|c| {
            let fq = (c.q as f64 + 0.5) * sx - 0.5;
            let fr = (c.r as f64 + 0.5) * sy - 0.5;
            macro_field.sample_wrapped(fq, fr)
        })
        .collect()
}

/// One Jacobi pass: a cell whose every neighbour lies on the other side of
/// sea level takes the neighbours' mean. Returns the number of cells changed.
pub fn despeckle(win: &mut Window<f32>) -> usize {
    let src = win.data.clone();
    let mut changed = 0;
    for j in 0..win.height {
        for i in 0..win.width {
            let h = src[j * win.width + i];
            let land = h >= SEA_LEVEL;
            let mut sum = 0.0f32;
            let mut count = 0usize;
            let mut all_opposite = true;
            for dir in 0..6 {
                if let Some((ni, nj)) = win.neighbor(i, j, dir) {
                    let v = src[nj * win.width + ni];
                    if (v >= SEA_LEVEL) == land {
                        all_opposite = false;
                        break;
                    }
                    sum += v;
                    count += 1;
                }
            }
            if all_opposite && count > 0 {
                win.set(i, j, sum / count as f32);
                changed += 1;
            }
        }
    }
    changed
}
