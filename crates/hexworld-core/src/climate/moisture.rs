//! Moisture sources: ocean proximity and prevailing-wind advection.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::heightfield::SEA_LEVEL;
use crate::params::ClimateParams;

const BAND_SALT: u64 = 0x57_1D_BA_4D;

/// One prevailing-wind band. `upwind` is the column step toward where the air
/// comes from: +1 for easterlies, −1 for westerlies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindBand {
    pub upwind: i32,
    pub strength: f32,
}

/// Trade easterlies, mid-latitude westerlies and polar easterlies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindBands {
    /// Normalised latitudes separating the three bands.
    pub edges: [f64; 2],
    pub bands: [WindBand; 3],
}

impl WindBands {
    pub fn draw(seed: u64, params: &ClimateParams) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ BAND_SALT);
        let j = params.band_jitter.abs();
        let jitter = |rng: &mut StdRng| if j > 0.0 { rng.gen_range(-j..=j) } else { 0.0 };
        let edges = [1.0 / 3.0 + jitter(&mut rng), 2.0 / 3.0 + jitter(&mut rng)];
        let mut band = |upwind: i32| WindBand { upwind, strength: rng.gen_range(0.8f32..=1.2) };
        let bands = [band(1), band(-1), band(1)];
        Self { edges, bands }
    }

    pub fn at(&self, lat: f64) -> WindBand {
        if lat < self.edges[0] {
            self.bands[0]
        } else if lat < self.edges[1] {
            self.bands[1]
        } else {
            self.bands[2]
        }
    }
}

/// Hex distance from every window cell to the nearest ocean cell, or `None`
/// beyond `cap`. Multi-source BFS inside the window; exact for interior
/// cells when the halo is at least `cap`.
pub fn ocean_distance(height: &Window<f32>, cap: u32) -> Vec<Option<u32>> {
    let w = height.width;
    let mut dist: Vec<Option<u32>> = vec![None; height.data.len()];
    let mut queue = VecDeque::new();
    for (k, &h) in height.data.iter().enumerate() {
        if h < SEA_LEVEL {
            dist[k] = Some(0);
            queue.push_back((k % w, k / w));
        }
    }
    while let Some((i, j)) = queue.pop_front() {
        let Some(d) = dist[j * w + i] else { continue };
        if d >= cap {
            continue;
        }
        for dir in 0..6 {
            if let Some((ni, nj)) = height.neighbor(i, j, dir) {
                let slot = &mut dist[nj * w + ni];
                if slot.is_none() {
                    *slot = Some(d + 1);
                    queue.push_back((ni, nj));
                }
            }
        }
    }
    dist
}

/// `exp(−d / decay)`, zero beyond the search cap.
pub fn proximity(distance: Option<u32>, decay: f64) -> f32 {
    match distance {
        Some(d) if decay > 0.0 => (-(d as f64) / decay).exp() as f32,
        Some(0) => 1.0,
        _ => 0.0,
    }
}

/// Weighted share of ocean among the `fetch` cells upwind of `(i, j)`,
/// nearer cells weighing more, scaled by band strength and capped at 1.
pub fn advected(height: &Window<f32>, i: usize, j: usize, band: WindBand, fetch: u32) -> f32 {
    let mut wet = 0.0f32;
    let mut total = 0.0f32;
    for k in 1..=fetch {
        let ni = i as i64 + band.upwind as i64 * k as i64;
        if ni < 0 || ni >= height.width as i64 {
            break;
        }
        let weight = 1.0 - k as f32 / (fetch + 1) as f32;
        total += weight;
        if height.get(ni as usize, j) < SEA_LEVEL {
            wet += weight;
        }
    }
    if total == 0.0 {
        return 0.0;
    }
    (wet / total * band.strength).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkCoord;
    use crate::config::{Size, WorldConfig};
    use crate::heightfield::HeightField;
    use crate::params::ProfileParams;
    use approx::assert_abs_diff_eq;

    fn cfg() -> WorldConfig {
        WorldConfig {
            dev_size: Size::new(32, 16),
            macro_size: Size::new(32, 16),
            chunk_size: Size::new(8, 8),
            ..WorldConfig::dev()
        }
    }

    /// Ocean for q < 4, land elsewhere.
    fn west_coast(cfg: &WorldConfig) -> HeightField {
        let mut f = HeightField::for_config(cfg, 0.2);
        for r in 0..cfg.height() as usize {
            for q in 0..4 {
                f.set(q, r, -0.4);
            }
        }
        f
    }

    #[test]
    fn bands_are_deterministic_and_ordered() {
        let p = ProfileParams::dev().climate;
        let a = WindBands::draw(5, &p);
        assert_eq!(a, WindBands::draw(5, &p));
        assert!(a.edges[0] < a.edges[1]);
        assert_eq!(a.at(0.0).upwind, 1);
        assert_eq!(a.at(0.5).upwind, -1);
        assert_eq!(a.at(1.0).upwind, 1);
        for b in a.bands {
            assert!((0.8..=1.2).contains(&b.strength));
        }
    }

    #[test]
    fn distance_grows_away_from_the_coast() {
        let cfg = cfg();
        let f = west_coast(&cfg);
        let win = Window::gather(&cfg, &f, cfg.chunk_bounds(ChunkCoord::new(0, 1)), 12);
        let dist = ocean_distance(&win, 12);
        let at = |q: i32| {
            let (i, j) = win.interior().find(|&(i, j)| win.coord(i, j).q == q).unwrap();
            dist[j * win.width + i]
        };
        assert_eq!(at(2), Some(0));
        assert_eq!(at(4), Some(1));
        assert_eq!(at(7), Some(4));
    }

    #[test]
    fn distance_is_capped() {
        let cfg = cfg();
        let f = west_coast(&cfg);
        let win = Window::gather(&cfg, &f, cfg.chunk_bounds(ChunkCoord::new(2, 0)), 3);
        let dist = ocean_distance(&win, 3);
        // Chunk 2 spans q 16..24, far beyond three cells from any ocean.
        for (i, j) in win.interior() {
            assert_eq!(dist[j * win.width + i], None);
        }
        assert_abs_diff_eq!(proximity(None, 12.0), 0.0);
        assert_abs_diff_eq!(proximity(Some(0), 12.0), 1.0);
        assert!(proximity(Some(2), 12.0) > proximity(Some(5), 12.0));
    }

    #[test]
    fn westerlies_carry_ocean_air_inland() {
        let cfg = cfg();
        let f = west_coast(&cfg);
        let win = Window::gather(&cfg, &f, cfg.chunk_bounds(ChunkCoord::new(0, 1)), 8);
        let (i, j) = win.interior().find(|&(i, j)| win.coord(i, j).q == 5).unwrap();
        let west = WindBand { upwind: -1, strength: 1.0 };
        let east = WindBand { upwind: 1, strength: 1.0 };
        assert!(advected(&win, i, j, west, 8) > 0.5);
        assert_abs_diff_eq!(advected(&win, i, j, east, 4), 0.0);
    }
}
