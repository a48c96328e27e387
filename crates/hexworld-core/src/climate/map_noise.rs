//! Correlated low-frequency moisture perturbation.
//!
//! Three-octave fBm at ≈3 cycles around the planet, sampled on the cylinder
//! so the field is seamless across the X wrap.

use crate::config::WorldConfig;
use crate::coords::HexCoord;
use crate::noise::fbm::Fbm;
use crate::seeds::noise_seed;

const OCTAVES: u32 = 3;
/// H = 1 gives gain 0.5 at lacunarity 2.
const HURST: f32 = 1.0;
const CYCLES: f64 = 3.0;
const SALT: u64 = 0xC1_1A_1E_00;

pub struct MoistureNoise {
    fbm: Fbm,
    period: f64,
}

impl MoistureNoise {
    pub fn new(config: &WorldConfig, seed: u64) -> Self {
        Self {
            fbm: Fbm::new(noise_seed(seed ^ SALT), HURST, OCTAVES),
            period: config.width() as f64,
        }
    }

    /// Perturbation in `[-1, 1]` at canonical coordinate `c`.
    pub fn sample(&self, c: HexCoord) -> f32 {
        let (x, y) = c.to_plane();
        self.fbm.sample_cylinder(x, y, self.period, CYCLES).clamp(-1.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;
    use approx::assert_abs_diff_eq;

    fn cfg() -> WorldConfig {
        WorldConfig {
            dev_size: Size::new(64, 32),
            macro_size: Size::new(64, 32),
            ..WorldConfig::dev()
        }
    }

    #[test]
    fn noise_is_bounded_and_varies() {
        let cfg = cfg();
        let n = MoistureNoise::new(&cfg, 9);
        let vals: Vec<f32> = (0..cfg.cell_count()).map(|k| n.sample(cfg.coord_of(k))).collect();
        assert!(vals.iter().all(|v| (-1.0..=1.0).contains(v)));
        let min = vals.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = vals.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max - min > 1e-3);
    }

    #[test]
    fn noise_is_periodic_across_the_seam() {
        let cfg = cfg();
        let n = MoistureNoise::new(&cfg, 9);
        let w = cfg.width() as i32;
        for r in 0..cfg.height() as i32 {
            let (east, west) = (n.sample(HexCoord::new(w, r)), n.sample(HexCoord::new(0, r)));
            assert_abs_diff_eq!(east, west, epsilon = 1e-5);
        }
    }

    #[test]
    fn seeds_differ() {
        let cfg = cfg();
        let a = MoistureNoise::new(&cfg, 1);
        let b = MoistureNoise::new(&cfg, 2);
        let c = HexCoord::new(10, 10);
        assert_abs_diff_eq!(a.sample(c), MoistureNoise::new(&cfg, 1).sample(c));
        let differs = (0..cfg.cell_count()).any(|k| {
            let c = cfg.coord_of(k);
            (a.sample(c) - b.sample(c)).abs() > 1e-4
        });
        assert!(differs);
    }
}
