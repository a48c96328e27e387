//! Tectonic plates: sites, ownership, boundaries and boundary relief.
//!
//! Pipeline:
//!   sites (macro grid, Lloyd) → plate kinds and motion →
//!   partition (chunked) → boundary classification (chunked, halo 1) →
//!   boundary distance and relief (chunked, halo = corridor).

pub mod boundaries;
pub mod partition;
pub mod relief;
pub mod sites;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::config::WorldConfig;
use crate::coords::HexCoord;
use crate::heightfield::HeightField;
use crate::params::TectonicsParams;

pub use boundaries::{BoundaryCell, BoundaryKind};
pub use relief::{BoundaryInfo, NO_BOUNDARY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateKind {
    Oceanic,
    Continental,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub id: u16,
    /// Site on the active grid.
    pub site: HexCoord,
    pub kind: PlateKind,
    /// Motion in plane units per step.
    pub motion: (f64, f64),
    /// Uniform height offset applied to every cell the plate owns.
    pub bias: f32,
}

/// Place sites and draw every plate's kind, motion and bias.
///
/// Draw order is fixed: sites, Lloyd relaxation, then per plate in id order
/// `u, bias, angle, magnitude`.
pub fn generate_plates(
    config: &WorldConfig,
    params: &TectonicsParams,
    seed: u64,
    base: &HeightField,
) -> Vec<Plate> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = sites::plate_count(config.macro_size, params);
    let mut macro_sites = sites::sample_sites(&mut rng, count, config.macro_size);
    sites::lloyd_relax(&mut macro_sites, config.macro_size, params.lloyd_iterations);

    let mut scores = Vec::with_capacity(count);
    let mut plates: Vec<Plate> = macro_sites
        .iter()
        .enumerate()
        .map(|(id, &m)| {
            let site = sites::scale_to_active(m, config);
            let land01 = ((*base.at(site) as f64 + 1.0) * 0.5).clamp(0.0, 1.0);
            let score = 0.6 * rng.gen::<f64>() + 0.4 * land01;
            scores.push(score);
            let bias = rng.gen_range(0.04f32..=0.10);
            let angle = rng.gen_range(0.0..TAU);
            let magnitude = rng.gen_range(0.3..=1.0);
            let kind = if score >= params.continental_threshold {
                PlateKind::Continental
            } else {
                PlateKind::Oceanic
            };
            Plate {
                id: id as u16,
                site,
                kind,
                motion: (angle.cos() * magnitude, angle.sin() * magnitude),
                bias,
            }
        })
        .collect();

    ensure_both_kinds(&mut plates, &scores);
    for p in &mut plates {
        if p.kind == PlateKind::Oceanic {
            p.bias = -p.bias;
        }
    }
    plates
}

/// Flip the plate with the most extreme score when every plate has the same
/// kind.
fn ensure_both_kinds(plates: &mut [Plate], scores: &[f64]) {
    if plates.len() < 2 {
        return;
    }
    let continental = plates.iter().filter(|p| p.kind == PlateKind::Continental).count();
    let pick = |want_max: bool| {
        let mut best = 0;
        for i in 1..scores.len() {
            let better = if want_max { scores[i] > scores[best] } else { scores[i] < scores[best] };
            if better {
                best = i;
            }
        }
        best
    };
    if continental == 0 {
        plates[pick(true)].kind = PlateKind::Continental;
    } else if continental == plates.len() {
        plates[pick(false)].kind = PlateKind::Oceanic;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;
    use crate::params::ProfileParams;

    fn small() -> WorldConfig {
        WorldConfig {
            dev_size: Size::new(64, 32),
            macro_size: Size::new(64, 32),
            chunk_size: Size::new(16, 16),
            ..WorldConfig::dev()
        }
    }

    #[test]
    fn plates_are_deterministic_and_signed_by_kind() {
        let cfg = small();
        let params = ProfileParams::dev().tectonics;
        let base = HeightField::for_config(&cfg, 0.2);
        let a = generate_plates(&cfg, &params, 17, &base);
        let b = generate_plates(&cfg, &params, 17, &base);
        assert_eq!(a, b);
        assert_eq!(a.len(), params.min_plates);
        for p in &a {
            match p.kind {
                PlateKind::Continental => assert!((0.04..=0.10).contains(&p.bias)),
                PlateKind::Oceanic => assert!((-0.10..=-0.04).contains(&p.bias)),
            }
            let m = (p.motion.0.powi(2) + p.motion.1.powi(2)).sqrt();
            assert!((0.3 - 1e-9..=1.0 + 1e-9).contains(&m));
        }
    }

    #[test]
    fn both_kinds_always_present() {
        let cfg = small();
        let params = ProfileParams::dev().tectonics;
        // All-ocean and all-land bases push every score one way.
        for fill in [-1.0f32, 1.0] {
            let base = HeightField::for_config(&cfg, fill);
            for seed in 0..8 {
                let plates = generate_plates(&cfg, &params, seed, &base);
                assert!(plates.iter().any(|p| p.kind == PlateKind::Continental));
                assert!(plates.iter().any(|p| p.kind == PlateKind::Oceanic));
            }
        }
    }
}
