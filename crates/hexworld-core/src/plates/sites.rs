//! Plate site placement on the macro grid.
//!
//! Sites are drawn uniformly, relaxed with a few Lloyd iterations so plates
//! come out roughly equal in area, then scaled to the active grid.

use std::collections::HashSet;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{Size, WorldConfig};
use crate::coords::{wrapped_axial_distance, HexCoord};
use crate::params::TectonicsParams;

/// `clamp(macro_cells / macro_cells_per_plate, min, max)`.
pub fn plate_count(macro_size: Size, params: &TectonicsParams) -> usize {
    let raw = macro_size.cells() / params.macro_cells_per_plate.max(1);
    raw.clamp(params.min_plates, params.max_plates)
}

/// `count` distinct macro cells, in draw order.
pub fn sample_sites(rng: &mut StdRng, count: usize, macro_size: Size) -> Vec<HexCoord> {
    let count = count.min(macro_size.cells());
    let mut taken = HashSet::with_capacity(count);
    let mut sites = Vec::with_capacity(count);
    while sites.len() < count {
        let c = HexCoord::new(
            rng.gen_range(0..macro_size.width as i32),
            rng.gen_range(0..macro_size.height as i32),
        );
        if taken.insert(c) {
            sites.push(c);
        }
    }
    sites
}

/// Index of the nearest site; equal distances go to the lowest index.
/// The second value is true when a tie was broken.
pub fn nearest_site(c: HexCoord, sites: &[HexCoord], width: i32) -> (usize, bool) {
    let mut best = 0usize;
    let mut best_d = u32::MAX;
    let mut tie = false;
    for (i, &s) in sites.iter().enumerate() {
        let d = wrapped_axial_distance(c, s, width);
        if d < best_d {
            best = i;
            best_d = d;
            tie = false;
        } else if d == best_d {
            tie = true;
        }
    }
    (best, tie)
}

/// Lloyd relaxation on the macro grid. Centroids use a circular mean in q so
/// cells on both sides of the seam pull a site the short way round.
pub fn lloyd_relax(sites: &mut [HexCoord], macro_size: Size, iterations: u32) {
    let w = macro_size.width as i32;
    let h = macro_size.height as i32;
    for _ in 0..iterations {
        let mut acc = vec![(0.0f64, 0.0f64, 0.0f64, 0usize); sites.len()];
        for r in 0..h {
            for q in 0..w {
                let (i, _) = nearest_site(HexCoord::new(q, r), sites, w);
                let theta = TAU * q as f64 / w as f64;
                let a = &mut acc[i];
                a.0 += theta.cos();
                a.1 += theta.sin();
                a.2 += r as f64;
                a.3 += 1;
            }
        }

        let mut taken: HashSet<HexCoord> = HashSet::with_capacity(sites.len());
        for (site, &(cx, sy, sr, n)) in sites.iter_mut().zip(&acc) {
            if n == 0 {
                continue;
            }
            let theta = sy.atan2(cx).rem_euclid(TAU);
            let q = ((theta / TAU * w as f64).round() as i32).rem_euclid(w);
            let r = ((sr / n as f64).round() as i32).clamp(0, h - 1);
            let mut moved = HexCoord::new(q, r);
            if taken.contains(&moved) {
                moved = *site;
            }
            // Step row-major until free; only hit when two centroids coincide.
            while taken.contains(&moved) {
                let next = moved.q + 1;
                moved = if next < w {
                    HexCoord::new(next, moved.r)
                } else {
                    HexCoord::new(0, (moved.r + 1) % h)
                };
            }
            taken.insert(moved);
            *site = moved;
        }
    }
}

/// Map a macro cell to the active grid.
pub fn scale_to_active(c: HexCoord, config: &WorldConfig) -> HexCoord {
    let active = config.active_size();
    let sx = config.macro_scale();
    let sy = active.height as f64 / config.macro_size.height as f64;
    let q = ((c.q as f64 + 0.5) * sx - 0.5).round() as i32;
    let r = ((c.r as f64 + 0.5) * sy - 0.5).round() as i32;
    HexCoord::new(config.wrap_q(q), r.clamp(0, active.height as i32 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn plate_count_follows_macro_area() {
        let p = crate::params::ProfileParams::dev().tectonics;
        assert_eq!(plate_count(Size::new(500, 250), &p), 30);
        assert_eq!(plate_count(Size::new(32, 16), &p), 12);
        assert_eq!(plate_count(Size::new(4000, 2000), &p), 96);
    }

    #[test]
    fn sampled_sites_are_distinct() {
        let mut rng = StdRng::seed_from_u64(1);
        let sites = sample_sites(&mut rng, 40, Size::new(16, 8));
        let set: HashSet<_> = sites.iter().collect();
        assert_eq!(set.len(), 40);
        assert!(sites.iter().all(|s| (0..16).contains(&s.q) && (0..8).contains(&s.r)));
    }

    #[test]
    fn nearest_site_prefers_lowest_index_on_ties() {
        let sites = [HexCoord::new(0, 2), HexCoord::new(4, 2)];
        let (i, tie) = nearest_site(HexCoord::new(2, 2), &sites, 32);
        assert_eq!((i, tie), (0, true));
        let (i, tie) = nearest_site(HexCoord::new(3, 2), &sites, 32);
        assert_eq!((i, tie), (1, false));
    }

    #[test]
    fn lloyd_keeps_sites_distinct_and_in_bounds() {
        let size = Size::new(40, 20);
        let mut rng = StdRng::seed_from_u64(9);
        let mut sites = sample_sites(&mut rng, 12, size);
        lloyd_relax(&mut sites, size, 3);
        let set: HashSet<_> = sites.iter().collect();
        assert_eq!(set.len(), 12);
        assert!(sites.iter().all(|s| (0..40).contains(&s.q) && (0..20).contains(&s.r)));
    }

    #[test]
    fn scaling_maps_corners_inside_the_active_grid() {
        let cfg = WorldConfig::dev();
        let s = scale_to_active(HexCoord::new(499, 249), &cfg);
        assert!(s.q < 512 && s.r < 256);
        assert_eq!(scale_to_active(HexCoord::new(0, 0), &cfg), HexCoord::new(0, 0));
    }
}
