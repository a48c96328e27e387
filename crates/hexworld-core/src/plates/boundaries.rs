//! Boundary classification from relative plate motion.
//!
//! For a cell with a differently-owned neighbour in direction `i`:
//!   rel = m_self − m_other,  n = rel · dir_i,  t = rel × dir_i
//!   n ≥ threshold  → convergent, strength from |n|
//!   n ≤ −threshold → divergent,  strength from |n|
//!   otherwise      → transform,  strength from |t|
//! The strongest neighbour wins; equal strengths go to the lowest direction.

use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::coords::DIRECTION_VECTORS;
use crate::params::TectonicsParams;

use super::Plate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    None,
    Convergent,
    Divergent,
    Transform,
}

/// Classification of one cell against its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCell {
    pub kind: BoundaryKind,
    pub strength: f32,
    /// Owning plate.
    pub plate: u16,
    /// Plate across the winning boundary; equal to `plate` when `kind` is None.
    pub other: u16,
}

impl BoundaryCell {
    pub fn interior(plate: u16) -> Self {
        Self { kind: BoundaryKind::None, strength: 0.0, plate, other: plate }
    }

    pub fn is_boundary(&self) -> bool {
        self.kind != BoundaryKind::None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryChunk {
    pub cells: Vec<BoundaryCell>,
    /// Cells where two neighbours tied on strength.
    pub ties: u64,
}

/// Classify a single plate pair across direction `dir`.
pub fn classify_pair(
    own: &Plate,
    other: &Plate,
    dir: usize,
    params: &TectonicsParams,
) -> (BoundaryKind, f32) {
    let rel = (own.motion.0 - other.motion.0, own.motion.1 - other.motion.1);
    let (dx, dy) = DIRECTION_VECTORS[dir];
    let normal = rel.0 * dx + rel.1 * dy;
    let tangent = rel.0 * dy - rel.1 * dx;
    let scale = params.strength_scale;
    if normal >= params.normal_threshold {
        (BoundaryKind::Convergent, (normal.abs() / scale).min(1.0) as f32)
    } else if normal <= -params.normal_threshold {
        (BoundaryKind::Divergent, (normal.abs() / scale).min(1.0) as f32)
    } else {
        (BoundaryKind::Transform, (tangent.abs() / scale).min(1.0) as f32)
    }
}

/// Classify the interior cells of a plate-id window (halo ≥ 1).
pub fn classify_chunk(
    ids: &Window<u16>,
    plates: &[Plate],
    params: &TectonicsParams,
) -> BoundaryChunk {
    let mut ties = 0u64;
    let cells = ids
        .interior()
        .map(|(i, j)| {
            let own_id = ids.get(i, j);
            let own = &plates[own_id as usize];
            let mut best = BoundaryCell::interior(own_id);
            let mut tied = false;
            for dir in 0..6 {
                let Some((ni, nj)) = ids.neighbor(i, j, dir) else { continue };
                let other_id = ids.get(ni, nj);
                if other_id == own_id {
                    continue;
                }
                let (kind, strength) = classify_pair(own, &plates[other_id as usize], dir, params);
                if !best.is_boundary() || strength > best.strength {
                    best = BoundaryCell { kind, strength, plate: own_id, other: other_id };
                    tied = false;
                } else if strength == best.strength {
                    tied = true;
                }
            }
            ties += tied as u64;
            best
        })
        .collect();
    BoundaryChunk { cells, ties }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkCoord;
    use crate::config::{Size, WorldConfig};
    use crate::coords::HexCoord;
    use crate::heightfield::Field;
    use crate::params::ProfileParams;
    use crate::plates::PlateKind;
    use approx::assert_abs_diff_eq;

    fn plate(id: u16, motion: (f64, f64)) -> Plate {
        Plate { id, site: HexCoord::new(0, 0), kind: PlateKind::Continental, motion, bias: 0.0 }
    }

    #[test]
    fn head_on_motion_is_convergent() {
        let p = ProfileParams::dev().tectonics;
        // Own plate moves east into a plate moving west; neighbour lies east.
        let (kind, s) = classify_pair(&plate(0, (0.6, 0.0)), &plate(1, (-0.6, 0.0)), 0, &p);
        assert_eq!(kind, BoundaryKind::Convergent);
        assert_abs_diff_eq!(s, 0.8, epsilon = 1e-6);
        // Seen from the other side it is the same boundary.
        let (kind, s2) = classify_pair(&plate(1, (-0.6, 0.0)), &plate(0, (0.6, 0.0)), 3, &p);
        assert_eq!(kind, BoundaryKind::Convergent);
        assert_abs_diff_eq!(s, s2, epsilon = 1e-6);
    }

    #[test]
    fn separating_and_sliding_motion() {
        let p = ProfileParams::dev().tectonics;
        let (kind, _) = classify_pair(&plate(0, (-0.5, 0.0)), &plate(1, (0.5, 0.0)), 0, &p);
        assert_eq!(kind, BoundaryKind::Divergent);
        let (kind, s) = classify_pair(&plate(0, (0.0, 0.9)), &plate(1, (0.0, -0.9)), 0, &p);
        assert_eq!(kind, BoundaryKind::Transform);
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-6);
        // Strength saturates at 1.
        let (_, s) = classify_pair(&plate(0, (5.0, 0.0)), &plate(1, (-5.0, 0.0)), 0, &p);
        assert_abs_diff_eq!(s, 1.0);
    }

    #[test]
    fn only_cells_touching_another_plate_are_boundaries() {
        let cfg = WorldConfig {
            dev_size: Size::new(16, 8),
            macro_size: Size::new(16, 8),
            chunk_size: Size::new(8, 8),
            ..WorldConfig::dev()
        };
        // Plate 0 owns q < 8, plate 1 owns q >= 8.
        let halves = (0..128).map(|i| if i % 16 < 8 { 0u16 } else { 1 }).collect();
        let ids = Field::from_vec(16, 8, halves);
        let plates = vec![plate(0, (0.6, 0.0)), plate(1, (-0.6, 0.0))];
        let params = ProfileParams::dev().tectonics;
        let bounds = cfg.chunk_bounds(ChunkCoord::new(0, 0));
        let win = Window::gather(&cfg, &ids, bounds, 1);
        let out = classify_chunk(&win, &plates, &params);
        for (k, cell) in out.cells.iter().enumerate() {
            let q = k % 8;
            if q == 7 {
                assert_eq!(cell.kind, BoundaryKind::Convergent, "cell {k}");
                assert_eq!(cell.other, 1);
            } else if q == 0 {
                // Across the seam plate 1 sits west of q = 0 moving away.
                assert_eq!(cell.kind, BoundaryKind::Divergent, "cell {k}");
            } else {
                assert!(!cell.is_boundary(), "cell {k}");
            }
        }
    }
}
