//! Axial hex coordinates (pointy-top) and direction tables.
//! Canonicalisation against world bounds lives in `config`.

use serde::{Deserialize, Serialize};

/// Axial neighbour offsets. The index into this table is the neighbour
/// priority used by every tie-breaking rule in the pipeline.
pub const AXIAL_DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

const SQRT3_2: f64 = 0.866_025_403_784_438_6;

/// Unit vectors of `AXIAL_DIRECTIONS` in plane space (x east, y toward +r).
pub const DIRECTION_VECTORS: [(f64, f64); 6] = [
    (1.0, 0.0),
    (0.5, -SQRT3_2),
    (-0.5, -SQRT3_2),
    (-1.0, 0.0),
    (-0.5, SQRT3_2),
    (0.5, SQRT3_2),
];

/// A hex cell in axial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Neighbour in direction `dir` (0..6), not canonicalised.
    #[inline]
    pub fn offset(self, dir: usize) -> Self {
        let (dq, dr) = AXIAL_DIRECTIONS[dir];
        Self { q: self.q + dq, r: self.r + dr }
    }

    /// Centre of the cell in plane units (one hex step = 1.0).
    #[inline]
    pub fn to_plane(self) -> (f64, f64) {
        (self.q as f64 + self.r as f64 * 0.5, self.r as f64 * SQRT3_2)
    }
}

/// Hex distance between two axial coordinates, ignoring wrap.
#[inline]
pub fn axial_distance(a: HexCoord, b: HexCoord) -> u32 {
    let dq = a.q - b.q;
    let dr = a.r - b.r;
    let ds = -dq - dr;
    dq.unsigned_abs().max(dr.unsigned_abs()).max(ds.unsigned_abs())
}

/// Hex distance on a grid that wraps every `width` columns: the shortest of
/// the three X images of `b`.
pub fn wrapped_axial_distance(a: HexCoord, b: HexCoord, width: i32) -> u32 {
    let a = HexCoord::new(a.q.rem_euclid(width), a.r);
    let bq = b.q.rem_euclid(width);
    [bq - width, bq, bq + width]
        .into_iter()
        .map(|q| axial_distance(a, HexCoord::new(q, b.r)))
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_vectors_match_axial_offsets() {
        for (i, &(dq, dr)) in AXIAL_DIRECTIONS.iter().enumerate() {
            let (x, y) = HexCoord::new(dq, dr).to_plane();
            let (ex, ey) = DIRECTION_VECTORS[i];
            assert!((x - ex).abs() < 1e-12 && (y - ey).abs() < 1e-12, "direction {i}");
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn every_neighbour_is_one_step_away() {
        let c = HexCoord::new(5, -3);
        for dir in 0..6 {
            assert_eq!(axial_distance(c, c.offset(dir)), 1);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = HexCoord::new(3, 7);
        let b = HexCoord::new(-4, 2);
        assert_eq!(axial_distance(a, b), axial_distance(b, a));
        assert_eq!(axial_distance(a, b), 12);
        assert_eq!(axial_distance(HexCoord::new(0, 0), HexCoord::new(2, -2)), 2);
    }
}
