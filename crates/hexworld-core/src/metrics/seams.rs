//! Seam continuity: largest jump across the X wrap versus inside the map.
use serde::{Deserialize, Serialize};

use crate::heightfield::HeightField;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeamResult {
    /// Largest |Δh| between the last and first column of a row.
    pub seam_delta: f32,
    /// Largest |Δh| between horizontally adjacent cells away from the seam.
    pub interior_delta: f32,
}

impl SeamResult {
    /// The seam is no rougher than the rest of the map.
    pub fn is_continuous(&self, tolerance: f32) -> bool {
        self.seam_delta <= self.interior_delta + tolerance
    }
}

pub fn compute_seam_continuity(hf: &HeightField) -> SeamResult {
    let mut seam_delta = 0.0f32;
    let mut interior_delta = 0.0f32;
    if hf.width < 2 {
        return SeamResult { seam_delta, interior_delta };
    }
    for r in 0..hf.height {
        for q in 0..hf.width - 1 {
            interior_delta = interior_delta.max((hf.get(q, r) - hf.get(q + 1, r)).abs());
        }
        seam_delta = seam_delta.max((hf.get(hf.width - 1, r) - hf.get(0, r)).abs());
    }
    SeamResult { seam_delta, interior_delta }
}
