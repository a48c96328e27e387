//! Land coverage and connected land masses and ocean basins.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::heightfield::{HeightField, SEA_LEVEL};

/// Fraction of cells at or above sea level.
pub fn compute_land_fraction(hf: &HeightField) -> f32 {
    if hf.is_empty() {
        return 0.0;
    }
    let land = hf.data.iter().filter(|&&h| h >= SEA_LEVEL).count();
    land as f32 / hf.len() as f32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsResult {
    /// Component sizes in cells, largest first.
    pub sizes: Vec<usize>,
}

impl ComponentsResult {
    /// Components of at least `min_cells` cells.
    pub fn count_at_least(&self, min_cells: usize) -> usize {
        self.sizes.iter().take_while(|&&s| s >= min_cells).count()
    }
}

/// Land components under hex adjacency, joined across the X seam.
pub fn compute_land_components(config: &WorldConfig, hf: &HeightField) -> ComponentsResult {
    components(config, hf, |h| h >= SEA_LEVEL)
}

/// Ocean components under hex adjacency, joined across the X seam.
pub fn compute_ocean_components(config: &WorldConfig, hf: &HeightField) -> ComponentsResult {
    components(config, hf, |h| h < SEA_LEVEL)
}

fn components(
    config: &WorldConfig,
    hf: &HeightField,
    member: impl Fn(f32) -> bool,
) -> ComponentsResult {
    let n = hf.len();
    let mut seen = vec![false; n];
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();
    for start in 0..n {
        if seen[start] || !member(hf.data[start]) {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let mut size = 0;
        while let Some(k) = queue.pop_front() {
            size += 1;
            for nb in config.neighbor_indices(k).into_iter().flatten() {
                if !seen[nb] && member(hf.data[nb]) {
                    seen[nb] = true;
                    queue.push_back(nb);
                }
            }
        }
        sizes.push(size);
    }
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    ComponentsResult { sizes }
}
