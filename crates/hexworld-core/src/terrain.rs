//! Coarse terrain classes from final height.

use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::heightfield::SEA_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Ocean,
    Coast,
    Plains,
    Hills,
    Mountains,
    Snow,
}

const PLAINS_MAX: f32 = 0.25;
const HILLS_MAX: f32 = 0.5;
const MOUNTAINS_MAX: f32 = 0.78;

pub fn classify_terrain(height: f32, touches_ocean: bool) -> TerrainType {
    if height < SEA_LEVEL {
        TerrainType::Ocean
    } else if touches_ocean {
        TerrainType::Coast
    } else if height < PLAINS_MAX {
        TerrainType::Plains
    } else if height < HILLS_MAX {
        TerrainType::Hills
    } else if height < MOUNTAINS_MAX {
        TerrainType::Mountains
    } else {
        TerrainType::Snow
    }
}

/// Terrain of a window's interior cells (halo ≥ 1).
pub fn terrain_chunk(height: &Window<f32>) -> Vec<TerrainType> {
    height
        .interior()
        .map(|(i, j)| {
            let touches_ocean = (0..6)
                .filter_map(|dir| height.neighbor(i, j, dir))
                .any(|(ni, nj)| height.get(ni, nj) < SEA_LEVEL);
            classify_terrain(height.get(i, j), touches_ocean)
        })
        .collect()
}
