//! Biome lookup: altitude band × heat bucket × moisture bucket.
//!
//! Bucket lower bounds are inclusive and upper bounds exclusive, except the
//! last bucket, which is closed. Inputs are clamped first, so every finite
//! input maps to exactly one biome.

use serde::{Deserialize, Serialize};

use crate::heightfield::SEA_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Ocean,
    SeaIce,
    PolarDesert,
    Tundra,
    Taiga,
    Steppe,
    Grassland,
    TemperateForest,
    TemperateRainforest,
    Desert,
    Shrubland,
    Savanna,
    TropicalSeasonalForest,
    TropicalRainforest,
    MontaneForest,
    Alpine,
    Glacier,
    BareRock,
}

impl Biome {
    pub const ALL: [Biome; 18] = [
        Biome::Ocean,
        Biome::SeaIce,
        Biome::PolarDesert,
        Biome::Tundra,
        Biome::Taiga,
        Biome::Steppe,
        Biome::Grassland,
        Biome::TemperateForest,
        Biome::TemperateRainforest,
        Biome::Desert,
        Biome::Shrubland,
        Biome::Savanna,
        Biome::TropicalSeasonalForest,
        Biome::TropicalRainforest,
        Biome::MontaneForest,
        Biome::Alpine,
        Biome::Glacier,
        Biome::BareRock,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeBand {
    Ocean,
    Lowland,
    Highland,
    Alpine,
}

const HIGHLAND: f32 = 0.35;
const ALPINE: f32 = 0.65;
const HEAT_EDGES: [f32; 4] = [0.15, 0.35, 0.6, 0.8];
const MOISTURE_EDGES: [f32; 3] = [0.25, 0.5, 0.75];

pub fn altitude_band(height: f32) -> AltitudeBand {
    if height < SEA_LEVEL {
        AltitudeBand::Ocean
    } else if height < HIGHLAND {
        AltitudeBand::Lowland
    } else if height < ALPINE {
        AltitudeBand::Highland
    } else {
        AltitudeBand::Alpine
    }
}

/// Index of the bucket containing `v` after clamping to `[0, 1]`.
fn bucket(v: f32, edges: &[f32]) -> usize {
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    edges.iter().take_while(|&&e| v >= e).count()
}

pub fn heat_bucket(heat: f32) -> usize {
    bucket(heat, &HEAT_EDGES)
}

pub fn moisture_bucket(moisture: f32) -> usize {
    bucket(moisture, &MOISTURE_EDGES)
}

use Biome::*;

// Rows: heat bucket (frigid → hot). Columns: moisture bucket (arid → wet).
const LOWLAND: [[Biome; 4]; 5] = [
    [PolarDesert, Tundra, Tundra, Tundra],
    [Steppe, Steppe, Taiga, Taiga],
    [Desert, Grassland, TemperateForest, TemperateRainforest],
    [Desert, Shrubland, TemperateForest, TropicalSeasonalForest],
    [Desert, Savanna, TropicalSeasonalForest, TropicalRainforest],
];

const HIGHLAND_TABLE: [[Biome; 4]; 5] = [
    [PolarDesert, Tundra, Tundra, Glacier],
    [Steppe, Tundra, Taiga, Taiga],
    [Steppe, Grassland, MontaneForest, MontaneForest],
    [Shrubland, Grassland, MontaneForest, MontaneForest],
    [Shrubland, Savanna, MontaneForest, TropicalRainforest],
];

const ALPINE_TABLE: [[Biome; 4]; 5] = [
    [Glacier, Glacier, Glacier, Glacier],
    [BareRock, Alpine, Glacier, Glacier],
    [BareRock, Alpine, Alpine, Alpine],
    [BareRock, Alpine, Alpine, MontaneForest],
    [BareRock, Alpine, MontaneForest, MontaneForest],
];

/// Total classification of a cell.
pub fn classify(height: f32, heat: f32, moisture: f32) -> Biome {
    let hb = heat_bucket(heat);
    let mb = moisture_bucket(moisture);
    match altitude_band(height) {
        AltitudeBand::Ocean => {
            if hb == 0 {
                SeaIce
            } else {
                Ocean
            }
        }
        AltitudeBand::Lowland => LOWLAND[hb][mb],
        AltitudeBand::Highland => HIGHLAND_TABLE[hb][mb],
        AltitudeBand::Alpine => ALPINE_TABLE[hb][mb],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges_are_lower_inclusive_and_last_closed() {
        assert_eq!(heat_bucket(0.0), 0);
        assert_eq!(heat_bucket(0.1499), 0);
        assert_eq!(heat_bucket(0.15), 1);
        assert_eq!(heat_bucket(0.35), 2);
        assert_eq!(heat_bucket(0.6), 3);
        assert_eq!(heat_bucket(0.8), 4);
        assert_eq!(heat_bucket(1.0), 4);
        assert_eq!(moisture_bucket(0.25), 1);
        assert_eq!(moisture_bucket(0.75), 3);
        assert_eq!(moisture_bucket(1.0), 3);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(heat_bucket(-3.0), 0);
        assert_eq!(heat_bucket(7.0), 4);
        assert_eq!(moisture_bucket(f32::NAN), 0);
        assert_eq!(classify(2.0, 2.0, 2.0), classify(1.0, 1.0, 1.0));
    }

    #[test]
    fn altitude_bands() {
        assert_eq!(altitude_band(-0.0001), AltitudeBand::Ocean);
        assert_eq!(altitude_band(0.0), AltitudeBand::Lowland);
        assert_eq!(altitude_band(0.35), AltitudeBand::Highland);
        assert_eq!(altitude_band(0.65), AltitudeBand::Alpine);
    }

    #[test]
    fn classification_is_total() {
        let steps = [-1.0f32, -0.01, 0.0, 0.2, 0.35, 0.5, 0.65, 0.9, 1.0];
        let unit = [0.0f32, 0.1, 0.15, 0.3, 0.35, 0.5, 0.6, 0.75, 0.8, 0.99, 1.0];
        for &h in &steps {
            for &t in &unit {
                for &m in &unit {
                    let b = classify(h, t, m);
                    assert!(Biome::ALL.contains(&b));
                    assert_eq!(h < 0.0, matches!(b, Ocean | SeaIce), "h={h} t={t} m={m} → {b:?}");
                }
            }
        }
    }

    #[test]
    fn familiar_corners() {
        assert_eq!(classify(0.1, 0.9, 0.9), TropicalRainforest);
        assert_eq!(classify(0.1, 0.9, 0.1), Desert);
        assert_eq!(classify(0.1, 0.05, 0.6), Tundra);
        assert_eq!(classify(0.9, 0.05, 0.6), Glacier);
        assert_eq!(classify(-0.5, 0.05, 0.6), SeaIce);
        assert_eq!(classify(-0.5, 0.5, 0.6), Ocean);
    }
}
