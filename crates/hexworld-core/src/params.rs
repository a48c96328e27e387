//! Per-layer tunables, keyed by profile.
//!
//! Layers read distances in cells of the active grid. Every distance-like
//! value therefore has an explicit dev and target entry instead of being
//! rescaled inside the layer.

use serde::{Deserialize, Serialize};

use crate::config::Profile;

/// Macro-grid height synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightParams {
    pub octaves: u32,
    /// Hurst exponent; per-octave gain is `2^(-hurst)`.
    pub hurst: f32,
    /// Noise cycles around the planet at the lowest octave.
    pub base_cycles: f64,
    pub fbm_weight: f32,
    pub blob_count: u32,
    pub blob_weight: f32,
    /// Blob radius range as a fraction of the macro width.
    pub blob_radius: (f64, f64),
    /// Probability that a blob is an ocean basin rather than a continent.
    pub basin_chance: f64,
    /// Fraction of cells that end up below sea level.
    pub ocean_fraction: f32,
    /// Half-width of a frame band's core, as a fraction of the macro width.
    pub frame_core: f64,
    /// Shoulder falloff length, as a fraction of the macro width.
    pub frame_shoulder: f64,
    pub frame_weight: f32,
    /// Meander amplitude, as a fraction of the macro width.
    pub frame_meander: f64,
    /// Spacing jitter of band centres, as a fraction of the macro width.
    pub frame_jitter: f64,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            octaves: 6,
            hurst: 0.8,
            base_cycles: 2.0,
            fbm_weight: 1.0,
            blob_count: 7,
            blob_weight: 0.9,
            blob_radius: (0.07, 0.15),
            basin_chance: 0.3,
            ocean_fraction: 0.58,
            frame_core: 0.012,
            frame_shoulder: 0.04,
            frame_weight: 0.8,
            frame_meander: 0.02,
            frame_jitter: 0.06,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TectonicsParams {
    pub macro_cells_per_plate: usize,
    pub min_plates: usize,
    pub max_plates: usize,
    pub lloyd_iterations: u32,
    pub continental_threshold: f64,
    /// Normal motion component separating convergent/divergent from transform.
    pub normal_threshold: f64,
    /// Motion component that maps to strength 1.
    pub strength_scale: f64,
    /// Relief corridor radius in active cells.
    pub corridor: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolishParams {
    pub iterations: u32,
    /// Smoothing toward the neighbour mean away from convergent belts.
    pub smoothing: f32,
    /// Peak sharpening on convergent belts.
    pub ridge_gain: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateParams {
    pub lapse_rate: f32,
    /// E-folding distance of ocean proximity, in active cells.
    pub ocean_decay: f64,
    /// Ocean search radius, in active cells.
    pub ocean_cap: u32,
    /// Upwind cells sampled for advected moisture.
    pub wind_fetch: u32,
    pub shadow_range: u32,
    pub barrier_threshold: f32,
    pub shadow_gain: f32,
    pub max_shadow: f32,
    pub proximity_weight: f32,
    pub wind_weight: f32,
    pub zonal_weight: f32,
    pub noise_amplitude: f32,
    /// Wind band edge jitter, in normalised latitude.
    pub band_jitter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrologyParams {
    pub river_threshold: u32,
    pub lake_min_depth: f32,
    pub runoff_per_cell: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErosionParams {
    pub thermal_iterations: u32,
    pub talus: f32,
    pub thermal_rate: f32,
    pub max_carve: f32,
    pub trunk_boost: f32,
    pub bank_relax: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheParams {
    /// Chunk entries kept per layer.
    pub capacity: usize,
}

/// Every tunable of the pipeline for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileParams {
    pub height: HeightParams,
    pub tectonics: TectonicsParams,
    pub polish: PolishParams,
    pub climate: ClimateParams,
    pub hydrology: HydrologyParams,
    pub erosion: ErosionParams,
    pub cache: CacheParams,
}

impl ProfileParams {
    pub fn for_profile(profile: Profile) -> Self {
        fn pick<T>(profile: Profile, dev: T, target: T) -> T {
            match profile {
                Profile::Dev => dev,
                Profile::Target => target,
            }
        }
        Self {
            height: HeightParams::default(),
            tectonics: TectonicsParams {
                macro_cells_per_plate: 4096,
                min_plates: 12,
                max_plates: 96,
                lloyd_iterations: 2,
                continental_threshold: 0.45,
                normal_threshold: 0.25,
                strength_scale: 1.5,
                corridor: pick(profile, 5, 40),
            },
            polish: PolishParams {
                iterations: pick(profile, 2, 8),
                smoothing: 0.35,
                ridge_gain: 0.15,
            },
            climate: ClimateParams {
                lapse_rate: 0.6,
                ocean_decay: pick(profile, 12.0, 94.0),
                ocean_cap: pick(profile, 24, 188),
                wind_fetch: pick(profile, 24, 188),
                shadow_range: pick(profile, 10, 78),
                barrier_threshold: 0.08,
                shadow_gain: 1.6,
                max_shadow: 0.6,
                proximity_weight: 0.45,
                wind_weight: 0.25,
                zonal_weight: 0.30,
                noise_amplitude: 0.12,
                band_jitter: 0.04,
            },
            hydrology: HydrologyParams {
                river_threshold: pick(profile, 48, 2930),
                lake_min_depth: 1e-4,
                runoff_per_cell: 0.004,
            },
            erosion: ErosionParams {
                thermal_iterations: pick(profile, 2, 6),
                talus: pick(profile, 0.05, 0.0064),
                thermal_rate: 0.12,
                max_carve: 0.03,
                trunk_boost: 1.15,
                bank_relax: 0.24,
            },
            cache: CacheParams { capacity: pick(profile, 256, 512) },
        }
    }

    pub fn dev() -> Self {
        Self::for_profile(Profile::Dev)
    }

    pub fn target() -> Self {
        Self::for_profile(Profile::Target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_distances_scale_with_density() {
        let dev = ProfileParams::dev();
        let target = ProfileParams::target();
        assert!(target.tectonics.corridor > dev.tectonics.corridor);
        assert!(target.climate.ocean_decay > dev.climate.ocean_decay);
        assert!(target.hydrology.river_threshold > dev.hydrology.river_threshold);
        assert!(target.erosion.talus < dev.erosion.talus);
        // Non-distance values are shared.
        assert_eq!(dev.height, target.height);
        assert_eq!(dev.hydrology.runoff_per_cell, target.hydrology.runoff_per_cell);
    }

    #[test]
    fn params_round_trip_through_json() {
        let p = ProfileParams::target();
        let json = serde_json::to_string(&p).unwrap();
        let back: ProfileParams = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
