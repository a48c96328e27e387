//! Climate layer: heat, moisture and biome per cell.
//!
//! Pipeline per chunk:
//!   1. Heat from latitude, lowered by the altitude lapse.
//!   2. Moisture from ocean proximity, upwind advection, the zonal profile
//!      and a low-frequency perturbation.
//!   3. Rain shadow on land behind upwind barriers.
//!   4. Biome lookup.

pub mod biome;
pub mod latitude_bands;
pub mod map_noise;
pub mod moisture;
pub mod orographic;

use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::config::WorldConfig;
use crate::heightfield::SEA_LEVEL;
use crate::params::ClimateParams;

pub use biome::Biome;
use latitude_bands::{heat, latitude, zonal_moisture};
use map_noise::MoistureNoise;
use moisture::{advected, ocean_distance, proximity, WindBands};
use orographic::shadow_attenuation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateCell {
    pub heat: f32,
    pub moisture: f32,
    pub biome: Biome,
}

/// Seeded climate state shared by every chunk of one generation.
pub struct ClimateModel {
    params: ClimateParams,
    world_height: u32,
    bands: WindBands,
    noise: MoistureNoise,
}

impl ClimateModel {
    pub fn new(config: &WorldConfig, params: &ClimateParams, seed: u64) -> Self {
        Self {
            params: params.clone(),
            world_height: config.height(),
            bands: WindBands::draw(seed, params),
            noise: MoistureNoise::new(config, seed),
        }
    }

    pub fn bands(&self) -> &WindBands {
        &self.bands
    }

    /// Halo needed for exact interior results.
    pub fn halo(&self) -> u32 {
        climate_halo(&self.params)
    }

    /// Climate of the interior cells of a height window.
    pub fn chunk(&self, height: &Window<f32>) -> Vec<ClimateCell> {
        let p = &self.params;
        let dist = ocean_distance(height, p.ocean_cap);
        height
            .interior()
            .map(|(i, j)| {
                let c = height.coord(i, j);
                let h = height.get(i, j);
                let lat = latitude(c.r as u32, self.world_height);
                let band = self.bands.at(lat);

                let t = heat(lat, h, p.lapse_rate);
                let near = proximity(dist[j * height.width + i], p.ocean_decay);
                let mut m = p.proximity_weight * near
                    + p.wind_weight * advected(height, i, j, band, p.wind_fetch)
                    + p.zonal_weight * zonal_moisture(lat)
                    + p.noise_amplitude * self.noise.sample(c);
                m = m.clamp(0.0, 1.0);
                if h >= SEA_LEVEL {
                    m *= 1.0 - shadow_attenuation(height, i, j, band.upwind, p);
                }
                ClimateCell { heat: t, moisture: m, biome: biome::classify(h, t, m) }
            })
            .collect()
    }
}

pub fn climate_halo(params: &ClimateParams) -> u32 {
    params.ocean_cap.max(params.wind_fetch).max(params.shadow_range)
}
