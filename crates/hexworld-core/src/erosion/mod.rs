//! Light erosion: thermal relaxation, then valley carving along rivers.
//!
//! Chunk-local with halo `thermal_iterations + 2`. Erosion never moves a
//! cell across sea level.

pub mod channels;
pub mod thermal;

use crate::chunk::Window;
use crate::config::WorldConfig;
use crate::heightfield::{Field, HeightField, SEA_LEVEL};
use crate::hydraulic::{Drainage, FlowTarget};
use crate::params::ErosionParams;

pub use channels::Channel;
use channels::carve_valleys;
use thermal::thermal_erosion;

pub fn erosion_halo(params: &ErosionParams) -> u32 {
    params.thermal_iterations + 2
}

/// Per-cell channel facts from the global flow graph.
pub fn channel_field(
    config: &WorldConfig,
    height: &HeightField,
    drainage: &Drainage,
    threshold: u32,
) -> Field<Channel> {
    let river: Vec<bool> = (0..height.len())
        .map(|k| height.data[k] >= SEA_LEVEL && drainage.accumulation[k] >= threshold)
        .collect();
    let data = (0..height.len())
        .map(|k| {
            let trunk = river[k]
                && matches!(drainage.targets[k], FlowTarget::Cell(c) if river[config.index_of(c)]);
            Channel { accumulation: drainage.accumulation[k], river: river[k], trunk }
        })
        .collect();
    Field::from_vec(height.width, height.height, data)
}

/// Eroded heights of the window's interior cells.
pub fn erode_window(
    height: &Window<f32>,
    channels: &Window<Channel>,
    params: &ErosionParams,
    river_threshold: u32,
) -> Vec<f32> {
    let mut work = height.clone();
    thermal_erosion(&mut work, params.thermal_iterations, params.talus, params.thermal_rate);
    carve_valleys(&mut work, channels, params, river_threshold);
    work.interior()
        .map(|(i, j)| sea_guard(height.get(i, j), work.get(i, j)))
        .collect()
}

/// Keep land on land and sea at sea.
pub fn sea_guard(before: f32, after: f32) -> f32 {
    if before >= SEA_LEVEL {
        after.max(SEA_LEVEL)
    } else if after >= SEA_LEVEL {
        before
    } else {
        after
    }
}
