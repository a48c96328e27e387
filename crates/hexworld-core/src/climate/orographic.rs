//! Rain shadow behind upwind barriers.

use crate::chunk::Window;
use crate::params::ClimateParams;

/// Moisture attenuation in `[0, max_shadow]` for window cell `(i, j)` with
/// air arriving from column step `upwind`. The strongest barrier within
/// `shadow_range` wins; a barrier must rise more than `barrier_threshold`
/// above the cell and weakens linearly with distance.
pub fn shadow_attenuation(
    height: &Window<f32>,
    i: usize,
    j: usize,
    upwind: i32,
    params: &ClimateParams,
) -> f32 {
    let here = height.get(i, j);
    let range = params.shadow_range;
    let mut strongest = 0.0f32;
    for k in 1..=range {
        let ni = i as i64 + upwind as i64 * k as i64;
        if ni < 0 || ni >= height.width as i64 {
            break;
        }
        let rise = height.get(ni as usize, j) - here;
        if rise <= params.barrier_threshold {
            continue;
        }
        let falloff = 1.0 - k as f32 / (range + 1) as f32;
        let att = (rise - params.barrier_threshold) * params.shadow_gain * falloff;
        let att = att.min(params.max_shadow);
        strongest = strongest.max(att);
    }
    strongest
}
