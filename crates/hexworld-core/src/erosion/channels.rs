//! Valley carving along rivers.
//!
//! River cells are cut by `min(max_carve, max_carve·(acc − t)/(8t))`, with
//! trunk cells (those draining into another river cell) cut deeper. Banks
//! drop by half the strongest adjacent cut, then river and bank cells relax
//! toward their neighbour mean.

use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::params::ErosionParams;

/// Per-cell drainage facts erosion reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub accumulation: u32,
    pub river: bool,
    pub trunk: bool,
}

impl Channel {
    pub const DRY: Channel = Channel { accumulation: 1, river: false, trunk: false };
}

pub fn carve_depth(channel: Channel, params: &ErosionParams, threshold: u32) -> f32 {
    if !channel.river || threshold == 0 {
        return 0.0;
    }
    let t = threshold as f32;
    let excess = channel.accumulation.saturating_sub(threshold) as f32;
    let base = (params.max_carve * excess / (8.0 * t)).min(params.max_carve);
    if channel.trunk {
        base * params.trunk_boost
    } else {
        base
    }
}

/// Carve, lower banks and relax. Returns the carve depth per window cell.
pub fn carve_valleys(
    height: &mut Window<f32>,
    channels: &Window<Channel>,
    params: &ErosionParams,
    threshold: u32,
) -> Vec<f32> {
    let w = height.width;
    let n = height.data.len();
    let carve: Vec<f32> =
        channels.data.iter().map(|&c| carve_depth(c, params, threshold)).collect();

    let mut touched = vec![false; n];
    for j in 0..height.height {
        for i in 0..w {
            let k = j * w + i;
            if channels.data[k].river {
                height.data[k] -= carve[k];
                touched[k] = true;
                continue;
            }
            let strongest = (0..6)
                .filter_map(|dir| height.neighbor(i, j, dir))
                .map(|(ni, nj)| carve[nj * w + ni])
                .fold(0.0f32, f32::max);
            if strongest > 0.0 {
                height.data[k] -= 0.5 * strongest;
                touched[k] = true;
            }
        }
    }

    let src = height.data.clone();
    for j in 0..height.height {
        for i in 0..w {
            let k = j * w + i;
            if !touched[k] {
                continue;
            }
            let (sum, count) = (0..6)
                .filter_map(|dir| height.neighbor(i, j, dir))
                .fold((0.0f32, 0u32), |(s, c), (ni, nj)| (s + src[nj * w + ni], c + 1));
            if count > 0 {
                let mean = sum / count as f32;
                height.data[k] = src[k] + params.bank_relax * (mean - src[k]);
            }
        }
    }
    carve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ProfileParams;
    use approx::assert_abs_diff_eq;

    #[test]
    fn carve_grows_with_accumulation_and_saturates() {
        let p = ProfileParams::dev().erosion;
        let t = 48;
        let at = |acc: u32, trunk: bool| {
            carve_depth(Channel { accumulation: acc, river: true, trunk }, &p, t)
        };
        assert_abs_diff_eq!(at(48, false), 0.0);
        assert!(at(100, false) > at(60, false));
        assert_abs_diff_eq!(at(10_000, false), p.max_carve);
        assert_abs_diff_eq!(at(10_000, true), p.max_carve * p.trunk_boost);
        assert_abs_diff_eq!(carve_depth(Channel::DRY, &p, t), 0.0);
    }
}
