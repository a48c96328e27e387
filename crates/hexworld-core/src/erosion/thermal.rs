//! Talus-threshold thermal erosion.
//!
//! Every neighbour pair whose drop exceeds `talus` moves `rate · (Δ − talus)`
//! from the higher cell to the lower one. Passes are Jacobi, and each
//! transfer is applied symmetrically, so material is conserved inside the
//! window.

use crate::chunk::Window;

/// One Jacobi pass. Returns the largest single transfer.
pub fn thermal_pass(height: &mut Window<f32>, talus: f32, rate: f32) -> f32 {
    let w = height.width;
    let src = height.data.clone();
    let mut largest = 0.0f32;
    for j in 0..height.height {
        for i in 0..w {
            let here = src[j * w + i];
            let mut delta = 0.0f32;
            for dir in 0..6 {
                let Some((ni, nj)) = height.neighbor(i, j, dir) else { continue };
                let diff = src[nj * w + ni] - here;
                if diff > talus {
                    let t = rate * (diff - talus);
                    delta += t;
                    largest = largest.max(t);
                } else if -diff > talus {
                    delta -= rate * (-diff - talus);
                }
            }
            height.data[j * w + i] = here + delta;
        }
    }
    largest
}

pub fn thermal_erosion(height: &mut Window<f32>, iterations: u32, talus: f32, rate: f32) {
    for _ in 0..iterations {
        thermal_pass(height, talus, rate);
    }
}
