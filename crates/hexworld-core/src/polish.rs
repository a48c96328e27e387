//! Height polish after tectonic relief.
//!
//! Jacobi passes of
//!   h' = h + α(1 − w)(mean − h) + γ·w·max(0, h − mean)
//! where `w = strength · falloff` on convergent belts and 0 elsewhere, so
//! open terrain is smoothed while mountain crests keep their edge. A final
//! despeckle pass removes one-cell islands. Reach is `iterations + 1`.

use crate::chunk::Window;
use crate::noise::despeckle;
use crate::params::PolishParams;

/// Polish a height window in place. `weight` holds `w` per cell, same shape.
pub fn polish_window(height: &mut Window<f32>, weight: &Window<f32>, params: &PolishParams) {
    let (w, h) = (height.width, height.height);
    let mut next = height.data.clone();
    for _ in 0..params.iterations {
        let src = &height.data;
        for j in 0..h {
            for i in 0..w {
                let k = j * w + i;
                let mut sum = 0.0f32;
                let mut count = 0u32;
                for dir in 0..6 {
                    if let Some((ni, nj)) = height.neighbor(i, j, dir) {
                        sum += src[nj * w + ni];
                        count += 1;
                    }
                }
                if count == 0 {
                    next[k] = src[k];
                    continue;
                }
                let mean = sum / count as f32;
                let hv = src[k];
                let wv = weight.data[k].clamp(0.0, 1.0);
                next[k] = (hv
                    + params.smoothing * (1.0 - wv) * (mean - hv)
                    + params.ridge_gain * wv * (hv - mean).max(0.0))
                .clamp(-1.0, 1.0);
            }
        }
        std::mem::swap(&mut height.data, &mut next);
    }
    despeckle(height);
}

/// Halo needed for exact interior results.
pub fn polish_halo(params: &PolishParams) -> u32 {
    params.iterations + 1
}
