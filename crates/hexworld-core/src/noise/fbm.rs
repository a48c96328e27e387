//! Fractional Brownian Motion on a cylinder.
//!
//! fBm: sum of octaves with amplitude = gain^i and frequency = lacunarity^i.
//! Persistence: gain = lacunarity^(−H).  For lacunarity=2, H=0.8 → gain≈0.574.
//!
//! The world wraps in X, so plane coordinates are lifted onto a 3-D cylinder
//! before sampling. Output is periodic in X by construction.
use noise::{NoiseFn, Perlin};
use std::f64::consts::TAU;

pub struct Fbm {
    pub h: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    noise: Perlin,
}

impl Fbm {
    /// Construct an fBm with the given seed, Hurst exponent, and octave count.
    /// `lacunarity` is fixed at 2.0; gain is derived from H.
    pub fn new(seed: u32, h: f32, octaves: u32) -> Self {
        Self { h, octaves, lacunarity: 2.0, noise: Perlin::new(seed) }
    }

    /// Per-octave amplitude decay: gain = lacunarity^(−H).
    #[inline]
    fn gain(&self) -> f64 {
        (self.lacunarity as f64).powf(-(self.h as f64))
    }

    /// Evaluate fBm at a 3-D point, normalised by the amplitude sum so the
    /// result stays roughly within ±1.
    pub fn sample3(&self, p: [f64; 3]) -> f64 {
        let gain = self.gain();
        let mut value = 0.0f64;
        let mut amp = 1.0f64;
        let mut freq = 1.0f64;
        let mut amp_sum = 0.0f64;
        for _ in 0..self.octaves {
            value += amp * self.noise.get([p[0] * freq, p[1] * freq, p[2] * freq]);
            amp_sum += amp;
            amp *= gain;
            freq *= self.lacunarity as f64;
        }
        if amp_sum > 0.0 { value / amp_sum } else { 0.0 }
    }

    /// Sample at plane position `(x, y)` of a world `period` plane units
    /// around, with `cycles` lowest-octave features around the circumference.
    pub fn sample_cylinder(&self, x: f64, y: f64, period: f64, cycles: f64) -> f64 {
        self.sample3(cylinder_point(x, y, period, cycles))
    }
}

/// Lift a plane point onto the cylinder. One trip around is `cycles` noise
/// units; Y uses the same scale so features stay round.
pub fn cylinder_point(x: f64, y: f64, period: f64, cycles: f64) -> [f64; 3] {
    let angle = TAU * x / period;
    let radius = cycles / TAU;
    [radius * angle.cos(), radius * angle.sin(), y * cycles / period]
}
