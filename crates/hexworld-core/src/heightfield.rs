use serde::{Deserialize, Serialize};

use crate::chunk::ChunkCoord;
use crate::config::WorldConfig;
use crate::coords::HexCoord;

/// Sea level on the normalised height scale. Cells strictly below are ocean.
pub const SEA_LEVEL: f32 = 0.0;

/// A dense per-cell field over canonical coordinates, row-major (`r * width + q`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// Normalised elevation in `[-1, 1]`, sea level at `SEA_LEVEL`.
pub type HeightField = Field<f32>;

impl<T: Clone> Field<T> {
    /// Create a new field filled with the given value.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self { data: vec![fill; width * height], width, height }
    }

    /// A field shaped like the active grid of `config`.
    pub fn for_config(config: &WorldConfig, fill: T) -> Self {
        Self::new(config.width() as usize, config.height() as usize, fill)
    }

    /// Reassemble a full field from per-chunk row-major parts, in the order
    /// of `chunks`.
    pub fn from_chunks<P: AsRef<[T]>>(
        config: &WorldConfig,
        chunks: &[ChunkCoord],
        parts: &[P],
        fill: T,
    ) -> Self {
        let mut field = Self::for_config(config, fill);
        for (chunk, part) in chunks.iter().zip(parts) {
            let b = config.chunk_bounds(*chunk);
            let part = part.as_ref();
            for j in 0..b.height as usize {
                let row = (b.r0 as usize + j) * field.width + b.q0 as usize;
                let src = j * b.width as usize;
                field.data[row..row + b.width as usize]
                    .clone_from_slice(&part[src..src + b.width as usize]);
            }
        }
        field
    }
}

impl<T> Field<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "field data does not match {width}x{height}");
        Self { data, width, height }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn at(&self, c: HexCoord) -> &T {
        &self.data[c.r as usize * self.width + c.q as usize]
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Field<U> {
        Field { data: self.data.iter().map(f).collect(), width: self.width, height: self.height }
    }
}

impl<T: Copy> Field<T> {
    #[inline]
    pub fn get(&self, q: usize, r: usize) -> T {
        self.data[r * self.width + q]
    }

    #[inline]
    pub fn set(&mut self, q: usize, r: usize, val: T) {
        self.data[r * self.width + q] = val;
    }
}

impl Field<f32> {
    /// Bilinear sample at fractional storage position `(fq, fr)`.
    /// `fq` wraps around the X seam; `fr` clamps to the pole rows.
    pub fn sample_wrapped(&self, fq: f64, fr: f64) -> f32 {
        let w = self.width as f64;
        let fq = fq.rem_euclid(w);
        let fr = fr.clamp(0.0, (self.height - 1) as f64);

        let q0 = fq.floor() as usize % self.width;
        let r0 = fr.floor() as usize;
        let q1 = (q0 + 1) % self.width;
        let r1 = (r0 + 1).min(self.height - 1);

        let tq = (fq - fq.floor()) as f32;
        let tr = (fr - r0 as f64) as f32;

        let v00 = self.get(q0, r0);
        let v10 = self.get(q1, r0);
        let v01 = self.get(q0, r1);
        let v11 = self.get(q1, r1);

        let top = v00 * (1.0 - tq) + v10 * tq;
        let bottom = v01 * (1.0 - tq) + v11 * tq;
        top * (1.0 - tr) + bottom * tr
    }
}
