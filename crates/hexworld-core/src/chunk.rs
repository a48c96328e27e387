//! Chunk addressing and halo windows.
//!
//! Every layer computes its output chunk by chunk. A chunk's computation sees
//! only a `Window`: the chunk plus a fixed halo of already-materialised input,
//! gathered by canonical coordinate so windows crossing the X seam are
//! stitched transparently. Interior cells of a window are exact as long as the
//! halo is at least the layer's reach.

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::coords::{HexCoord, AXIAL_DIRECTIONS};
use crate::heightfield::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: u32,
    pub cy: u32,
}

impl ChunkCoord {
    pub const fn new(cx: u32, cy: u32) -> Self {
        Self { cx, cy }
    }
}

/// Cell extent of one chunk in canonical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    pub q0: u32,
    pub r0: u32,
    pub width: u32,
    pub height: u32,
}

impl ChunkBounds {
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Canonical coordinates of the chunk's cells, row-major.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height).flat_map(move |j| {
            (0..self.width).map(move |i| HexCoord::new((self.q0 + i) as i32, (self.r0 + j) as i32))
        })
    }
}

/// A chunk plus halo, copied out of a full field.
#[derive(Debug, Clone)]
pub struct Window<T> {
    /// Unwrapped q of the window's first column (may be negative).
    pub q0: i32,
    pub r0: i32,
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
    world_width: i32,
    inner_q: usize,
    inner_r: usize,
    inner_w: usize,
    inner_h: usize,
}

impl<T: Copy> Window<T> {
    /// Gather `bounds` grown by `halo` cells from `field`. Rows are clipped at
    /// the poles; columns wrap.
    pub fn gather(config: &WorldConfig, field: &Field<T>, bounds: ChunkBounds, halo: u32) -> Self {
        let h = config.height() as i32;
        let halo = halo as i32;
        let q0 = bounds.q0 as i32 - halo;
        let r0 = (bounds.r0 as i32 - halo).max(0);
        let r1 = (bounds.r0 as i32 + bounds.height as i32 + halo).min(h);
        let width = bounds.width as usize + 2 * halo as usize;
        let height = (r1 - r0) as usize;

        let mut data = Vec::with_capacity(width * height);
        for r in r0..r1 {
            for i in 0..width as i32 {
                let q = config.wrap_q(q0 + i) as usize;
                data.push(field.get(q, r as usize));
            }
        }

        Self {
            q0,
            r0,
            width,
            height,
            data,
            world_width: config.width() as i32,
            inner_q: halo as usize,
            inner_r: (bounds.r0 as i32 - r0) as usize,
            inner_w: bounds.width as usize,
            inner_h: bounds.height as usize,
        }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[j * self.width + i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: T) {
        self.data[j * self.width + i] = v;
    }

    /// Window-local neighbour in direction `dir`, if it lies inside the window.
    #[inline]
    pub fn neighbor(&self, i: usize, j: usize, dir: usize) -> Option<(usize, usize)> {
        let (dq, dr) = AXIAL_DIRECTIONS[dir];
        let ni = i as i32 + dq;
        let nj = j as i32 + dr;
        if ni < 0 || nj < 0 || ni >= self.width as i32 || nj >= self.height as i32 {
            None
        } else {
            Some((ni as usize, nj as usize))
        }
    }

    /// Canonical coordinate of a window cell.
    #[inline]
    pub fn coord(&self, i: usize, j: usize) -> HexCoord {
        HexCoord::new((self.q0 + i as i32).rem_euclid(self.world_width), self.r0 + j as i32)
    }

    /// Same shape, new contents.
    pub fn with_data<U: Copy>(&self, data: Vec<U>) -> Window<U> {
        assert_eq!(data.len(), self.data.len());
        Window {
            q0: self.q0,
            r0: self.r0,
            width: self.width,
            height: self.height,
            data,
            world_width: self.world_width,
            inner_q: self.inner_q,
            inner_r: self.inner_r,
            inner_w: self.inner_w,
            inner_h: self.inner_h,
        }
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Window<U> {
        self.with_data(self.data.iter().map(|&v| f(v)).collect())
    }

    /// Window positions of the chunk's own cells, row-major.
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.inner_h)
            .flat_map(move |j| (0..self.inner_w).map(move |i| (self.inner_q + i, self.inner_r + j)))
    }

    /// The chunk's own cells, row-major, without the halo.
    pub fn into_interior(self) -> Vec<T> {
        self.interior().map(|(i, j)| self.get(i, j)).collect()
    }
}

/// Run `f` over every chunk. Uses the rayon pool with the `threading` feature;
/// output order always follows `chunks`.
pub fn map_chunks<T, F>(chunks: &[ChunkCoord], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(ChunkCoord) -> T + Sync + Send,
{
    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        chunks.par_iter().map(|&c| f(c)).collect()
    }
    #[cfg(not(feature = "threading"))]
    {
        chunks.iter().map(|&c| f(c)).collect()
    }
}
