//! World dimensions, scale profiles and canonical coordinate mapping for a
//! finite hex grid that wraps in X and is bounded in Y.

use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkBounds, ChunkCoord};
use crate::coords::{wrapped_axial_distance, HexCoord, AXIAL_DIRECTIONS};
use crate::error::{Result, WorldError};

/// Sampling profile. Layers are resolution-agnostic; the profile only changes
/// how densely the same structure is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Dev,
    Target,
}

impl Profile {
    pub fn name(self) -> &'static str {
        match self {
            Profile::Dev => "dev",
            Profile::Target => "target",
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Profile::Dev),
            "target" => Ok(Profile::Target),
            other => Err(WorldError::ConfigurationConflict(format!("unknown profile `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cells(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Immutable world configuration, created once per generation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldConfig {
    pub profile: Profile,
    pub target_size: Size,
    pub dev_size: Size,
    pub macro_size: Size,
    pub chunk_size: Size,
    pub wrap_x: bool,
    pub wrap_y: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::dev()
    }
}

impl WorldConfig {
    pub fn dev() -> Self {
        Self {
            profile: Profile::Dev,
            target_size: Size::new(4000, 2000),
            dev_size: Size::new(512, 256),
            macro_size: Size::new(500, 250),
            chunk_size: Size::new(64, 64),
            wrap_x: true,
            wrap_y: false,
        }
    }

    pub fn target() -> Self {
        Self { profile: Profile::Target, ..Self::dev() }
    }

    pub fn for_profile(profile: Profile) -> Self {
        Self { profile, ..Self::dev() }
    }

    /// Size sampled by generation under the active profile.
    pub fn active_size(&self) -> Size {
        match self.profile {
            Profile::Dev => self.dev_size,
            Profile::Target => self.target_size,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.active_size().width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.active_size().height
    }

    pub fn cell_count(&self) -> usize {
        self.active_size().cells()
    }

    /// Active cells per macro cell along X.
    pub fn macro_scale(&self) -> f64 {
        self.width() as f64 / self.macro_size.width as f64
    }

    /// Fail fast on inconsistent sizes or unsupported topology.
    pub fn validate(&self) -> Result<()> {
        let conflict = |msg: String| Err(WorldError::ConfigurationConflict(msg));
        for (name, s) in [
            ("target_size", self.target_size),
            ("dev_size", self.dev_size),
            ("macro_size", self.macro_size),
            ("chunk_size", self.chunk_size),
        ] {
            if s.width == 0 || s.height == 0 {
                return conflict(format!("{name} has a zero dimension"));
            }
        }
        if !self.wrap_x || self.wrap_y {
            return conflict("only X-wrapped, Y-bounded worlds are supported".into());
        }
        let active = self.active_size();
        if active.height < 2 || self.macro_size.height < 2 {
            return conflict("worlds need at least two rows".into());
        }
        if active.width > i32::MAX as u32 / 4 || active.height > i32::MAX as u32 / 4 {
            return conflict(format!("active size {}x{} is too large", active.width, active.height));
        }
        if self.chunk_size.width > active.width || self.chunk_size.height > active.height {
            return conflict(format!(
                "chunk size {}x{} exceeds active size {}x{}",
                self.chunk_size.width, self.chunk_size.height, active.width, active.height
            ));
        }
        let target = self.target_size;
        let fits = |s: Size| s.width <= target.width && s.height <= target.height;
        if !fits(self.dev_size) {
            return conflict("dev size exceeds target size".into());
        }
        if !fits(self.macro_size) {
            return conflict("macro size exceeds target size".into());
        }
        let aspect = |s: Size| s.width as f64 / s.height as f64;
        let (a_macro, a_active) = (aspect(self.macro_size), aspect(active));
        if (a_macro - a_active).abs() / a_active > 0.01 {
            return conflict(format!(
                "macro aspect {a_macro:.3} does not match active aspect {a_active:.3}"
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn wrap_q(&self, q: i32) -> i32 {
        q.rem_euclid(self.width() as i32)
    }

    /// Canonical representative of `(q, r)`. Rows are hard edges.
    pub fn canonicalize(&self, q: i32, r: i32) -> Result<HexCoord> {
        let height = self.height();
        if r < 0 || r >= height as i32 {
            return Err(WorldError::InvalidCoordinate { q, r, height });
        }
        Ok(HexCoord::new(self.wrap_q(q), r))
    }

    /// Six neighbours in direction order, canonicalised. Neighbours beyond
    /// the pole rows are `None`.
    pub fn neighbors(&self, c: HexCoord) -> [Option<HexCoord>; 6] {
        let mut out = [None; 6];
        for (dir, slot) in out.iter_mut().enumerate() {
            let n = c.offset(dir);
            *slot = self.canonicalize(n.q, n.r).ok();
        }
        out
    }

    /// Same as `neighbors`, expressed as row-major cell indices.
    pub fn neighbor_indices(&self, index: usize) -> [Option<usize>; 6] {
        let w = self.width() as i32;
        let h = self.height() as i32;
        let q = (index % w as usize) as i32;
        let r = (index / w as usize) as i32;
        let mut out = [None; 6];
        for (dir, &(dq, dr)) in AXIAL_DIRECTIONS.iter().enumerate() {
            let nr = r + dr;
            if nr < 0 || nr >= h {
                continue;
            }
            let nq = (q + dq).rem_euclid(w);
            out[dir] = Some(nr as usize * w as usize + nq as usize);
        }
        out
    }

    #[inline]
    pub fn index_of(&self, c: HexCoord) -> usize {
        c.r as usize * self.width() as usize + c.q as usize
    }

    #[inline]
    pub fn coord_of(&self, index: usize) -> HexCoord {
        let w = self.width() as usize;
        HexCoord::new((index % w) as i32, (index / w) as i32)
    }

    /// Hex distance on the cylinder: the shortest of the three X images.
    pub fn wrapped_distance(&self, a: HexCoord, b: HexCoord) -> u32 {
        wrapped_axial_distance(a, b, self.width() as i32)
    }

    /// Number of chunk columns and rows. Trailing chunks may be partial.
    pub fn chunk_grid(&self) -> (u32, u32) {
        let a = self.active_size();
        (
            a.width.div_ceil(self.chunk_size.width),
            a.height.div_ceil(self.chunk_size.height),
        )
    }

    /// All chunks in row-major order.
    pub fn chunks(&self) -> Vec<ChunkCoord> {
        let (nx, ny) = self.chunk_grid();
        (0..ny).flat_map(|cy| (0..nx).map(move |cx| ChunkCoord::new(cx, cy))).collect()
    }

    pub fn chunk_bounds(&self, chunk: ChunkCoord) -> ChunkBounds {
        let a = self.active_size();
        let q0 = chunk.cx * self.chunk_size.width;
        let r0 = chunk.cy * self.chunk_size.height;
        ChunkBounds {
            q0,
            r0,
            width: self.chunk_size.width.min(a.width - q0),
            height: self.chunk_size.height.min(a.height - r0),
        }
    }

    pub fn chunk_of(&self, c: HexCoord) -> ChunkCoord {
        ChunkCoord::new(
            self.wrap_q(c.q) as u32 / self.chunk_size.width,
            c.r as u32 / self.chunk_size.height,
        )
    }

    /// Canonical chunk for a possibly out-of-range chunk column.
    pub fn canonical_chunk(&self, cx: i32, cy: i32) -> Result<ChunkCoord> {
        let (nx, ny) = self.chunk_grid();
        if cy < 0 || cy >= ny as i32 {
            return Err(WorldError::InvalidChunk { cx, cy });
        }
        Ok(ChunkCoord::new(cx.rem_euclid(nx as i32) as u32, cy as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> WorldConfig {
        WorldConfig {
            dev_size: Size::new(16, 8),
            macro_size: Size::new(16, 8),
            chunk_size: Size::new(4, 4),
            ..WorldConfig::dev()
        }
    }

    #[test]
    fn default_profiles_validate() {
        assert!(WorldConfig::dev().validate().is_ok());
        assert!(WorldConfig::target().validate().is_ok());
        assert!(small().validate().is_ok());
    }

    #[test]
    fn canonicalize_wraps_q_and_rejects_rows() {
        let cfg = small();
        assert_eq!(cfg.canonicalize(-1, 3).unwrap(), HexCoord::new(15, 3));
        assert_eq!(cfg.canonicalize(16 * 3 + 2, 0).unwrap(), HexCoord::new(2, 0));
        assert_eq!(cfg.canonicalize(5, 7).unwrap(), HexCoord::new(5, 7));
        assert!(matches!(
            cfg.canonicalize(0, 8),
            Err(WorldError::InvalidCoordinate { q: 0, r: 8, height: 8 })
        ));
        assert!(cfg.canonicalize(0, -1).is_err());
    }

    #[test]
    fn multiples_of_width_are_the_same_cell() {
        let cfg = small();
        for k in -3..=3 {
            assert_eq!(cfg.canonicalize(7 + 16 * k, 2).unwrap(), HexCoord::new(7, 2));
        }
    }

    #[test]
    fn neighbours_wrap_across_the_seam_and_stop_at_poles() {
        let cfg = small();
        let n = cfg.neighbors(HexCoord::new(15, 0));
        assert_eq!(n[0], Some(HexCoord::new(0, 0)));
        assert_eq!(n[1], None);
        assert_eq!(n[2], None);
        assert_eq!(n[3], Some(HexCoord::new(14, 0)));
        assert_eq!(n[4], Some(HexCoord::new(14, 1)));
        assert_eq!(n[5], Some(HexCoord::new(15, 1)));
    }

    #[test]
    fn neighbor_indices_agree_with_neighbors() {
        let cfg = small();
        for idx in 0..cfg.cell_count() {
            let by_coord = cfg.neighbors(cfg.coord_of(idx)).map(|n| n.map(|c| cfg.index_of(c)));
            assert_eq!(by_coord, cfg.neighbor_indices(idx));
        }
    }

    #[test]
    fn wrapped_distance_crosses_the_seam() {
        let cfg = small();
        assert_eq!(cfg.wrapped_distance(HexCoord::new(0, 3), HexCoord::new(15, 3)), 1);
        assert_eq!(cfg.wrapped_distance(HexCoord::new(1, 3), HexCoord::new(14, 3)), 3);
        assert_eq!(cfg.wrapped_distance(HexCoord::new(4, 2), HexCoord::new(4, 2)), 0);
    }

    #[test]
    fn conflicts_fail_fast() {
        let mut cfg = small();
        cfg.chunk_size = Size::new(32, 4);
        assert!(matches!(cfg.validate(), Err(WorldError::ConfigurationConflict(_))));

        let mut cfg = small();
        cfg.wrap_y = true;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.macro_size = Size::new(16, 16);
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.dev_size = Size::new(0, 8);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn chunk_grid_allows_partial_trailing_chunks() {
        let cfg = WorldConfig::target();
        assert_eq!(cfg.chunk_grid(), (63, 32));
        let last = cfg.chunk_bounds(ChunkCoord::new(62, 31));
        assert_eq!((last.width, last.height), (4000 - 62 * 64, 2000 - 31 * 64));
        assert_eq!(WorldConfig::dev().chunk_grid(), (8, 4));
    }

    #[test]
    fn canonical_chunk_wraps_columns() {
        let cfg = WorldConfig::dev();
        assert_eq!(cfg.canonical_chunk(-1, 0).unwrap(), ChunkCoord::new(7, 0));
        assert_eq!(cfg.canonical_chunk(9, 3).unwrap(), ChunkCoord::new(1, 3));
        assert!(cfg.canonical_chunk(0, 4).is_err());
    }

    #[test]
    fn chunk_of_matches_chunk_bounds() {
        let cfg = WorldConfig::dev();
        for chunk in cfg.chunks() {
            for c in cfg.chunk_bounds(chunk).coords() {
                assert_eq!(cfg.chunk_of(c), chunk);
            }
        }
        assert_eq!(cfg.chunk_of(HexCoord::new(-1, 70)), ChunkCoord::new(7, 1));
    }

    #[test]
    fn macro_scale_follows_the_profile() {
        assert!((WorldConfig::dev().macro_scale() - 512.0 / 500.0).abs() < 1e-12);
        assert!((WorldConfig::target().macro_scale() - 8.0).abs() < 1e-12);
    }
}
