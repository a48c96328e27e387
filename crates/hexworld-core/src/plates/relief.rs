//! Boundary distance and boundary relief.
//!
//! A level-synchronous BFS from every boundary cell in the window assigns each
//! cell its nearest boundary source within the corridor. Sources at the same
//! distance are ranked by strength, then by lowest canonical cell index, so
//! the winner does not depend on visit order.

use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::config::WorldConfig;
use crate::params::TectonicsParams;
use crate::seeds::cell_hash;

use super::boundaries::{BoundaryCell, BoundaryKind};
use super::{Plate, PlateKind};

/// Distance value for cells outside every corridor.
pub const NO_BOUNDARY: u16 = u16::MAX;

const SALT_TRANSFORM: u64 = 0x7472_616e_73;

const CONVERGENT_CC: f32 = 0.32;
const CONVERGENT_OC_CONTINENTAL: f32 = 0.24;
const CONVERGENT_OC_OCEANIC: f32 = -0.14;
const CONVERGENT_OO: f32 = 0.10;
const DIVERGENT_CC: f32 = -0.16;
const DIVERGENT_OC: f32 = -0.10;
const DIVERGENT_OO: f32 = -0.06;
const TRANSFORM: f32 = 0.04;

/// Per-cell boundary field entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryInfo {
    pub kind: BoundaryKind,
    pub strength: f32,
    pub distance: u16,
}

impl BoundaryInfo {
    pub const NONE: Self = Self { kind: BoundaryKind::None, strength: 0.0, distance: NO_BOUNDARY };

    /// `(1 − d/(R+1))²` inside the corridor, 0 outside.
    pub fn falloff(&self, corridor: u16) -> f32 {
        if self.distance == NO_BOUNDARY || self.kind == BoundaryKind::None {
            return 0.0;
        }
        let t = 1.0 - self.distance as f32 / (corridor as f32 + 1.0);
        t * t
    }
}

/// Relief and boundary info for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliefChunk {
    pub height: Vec<f32>,
    pub boundary: Vec<BoundaryInfo>,
    /// Interior cells whose nearest source was chosen by index.
    pub ties: u64,
}

#[derive(Debug, Clone, Copy)]
struct Source {
    strength: f32,
    index: usize,
    kind: BoundaryKind,
    plate: u16,
    other: u16,
}

impl Source {
    /// Higher strength first, then lower canonical index.
    fn beats(&self, other: &Source) -> bool {
        self.strength > other.strength
            || (self.strength == other.strength && self.index < other.index)
    }
}

/// Relief table lookup. `own` is the receiving cell's plate kind.
pub fn relief_value(
    kind: BoundaryKind,
    a: PlateKind,
    b: PlateKind,
    own: PlateKind,
    transform_sign: f32,
) -> f32 {
    use PlateKind::*;
    let pair = match (a, b) {
        (Continental, Continental) => 2,
        (Oceanic, Oceanic) => 0,
        _ => 1,
    };
    match kind {
        BoundaryKind::None => 0.0,
        BoundaryKind::Convergent => match pair {
            2 => CONVERGENT_CC,
            1 if own == Continental => CONVERGENT_OC_CONTINENTAL,
            1 => CONVERGENT_OC_OCEANIC,
            _ => CONVERGENT_OO,
        },
        BoundaryKind::Divergent => match pair {
            2 => DIVERGENT_CC,
            1 => DIVERGENT_OC,
            _ => DIVERGENT_OO,
        },
        BoundaryKind::Transform => TRANSFORM * transform_sign,
    }
}

/// Relief for the interior of `cells` (halo ≥ corridor). `base` must share
/// the window's shape.
pub fn relief_chunk(
    config: &WorldConfig,
    cells: &Window<BoundaryCell>,
    base: &Window<f32>,
    plates: &[Plate],
    params: &TectonicsParams,
    seed: u64,
) -> ReliefChunk {
    let (w, h) = (cells.width, cells.height);
    let mut dist = vec![NO_BOUNDARY; w * h];
    let mut best: Vec<Option<Source>> = vec![None; w * h];
    let mut interior_mask = vec![false; w * h];
    for (i, j) in cells.interior() {
        interior_mask[j * w + i] = true;
    }

    // ── Level 0: boundary cells are their own source ──────────────────────
    let mut frontier = Vec::new();
    for j in 0..h {
        for i in 0..w {
            let c = cells.get(i, j);
            if c.is_boundary() {
                let k = j * w + i;
                dist[k] = 0;
                best[k] = Some(Source {
                    strength: c.strength,
                    index: config.index_of(cells.coord(i, j)),
                    kind: c.kind,
                    plate: c.plate,
                    other: c.other,
                });
                frontier.push((i, j));
            }
        }
    }

    // ── Levels 1..=R: each new cell takes the best source among its
    //    neighbours on the previous level ─────────────────────────────────────
    let mut ties = 0u64;
    for d in 1..=params.corridor {
        let mut next = Vec::new();
        for &(i, j) in &frontier {
            for dir in 0..6 {
                let Some((ni, nj)) = cells.neighbor(i, j, dir) else { continue };
                let k = nj * w + ni;
                if dist[k] == NO_BOUNDARY {
                    dist[k] = d;
                    next.push((ni, nj));
                }
            }
        }
        for &(i, j) in &next {
            let mut chosen: Option<Source> = None;
            let mut tied = false;
            for dir in 0..6 {
                let Some((ni, nj)) = cells.neighbor(i, j, dir) else { continue };
                let k = nj * w + ni;
                if dist[k] != d - 1 {
                    continue;
                }
                let Some(s) = best[k] else { continue };
                match chosen {
                    None => chosen = Some(s),
                    Some(c) if s.index == c.index => {}
                    Some(c) => {
                        if s.strength == c.strength {
                            tied = true;
                        }
                        if s.beats(&c) {
                            chosen = Some(s);
                        }
                    }
                }
            }
            let k = j * w + i;
            best[k] = chosen;
            if tied && interior_mask[k] {
                ties += 1;
            }
        }
        frontier = next;
    }

    // ── Interior heights ─────────────────────────────────────────────────
    let mut height = Vec::new();
    let mut boundary = Vec::new();
    for (i, j) in cells.interior() {
        let k = j * w + i;
        let own = &plates[cells.get(i, j).plate as usize];
        let mut h = base.get(i, j) + own.bias;
        let info = match best[k] {
            Some(s) => {
                let info = BoundaryInfo { kind: s.kind, strength: s.strength, distance: dist[k] };
                let even = cell_hash(seed, SALT_TRANSFORM, s.index) & 1 == 0;
                let sign = if even { 1.0 } else { -1.0 };
                let relief = relief_value(
                    s.kind,
                    plates[s.plate as usize].kind,
                    plates[s.other as usize].kind,
                    own.kind,
                    sign,
                );
                h += relief * s.strength * info.falloff(params.corridor);
                info
            }
            None => BoundaryInfo::NONE,
        };
        height.push(h.clamp(-1.0, 1.0));
        boundary.push(info);
    }

    ReliefChunk { height, boundary, ties }
}
