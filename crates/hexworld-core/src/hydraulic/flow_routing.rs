//! Flow directions on the hex grid.
//!
//! Provisional flow looks at raw height only and is chunk-local (halo 1).
//! Effective routing runs on the filled surface and always reaches a sink.

use serde::{Deserialize, Serialize};

use crate::chunk::Window;
use crate::config::WorldConfig;
use crate::coords::HexCoord;
use crate::heightfield::{HeightField, SEA_LEVEL};

use super::depressions::PriorityFlood;

/// Where a cell's water goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "to")]
pub enum FlowTarget {
    Cell(HexCoord),
    /// Ocean cell; water leaves the land system.
    Sea,
    /// Pole-row cell with no lower neighbour.
    Edge,
    /// Exit cell of an endorheic lake.
    Lake(u32),
}

impl FlowTarget {
    pub fn is_sink(&self) -> bool {
        !matches!(self, FlowTarget::Cell(_))
    }
}

/// Lowest strictly-lower neighbour by `value`; equal drops go to the lowest
/// direction index. Returns the winning direction and whether a tie occurred.
pub fn steepest_descent(
    value: f32,
    neighbours: impl Iterator<Item = (usize, f32)>,
) -> (Option<usize>, bool) {
    let mut best: Option<(usize, f32)> = None;
    let mut tied = false;
    for (dir, v) in neighbours {
        if v >= value {
            continue;
        }
        match best {
            None => best = Some((dir, v)),
            Some((_, bv)) if v < bv => {
                best = Some((dir, v));
                tied = false;
            }
            Some((_, bv)) if v == bv => tied = true,
            _ => {}
        }
    }
    (best.map(|(d, _)| d), tied)
}

/// Provisional flow of a chunk's interior cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionalChunk {
    /// Direction index per cell, `None` for provisional sinks.
    pub direction: Vec<Option<u8>>,
    /// Land cells with no strictly lower neighbour.
    pub sinks: u64,
    pub ties: u64,
}

pub fn provisional_flow(height: &Window<f32>) -> ProvisionalChunk {
    let mut sinks = 0;
    let mut ties = 0;
    let direction = height
        .interior()
        .map(|(i, j)| {
            let h = height.get(i, j);
            let nbrs = (0..6).filter_map(|dir| {
                height.neighbor(i, j, dir).map(|(ni, nj)| (dir, height.get(ni, nj)))
            });
            let (dir, tied) = steepest_descent(h, nbrs);
            ties += tied as u64;
            if dir.is_none() && h >= SEA_LEVEL {
                sinks += 1;
            }
            dir.map(|d| d as u8)
        })
        .collect();
    ProvisionalChunk { direction, sinks, ties }
}

/// Effective targets on the filled surface, plus the direction-tie count.
pub fn route(
    config: &WorldConfig,
    height: &HeightField,
    flood: &PriorityFlood,
) -> (Vec<FlowTarget>, u64) {
    let mut ties = 0u64;
    let targets = (0..height.len())
        .map(|k| {
            if height.data[k] < SEA_LEVEL {
                return FlowTarget::Sea;
            }
            let nbrs = config.neighbor_indices(k);
            let candidates =
                nbrs.iter().enumerate().filter_map(|(dir, n)| n.map(|n| (dir, flood.filled[n])));
            let (dir, tied) = steepest_descent(flood.filled[k], candidates);
            ties += tied as u64;
            match (dir.and_then(|d| nbrs[d]), flood.parent[k]) {
                (Some(n), _) => FlowTarget::Cell(config.coord_of(n)),
                (None, Some(p)) => FlowTarget::Cell(config.coord_of(p)),
                (None, None) => FlowTarget::Edge,
            }
        })
        .collect();
    (targets, ties)
}

/// `acc = 1 + Σ upstream`, folded in reverse pop order.
pub fn accumulate(config: &WorldConfig, targets: &[FlowTarget], order: &[usize]) -> Vec<u32> {
    let mut acc = vec![1u32; targets.len()];
    for &k in order.iter().rev() {
        if let FlowTarget::Cell(c) = targets[k] {
            let down = config.index_of(c);
            acc[down] = acc[down].saturating_add(acc[k]);
        }
    }
    acc
}
