//! Hydrology: depression filling → flow routing → accumulation → lakes and
//! rivers.
//!
//! Routing needs the whole grid, so `Drainage` is one global pass. Rivers and
//! provisional flow are then extracted chunk by chunk from it.

pub mod depressions;
pub mod flow_routing;
pub mod lakes;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkBounds, Window};
use crate::config::WorldConfig;
use crate::heightfield::{HeightField, SEA_LEVEL};
use crate::params::HydrologyParams;

use depressions::priority_flood;
pub use flow_routing::FlowTarget;
use flow_routing::{accumulate, provisional_flow, route};
pub use lakes::Lake;
use lakes::{build_lakes, label_lakes};

/// Global flow graph over the whole grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drainage {
    pub targets: Vec<FlowTarget>,
    pub accumulation: Vec<u32>,
    pub filled: Vec<f32>,
    /// Lake id per cell.
    pub lake_of: Vec<Option<u32>>,
    pub lakes: Vec<Lake>,
    /// Cells whose lowest filled neighbours tied.
    pub routing_ties: u64,
}

impl Drainage {
    pub fn endorheic_count(&self) -> usize {
        self.lakes.iter().filter(|l| l.endorheic).count()
    }
}

pub fn route_drainage(
    config: &WorldConfig,
    height: &HeightField,
    params: &HydrologyParams,
) -> Drainage {
    let flood = priority_flood(config, height);
    let (mut targets, routing_ties) = route(config, height, &flood);
    let mut accumulation = accumulate(config, &targets, &flood.order);

    let lake_of = label_lakes(config, height, &flood.filled, params.lake_min_depth);
    let lakes =
        build_lakes(config, height, &flood.filled, &lake_of, &targets, &accumulation, params);

    let mut closed = 0;
    for lake in lakes.iter().filter(|l| l.endorheic) {
        targets[config.index_of(lake.exit)] = FlowTarget::Lake(lake.id);
        closed += 1;
    }
    if closed > 0 {
        accumulation = accumulate(config, &targets, &flood.order);
    }
    debug!("drainage: {} lakes, {} endorheic, {} routing ties", lakes.len(), closed, routing_ties);

    Drainage { targets, accumulation, filled: flood.filled, lake_of, lakes, routing_ties }
}

/// Per-chunk hydrology outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrologyChunk {
    pub river: Vec<bool>,
    /// Accumulation on land, 0 at sea.
    pub river_strength: Vec<u32>,
    pub provisional: Vec<Option<u8>>,
    pub provisional_sinks: u64,
    pub provisional_ties: u64,
}

/// Provisional flow reach.
pub const HYDROLOGY_HALO: u32 = 1;

pub fn hydrology_chunk(
    config: &WorldConfig,
    height: &Window<f32>,
    bounds: ChunkBounds,
    drainage: &Drainage,
    params: &HydrologyParams,
) -> HydrologyChunk {
    let provisional = provisional_flow(height);
    let mut river = Vec::with_capacity(bounds.cells());
    let mut river_strength = Vec::with_capacity(bounds.cells());
    for c in bounds.coords() {
        let k = config.index_of(c);
        let land = drainage.targets[k] != FlowTarget::Sea;
        let acc = drainage.accumulation[k];
        river.push(land && acc >= params.river_threshold);
        river_strength.push(if land { acc } else { 0 });
    }
    HydrologyChunk {
        river,
        river_strength,
        provisional: provisional.direction,
        provisional_sinks: provisional.sinks,
        provisional_ties: provisional.ties,
    }
}

/// Number of steps from `index` to its sink.
pub fn path_length(config: &WorldConfig, targets: &[FlowTarget], index: usize) -> usize {
    let mut k = index;
    let mut steps = 0;
    while let FlowTarget::Cell(c) = targets[k] {
        k = config.index_of(c);
        steps += 1;
        if steps > targets.len() {
            break;
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkCoord;
    use crate::config::Size;
    use crate::coords::HexCoord;
    use crate::params::ProfileParams;

    fn cfg() -> WorldConfig {
        WorldConfig {
            dev_size: Size::new(32, 16),
            macro_size: Size::new(32, 16),
            chunk_size: Size::new(8, 8),
            ..WorldConfig::dev()
        }
    }

    /// Land rising eastward from an ocean strip at q < 4, with a basin.
    fn slope(cfg: &WorldConfig) -> HeightField {
        let mut hf = HeightField::for_config(cfg, 0.0);
        for r in 0..cfg.height() as usize {
            for q in 0..cfg.width() as usize {
                let h = if q < 4 { -0.3 } else { 0.02 * (q as f32 - 3.0) + 0.001 * r as f32 };
                hf.set(q, r, h);
            }
        }
        hf.set(20, 8, 0.05);
        hf
    }

    #[test]
    fn every_path_ends_at_a_sink() {
        let cfg = cfg();
        let hf = slope(&cfg);
        let d = route_drainage(&cfg, &hf, &ProfileParams::dev().hydrology);
        let limit = (cfg.width() + cfg.height()) as usize;
        for k in 0..hf.len() {
            assert!(path_length(&cfg, &d.targets, k) <= limit, "cell {k}");
        }
        for k in 0..hf.len() {
            assert_eq!(hf.data[k] < SEA_LEVEL, d.targets[k] == FlowTarget::Sea);
        }
    }

    #[test]
    fn basin_becomes_a_lake() {
        let cfg = cfg();
        let hf = slope(&cfg);
        let d = route_drainage(&cfg, &hf, &ProfileParams::dev().hydrology);
        let k = cfg.index_of(HexCoord::new(20, 8));
        assert!(d.filled[k] > hf.data[k]);
        let id = d.lake_of[k].unwrap();
        assert!(d.lakes[id as usize].cells.contains(&HexCoord::new(20, 8)));
    }

    #[test]
    fn endorheic_exit_is_a_lake_sink() {
        let cfg = cfg();
        let hf = slope(&cfg);
        let params = HydrologyParams { runoff_per_cell: 1e-6, ..ProfileParams::dev().hydrology };
        let d = route_drainage(&cfg, &hf, &params);
        assert!(d.endorheic_count() >= 1);
        for lake in d.lakes.iter().filter(|l| l.endorheic) {
            assert_eq!(d.targets[cfg.index_of(lake.exit)], FlowTarget::Lake(lake.id));
        }
        // Accumulation still satisfies acc = 1 + Σ upstream.
        let mut inflow = vec![0u32; hf.len()];
        for (k, t) in d.targets.iter().enumerate() {
            if let FlowTarget::Cell(c) = t {
                inflow[cfg.index_of(*c)] += d.accumulation[k];
            }
        }
        for k in 0..hf.len() {
            assert_eq!(d.accumulation[k], 1 + inflow[k]);
        }
    }

    #[test]
    fn rivers_form_on_land_and_reach_the_sea() {
        let cfg = cfg();
        let hf = slope(&cfg);
        let params = HydrologyParams { river_threshold: 6, ..ProfileParams::dev().hydrology };
        let d = route_drainage(&cfg, &hf, &params);
        let mut rivers = 0;
        let mut into_sea = false;
        for chunk in cfg.chunks() {
            let b = cfg.chunk_bounds(chunk);
            let win = Window::gather(&cfg, &hf, b, HYDROLOGY_HALO);
            let out = hydrology_chunk(&cfg, &win, b, &d, &params);
            let cells = out.river.iter().zip(&out.river_strength);
            for (c, (&river, &strength)) in b.coords().zip(cells) {
                let k = cfg.index_of(c);
                if hf.data[k] < SEA_LEVEL {
                    assert!(!river);
                    assert_eq!(strength, 0);
                    continue;
                }
                assert_eq!(strength, d.accumulation[k]);
                if river {
                    rivers += 1;
                    if let FlowTarget::Cell(t) = d.targets[k] {
                        into_sea |= d.targets[cfg.index_of(t)] == FlowTarget::Sea;
                    }
                }
            }
        }
        assert!(rivers > 0);
        assert!(into_sea);
    }

    #[test]
    fn provisional_flow_is_chunk_exact() {
        let cfg = cfg();
        let hf = slope(&cfg);
        let params = ProfileParams::dev().hydrology;
        let d = route_drainage(&cfg, &hf, &params);
        let chunk = ChunkCoord::new(2, 1);
        let b = cfg.chunk_bounds(chunk);
        let win = Window::gather(&cfg, &hf, b, HYDROLOGY_HALO);
        let small = hydrology_chunk(&cfg, &win, b, &d, &params);
        let big = hydrology_chunk(&cfg, &Window::gather(&cfg, &hf, b, 4), b, &d, &params);
        assert_eq!(small, big);
    }
}
