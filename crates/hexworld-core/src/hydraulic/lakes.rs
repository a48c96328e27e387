//! Lake extraction from the filled surface.
//!
//! A lake is a connected set of cells where the flood raised the surface by
//! more than `lake_min_depth`. Its water leaves through the exit cell: the
//! last lake cell on the flow path from the lake's deepest cell. The first
//! cell beyond it is the spill point.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::coords::HexCoord;
use crate::heightfield::HeightField;
use crate::params::HydrologyParams;

use super::flow_routing::FlowTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lake {
    pub id: u32,
    /// Member cells in index order.
    pub cells: Vec<HexCoord>,
    pub exit: HexCoord,
    /// First non-lake cell downstream of `exit`, if any.
    pub spill: Option<HexCoord>,
    /// Σ (filled − h) over the member cells.
    pub capacity: f32,
    /// Accumulation at the exit cell.
    pub inflow: u32,
    pub endorheic: bool,
}

/// Label lake components. Ids follow the lowest member index.
pub fn label_lakes(
    config: &WorldConfig,
    height: &HeightField,
    filled: &[f32],
    min_depth: f32,
) -> Vec<Option<u32>> {
    let n = height.len();
    let wet = |k: usize| filled[k] - height.data[k] > min_depth;
    let mut label = vec![None; n];
    let mut next = 0u32;
    let mut queue = VecDeque::new();
    for seed in 0..n {
        if label[seed].is_some() || !wet(seed) {
            continue;
        }
        label[seed] = Some(next);
        queue.push_back(seed);
        while let Some(k) = queue.pop_front() {
            for nb in config.neighbor_indices(k).into_iter().flatten() {
                if label[nb].is_none() && wet(nb) {
                    label[nb] = Some(next);
                    queue.push_back(nb);
                }
            }
        }
        next += 1;
    }
    label
}

/// Build lake records and decide which ones are endorheic.
pub fn build_lakes(
    config: &WorldConfig,
    height: &HeightField,
    filled: &[f32],
    label: &[Option<u32>],
    targets: &[FlowTarget],
    acc: &[u32],
    params: &HydrologyParams,
) -> Vec<Lake> {
    let count = label.iter().flatten().map(|&id| id as usize + 1).max().unwrap_or(0);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (k, id) in label.iter().enumerate() {
        if let Some(id) = id {
            members[*id as usize].push(k);
        }
    }

    members
        .into_iter()
        .enumerate()
        .map(|(id, cells)| {
            let id = id as u32;
            let deepest = cells
                .iter()
                .copied()
                .min_by(|&a, &b| height.data[a].total_cmp(&height.data[b]).then(a.cmp(&b)))
                .unwrap_or_default();

            let mut exit = deepest;
            let mut spill = None;
            while let FlowTarget::Cell(c) = targets[exit] {
                let next = config.index_of(c);
                if label[next] != Some(id) {
                    spill = Some(c);
                    break;
                }
                exit = next;
            }

            let capacity: f32 = cells.iter().map(|&k| filled[k] - height.data[k]).sum();
            let inflow = acc[exit];
            let endorheic = (inflow as f32) * params.runoff_per_cell < capacity;
            Lake {
                id,
                cells: cells.iter().map(|&k| config.coord_of(k)).collect(),
                exit: config.coord_of(exit),
                spill,
                capacity,
                inflow,
                endorheic,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;
    use crate::hydraulic::depressions::priority_flood;
    use crate::hydraulic::flow_routing::{accumulate, route};
    use crate::params::ProfileParams;

    fn cfg(w: u32, h: u32) -> WorldConfig {
        WorldConfig {
            dev_size: Size::new(w, h),
            macro_size: Size::new(w, h),
            chunk_size: Size::new(w, h),
            ..WorldConfig::dev()
        }
    }

    /// Plateau at 0.5 with two separate pits.
    fn two_pits(cfg: &WorldConfig) -> HeightField {
        let mut hf = HeightField::for_config(cfg, 0.5);
        hf.set(3, 3, 0.2);
        hf.set(4, 3, 0.25);
        hf.set(10, 5, 0.3);
        hf
    }

    #[test]
    fn pits_become_separate_lakes() {
        let cfg = cfg(14, 9);
        let hf = two_pits(&cfg);
        let flood = priority_flood(&cfg, &hf);
        let label = label_lakes(&cfg, &hf, &flood.filled, 1e-4);
        assert_eq!(label[cfg.index_of(HexCoord::new(3, 3))], Some(0));
        assert_eq!(label[cfg.index_of(HexCoord::new(4, 3))], Some(0));
        assert_eq!(label[cfg.index_of(HexCoord::new(10, 5))], Some(1));
        assert_eq!(label.iter().flatten().count(), 3);
    }

    #[test]
    fn lake_records_have_exit_and_spill() {
        let cfg = cfg(14, 9);
        let hf = two_pits(&cfg);
        let params = ProfileParams::dev().hydrology;
        let flood = priority_flood(&cfg, &hf);
        let (targets, _) = route(&cfg, &hf, &flood);
        let acc = accumulate(&cfg, &targets, &flood.order);
        let label = label_lakes(&cfg, &hf, &flood.filled, params.lake_min_depth);
        let lakes = build_lakes(&cfg, &hf, &flood.filled, &label, &targets, &acc, &params);
        assert_eq!(lakes.len(), 2);

        let a = &lakes[0];
        assert_eq!(a.cells.len(), 2);
        assert!((a.capacity - 0.55).abs() < 1e-5);
        let spill = a.spill.unwrap();
        assert_eq!(label[cfg.index_of(spill)], None);
        assert!(a.cells.contains(&a.exit));
        assert_eq!(targets[cfg.index_of(a.exit)], FlowTarget::Cell(spill));
        assert_eq!(a.inflow, acc[cfg.index_of(a.exit)]);
        assert!(a.inflow >= 1);
    }

    #[test]
    fn small_catchments_with_large_volume_are_endorheic() {
        let cfg = cfg(14, 9);
        let hf = two_pits(&cfg);
        let params = HydrologyParams { runoff_per_cell: 1e-3, ..ProfileParams::dev().hydrology };
        let flood = priority_flood(&cfg, &hf);
        let (targets, _) = route(&cfg, &hf, &flood);
        let acc = accumulate(&cfg, &targets, &flood.order);
        let label = label_lakes(&cfg, &hf, &flood.filled, params.lake_min_depth);
        let lakes = build_lakes(&cfg, &hf, &flood.filled, &label, &targets, &acc, &params);
        assert!(lakes.iter().all(|l| l.endorheic));

        let wet = HydrologyParams { runoff_per_cell: 10.0, ..params };
        let lakes = build_lakes(&cfg, &hf, &flood.filled, &label, &targets, &acc, &wet);
        assert!(lakes.iter().all(|l| !l.endorheic));
    }
}
