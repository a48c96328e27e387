//! Cell ownership: every cell belongs to the plate whose site is nearest by
//! wrapped hex distance.

use crate::chunk::ChunkBounds;
use crate::config::WorldConfig;
use crate::coords::HexCoord;

use super::sites::nearest_site;
use super::Plate;

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionChunk {
    /// Plate id per cell, row-major.
    pub plate_ids: Vec<u16>,
    /// Cells equidistant from two or more sites.
    pub ties: u64,
}

pub fn partition_chunk(
    config: &WorldConfig,
    plates: &[Plate],
    bounds: ChunkBounds,
) -> PartitionChunk {
    let sites: Vec<HexCoord> = plates.iter().map(|p| p.site).collect();
    let width = config.width() as i32;
    let mut ties = 0;
    let plate_ids = bounds
        .coords()
        .map(|c| {
            let (i, tie) = nearest_site(c, &sites, width);
            ties += tie as u64;
            plates[i].id
        })
        .collect();
    PartitionChunk { plate_ids, ties }
}
