//! Read-only snapshot of a generated world and its query surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkCoord;
use crate::climate::{Biome, ClimateCell};
use crate::config::{Size, WorldConfig};
use crate::coords::HexCoord;
use crate::error::{Result, WorldError};
use crate::generator::GenerationStats;
use crate::heightfield::{Field, HeightField};
use crate::hydraulic::{Drainage, FlowTarget, Lake};
use crate::metrics::{
    compute_biome_histogram, compute_land_components, compute_land_fraction,
    compute_seam_continuity, SeamResult,
};
use crate::plates::{BoundaryInfo, Plate, PlateKind};
use crate::seeds::SeedSet;
use crate::terrain::TerrainType;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LakeSample {
    pub id: u32,
    pub spill: Option<HexCoord>,
    pub endorheic: bool,
}

/// Everything known about one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSample {
    pub coord: HexCoord,
    pub chunk: ChunkCoord,
    pub height: f32,
    pub plate: u16,
    pub plate_kind: PlateKind,
    pub boundary: BoundaryInfo,
    pub heat: f32,
    pub moisture: f32,
    pub biome: Biome,
    pub terrain: TerrainType,
    pub flow: FlowTarget,
    pub accumulation: u32,
    pub river: bool,
    pub river_strength: u32,
    pub lake: Option<LakeSample>,
}

/// A rectangular block of cells, row-major, starting at canonical `(q0, r0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub q0: i32,
    pub r0: i32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellSample>,
}

/// Whole-world figures for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSummary {
    pub world_seed: u64,
    pub profile: String,
    pub size: Size,
    pub land_fraction: f32,
    /// Largest land masses, in cells.
    pub land_components: Vec<usize>,
    pub seam: SeamResult,
    pub biomes: BTreeMap<Biome, usize>,
    pub stats: GenerationStats,
}

#[derive(Debug, Clone)]
pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) seeds: SeedSet,
    pub(crate) plates: Vec<Plate>,
    pub(crate) tectonic: HeightField,
    pub(crate) polished: HeightField,
    pub(crate) height: HeightField,
    pub(crate) plate_ids: Field<u16>,
    pub(crate) boundary: Field<BoundaryInfo>,
    pub(crate) climate: Field<ClimateCell>,
    pub(crate) drainage: Drainage,
    pub(crate) river: Field<bool>,
    pub(crate) river_strength: Field<u32>,
    pub(crate) terrain: Field<TerrainType>,
    pub(crate) stats: GenerationStats,
}

impl World {
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    /// Height after tectonic relief, before polish.
    pub fn tectonic_height(&self) -> &HeightField {
        &self.tectonic
    }

    /// Polished height. Climate and drainage read this field.
    pub fn polished_height(&self) -> &HeightField {
        &self.polished
    }

    /// Final height after erosion.
    pub fn height(&self) -> &HeightField {
        &self.height
    }

    pub fn plate_ids(&self) -> &Field<u16> {
        &self.plate_ids
    }

    pub fn boundary(&self) -> &Field<BoundaryInfo> {
        &self.boundary
    }

    pub fn climate(&self) -> &Field<ClimateCell> {
        &self.climate
    }

    pub fn drainage(&self) -> &Drainage {
        &self.drainage
    }

    pub fn lakes(&self) -> &[Lake] {
        &self.drainage.lakes
    }

    pub fn river(&self) -> &Field<bool> {
        &self.river
    }

    pub fn river_strength(&self) -> &Field<u32> {
        &self.river_strength
    }

    pub fn terrain(&self) -> &Field<TerrainType> {
        &self.terrain
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Sample one cell. `q` wraps; rows outside the world are errors.
    pub fn cell(&self, q: i32, r: i32) -> Result<CellSample> {
        let c = self.config.canonicalize(q, r)?;
        Ok(self.sample(c))
    }

    fn sample(&self, c: HexCoord) -> CellSample {
        let k = self.config.index_of(c);
        let plate = self.plate_ids.data[k];
        let climate = self.climate.data[k];
        let lake = self.drainage.lake_of[k].map(|id| {
            let l = &self.drainage.lakes[id as usize];
            LakeSample { id, spill: l.spill, endorheic: l.endorheic }
        });
        CellSample {
            coord: c,
            chunk: self.config.chunk_of(c),
            height: self.height.data[k],
            plate,
            plate_kind: self.plates[plate as usize].kind,
            boundary: self.boundary.data[k],
            heat: climate.heat,
            moisture: climate.moisture,
            biome: climate.biome,
            terrain: self.terrain.data[k],
            flow: self.drainage.targets[k],
            accumulation: self.drainage.accumulation[k],
            river: self.river.data[k],
            river_strength: self.river_strength.data[k],
            lake,
        }
    }

    /// Cells of a `width × height` block. Columns wrap across the seam.
    pub fn region(&self, q0: i32, r0: i32, width: u32, height: u32) -> Result<Region> {
        let rows = self.config.height() as i32;
        let r1 = r0 as i64 + height as i64;
        if r0 < 0 || r1 > rows as i64 {
            let bad = if r0 < 0 { r0 } else { (r1 - 1) as i32 };
            return Err(WorldError::InvalidCoordinate { q: q0, r: bad, height: rows as u32 });
        }
        let start = self.config.canonicalize(q0, r0)?;
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for j in 0..height as i32 {
            for i in 0..width as i32 {
                cells.push(self.sample(self.config.canonicalize(start.q + i, r0 + j)?));
            }
        }
        Ok(Region { q0: start.q, r0, width, height, cells })
    }

    /// One chunk. `cx` wraps.
    pub fn chunk(&self, cx: i32, cy: i32) -> Result<Region> {
        let chunk = self.config.canonical_chunk(cx, cy)?;
        let b = self.config.chunk_bounds(chunk);
        self.region(b.q0 as i32, b.r0 as i32, b.width, b.height)
    }

    /// `nx × ny` chunks starting at `(cx0, cy0)`, stitched across the seam.
    pub fn chunk_range(&self, cx0: i32, cy0: i32, nx: u32, ny: u32) -> Result<Region> {
        let (gx, gy) = self.config.chunk_grid();
        if cy0 < 0 || cy0 as i64 + ny as i64 > gy as i64 || nx == 0 || ny == 0 {
            return Err(WorldError::InvalidChunk { cx: cx0, cy: cy0 });
        }
        let first = self.config.canonical_chunk(cx0, cy0)?;
        let last_row = self.config.chunk_bounds(ChunkCoord::new(first.cx, cy0 as u32 + ny - 1));
        let start = self.config.chunk_bounds(first);
        let rows = last_row.r0 + last_row.height - start.r0;
        let nx = nx.min(gx);
        let cols: u32 = (0..nx)
            .map(|i| self.config.chunk_bounds(ChunkCoord::new((first.cx + i) % gx, first.cy)).width)
            .sum();
        self.region(start.q0 as i32, start.r0 as i32, cols, rows)
    }

    pub fn summary(&self) -> WorldSummary {
        let components = compute_land_components(&self.config, &self.height);
        WorldSummary {
            world_seed: self.seeds.world_seed,
            profile: self.config.profile.name().to_string(),
            size: self.config.active_size(),
            land_fraction: compute_land_fraction(&self.height),
            land_components: components.sizes.into_iter().take(8).collect(),
            seam: compute_seam_continuity(&self.height),
            biomes: compute_biome_histogram(self.climate.data.iter().map(|c| &c.biome)),
            stats: self.stats.clone(),
        }
    }
}
