//! Pipeline orchestrator: runs every layer in order, chunk by chunk, through
//! the per-layer caches.
//!
//! Pipeline order:
//!   1. Height: macro synthesis → resample → despeckle
//!   2. Tectonics: plates → partition → boundaries → relief
//!   3. Polish
//!   4. Climate
//!   5. Hydrology: drainage (global) → rivers (chunked)
//!   6. Erosion
//!   7. Terrain
//!
//! Each stage materialises its full field before the next one starts.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cache::{fingerprint, CacheStats, ChunkCache, ChunkKey, Layer};
use crate::chunk::{map_chunks, ChunkCoord, Window};
use crate::climate::{ClimateCell, ClimateModel};
use crate::config::{Profile, WorldConfig};
use crate::erosion::{channel_field, erode_window, erosion_halo};
use crate::error::Result;
use crate::heightfield::{Field, HeightField};
use crate::hydraulic::{hydrology_chunk, route_drainage, Drainage, HydrologyChunk, HYDROLOGY_HALO};
use crate::noise::{despeckle, resample_chunk, synthesize_macro};
use crate::params::ProfileParams;
use crate::plates::boundaries::{classify_chunk, BoundaryChunk, BoundaryKind};
use crate::plates::partition::{partition_chunk, PartitionChunk};
use crate::plates::relief::{relief_chunk, ReliefChunk};
use crate::plates::{generate_plates, BoundaryCell, BoundaryInfo, Plate};
use crate::polish::{polish_halo, polish_window};
use crate::seeds::{splitmix64, SeedSet};
use crate::terrain::{terrain_chunk, TerrainType};
use crate::world::World;

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub world_seed: u64,
    #[serde(default = "default_profile")]
    pub profile: Profile,
    /// Explicit sub-seeds by layer key.
    #[serde(default)]
    pub seed_overrides: BTreeMap<String, u64>,
}

fn default_profile() -> Profile {
    Profile::Dev
}

impl GenerationRequest {
    pub fn new(world_seed: u64, profile: Profile) -> Self {
        Self { world_seed, profile, seed_overrides: BTreeMap::new() }
    }

    pub fn with_override(mut self, layer: &str, seed: u64) -> Self {
        self.seed_overrides.insert(layer.to_string(), seed);
        self
    }
}

/// Ambiguities resolved by a fixed precedence rule during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieCounts {
    pub partition: u64,
    pub boundary: u64,
    pub relief: u64,
    pub provisional_flow: u64,
    pub routing: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub seeds: BTreeMap<String, u64>,
    pub plates: usize,
    pub ties: TieCounts,
    /// Land cells with no strictly lower neighbour before depression filling.
    pub provisional_sinks: u64,
    pub lakes: usize,
    pub endorheic_lakes: usize,
    pub river_cells: usize,
    /// Cumulative per-layer cache counters of the generator.
    pub cache: BTreeMap<String, CacheStats>,
    pub elapsed_ms: u64,
}

struct LayerCaches {
    height_macro: ChunkCache<HeightField>,
    resample: ChunkCache<Vec<f32>>,
    despeckle: ChunkCache<Vec<f32>>,
    plates: ChunkCache<Vec<Plate>>,
    partition: ChunkCache<PartitionChunk>,
    boundary: ChunkCache<BoundaryChunk>,
    relief: ChunkCache<ReliefChunk>,
    polish: ChunkCache<Vec<f32>>,
    climate: ChunkCache<Vec<ClimateCell>>,
    drainage: ChunkCache<Drainage>,
    hydrology: ChunkCache<HydrologyChunk>,
    erosion: ChunkCache<Vec<f32>>,
    terrain: ChunkCache<Vec<TerrainType>>,
}

impl LayerCaches {
    fn new(capacity: usize) -> Self {
        Self {
            height_macro: ChunkCache::new(Layer::HeightMacro, capacity),
            resample: ChunkCache::new(Layer::HeightResample, capacity),
            despeckle: ChunkCache::new(Layer::HeightDespeckle, capacity),
            plates: ChunkCache::new(Layer::Plates, capacity),
            partition: ChunkCache::new(Layer::Partition, capacity),
            boundary: ChunkCache::new(Layer::Boundary, capacity),
            relief: ChunkCache::new(Layer::Relief, capacity),
            polish: ChunkCache::new(Layer::Polish, capacity),
            climate: ChunkCache::new(Layer::Climate, capacity),
            drainage: ChunkCache::new(Layer::Drainage, capacity),
            hydrology: ChunkCache::new(Layer::Hydrology, capacity),
            erosion: ChunkCache::new(Layer::Erosion, capacity),
            terrain: ChunkCache::new(Layer::Terrain, capacity),
        }
    }

    fn stats(&self) -> BTreeMap<String, CacheStats> {
        let all = [
            (Layer::HeightMacro, self.height_macro.stats()),
            (Layer::HeightResample, self.resample.stats()),
            (Layer::HeightDespeckle, self.despeckle.stats()),
            (Layer::Plates, self.plates.stats()),
            (Layer::Partition, self.partition.stats()),
            (Layer::Boundary, self.boundary.stats()),
            (Layer::Relief, self.relief.stats()),
            (Layer::Polish, self.polish.stats()),
            (Layer::Climate, self.climate.stats()),
            (Layer::Drainage, self.drainage.stats()),
            (Layer::Hydrology, self.hydrology.stats()),
            (Layer::Erosion, self.erosion.stats()),
            (Layer::Terrain, self.terrain.stats()),
        ];
        all.into_iter().map(|(l, s)| (l.name().to_string(), s)).collect()
    }
}

/// Fold two upstream fingerprints into one.
fn chain(a: u64, b: u64) -> u64 {
    splitmix64(a ^ b.rotate_left(17))
}

/// Run a chunk-local layer over every chunk through its cache.
fn run_layer<V, F>(cache: &ChunkCache<V>, chunks: &[ChunkCoord], fp: u64, compute: F) -> Vec<Arc<V>>
where
    V: Send + Sync,
    F: Fn(ChunkCoord) -> V + Sync + Send,
{
    map_chunks(chunks, |c| cache.get_or_compute(ChunkKey::new(c, cache.layer(), fp), || compute(c)))
}

/// Stitch per-chunk vectors into a full field.
fn stitch<T: Clone>(
    config: &WorldConfig,
    chunks: &[ChunkCoord],
    parts: &[Arc<Vec<T>>],
    fill: T,
) -> Field<T> {
    let slices: Vec<&[T]> = parts.iter().map(|p| p.as_slice()).collect();
    Field::from_chunks(config, chunks, &slices, fill)
}

/// Deterministic world generator with chunk caches shared across requests.
pub struct WorldGenerator {
    config: WorldConfig,
    params: Option<ProfileParams>,
    caches: LayerCaches,
}

impl WorldGenerator {
    /// Profile-keyed default parameters.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let capacity = ProfileParams::for_profile(config.profile).cache.capacity;
        Ok(Self { config, params: None, caches: LayerCaches::new(capacity) })
    }

    /// Explicit parameters for every request.
    pub fn with_params(config: WorldConfig, params: ProfileParams) -> Result<Self> {
        config.validate()?;
        let capacity = params.cache.capacity;
        Ok(Self { config, params: Some(params), caches: LayerCaches::new(capacity) })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> BTreeMap<String, CacheStats> {
        self.caches.stats()
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<World> {
        let started = Instant::now();
        let config = WorldConfig { profile: request.profile, ..self.config.clone() };
        config.validate()?;
        let params =
            self.params.clone().unwrap_or_else(|| ProfileParams::for_profile(request.profile));
        let seeds = SeedSet::derive(request.world_seed, &request.seed_overrides)?;
        let chunks = config.chunks();
        let c = &self.caches;
        info!(
            "generating world seed={} profile={} size={}x{} chunks={}",
            request.world_seed,
            config.profile.name(),
            config.width(),
            config.height(),
            chunks.len()
        );

        // ── 1. Height ────────────────────────────────────────────────────────
        let height_seed = seeds.seed("height")?;
        let fp_macro = fingerprint(Layer::HeightMacro, &config, height_seed, 0, &params.height)?;
        let macro_key = ChunkKey::global(Layer::HeightMacro, fp_macro);
        let macro_field = c.height_macro.get_or_compute(macro_key, || {
            synthesize_macro(&config, &params.height, height_seed)
        });

        let fp_resample = fingerprint(Layer::HeightResample, &config, height_seed, fp_macro, &())?;
        let parts = run_layer(&c.resample, &chunks, fp_resample, |ch| {
            resample_chunk(&config, &macro_field, config.chunk_bounds(ch))
        });
        let resampled = stitch(&config, &chunks, &parts, 0.0f32);

        let fp_despeckle =
            fingerprint(Layer::HeightDespeckle, &config, height_seed, fp_resample, &())?;
        let parts = run_layer(&c.despeckle, &chunks, fp_despeckle, |ch| {
            let mut win = Window::gather(&config, &resampled, config.chunk_bounds(ch), 1);
            despeckle(&mut win);
            win.into_interior()
        });
        let base = stitch(&config, &chunks, &parts, 0.0f32);
        debug!("height: macro {}x{}, active field stitched", macro_field.width, macro_field.height);

        // ── 2. Tectonics ─────────────────────────────────────────────────────
        let tect_seed = seeds.seed("tectonics")?;
        let tp = &params.tectonics;
        let fp_plates = fingerprint(Layer::Plates, &config, tect_seed, fp_despeckle, tp)?;
        let plates = c.plates.get_or_compute(ChunkKey::global(Layer::Plates, fp_plates), || {
            generate_plates(&config, tp, tect_seed, &base)
        });

        let fp_partition = fingerprint(Layer::Partition, &config, tect_seed, fp_plates, tp)?;
        let parts = run_layer(&c.partition, &chunks, fp_partition, |ch| {
            partition_chunk(&config, &plates, config.chunk_bounds(ch))
        });
        let partition_ties: u64 = parts.iter().map(|p| p.ties).sum();
        let ids: Vec<Arc<Vec<u16>>> = parts.iter().map(|p| Arc::new(p.plate_ids.clone())).collect();
        let plate_ids = stitch(&config, &chunks, &ids, 0u16);

        let fp_boundary = fingerprint(Layer::Boundary, &config, tect_seed, fp_partition, tp)?;
        let parts = run_layer(&c.boundary, &chunks, fp_boundary, |ch| {
            let ids = Window::gather(&config, &plate_ids, config.chunk_bounds(ch), 1);
            classify_chunk(&ids, &plates, tp)
        });
        let boundary_ties: u64 = parts.iter().map(|p| p.ties).sum();
        let cells: Vec<Arc<Vec<BoundaryCell>>> =
            parts.iter().map(|p| Arc::new(p.cells.clone())).collect();
        let boundary_cells = stitch(&config, &chunks, &cells, BoundaryCell::interior(0));

        let relief_upstream = chain(fp_boundary, fp_despeckle);
        let fp_relief = fingerprint(Layer::Relief, &config, tect_seed, relief_upstream, tp)?;
        let corridor = tp.corridor as u32;
        let parts = run_layer(&c.relief, &chunks, fp_relief, |ch| {
            let b = config.chunk_bounds(ch);
            relief_chunk(
                &config,
                &Window::gather(&config, &boundary_cells, b, corridor),
                &Window::gather(&config, &base, b, corridor),
                &plates,
                tp,
                tect_seed,
            )
        });
        let relief_ties: u64 = parts.iter().map(|p| p.ties).sum();
        let heights: Vec<Arc<Vec<f32>>> =
            parts.iter().map(|p| Arc::new(p.height.clone())).collect();
        let tectonic = stitch(&config, &chunks, &heights, 0.0f32);
        let infos: Vec<Arc<Vec<BoundaryInfo>>> =
            parts.iter().map(|p| Arc::new(p.boundary.clone())).collect();
        let boundary = stitch(&config, &chunks, &infos, BoundaryInfo::NONE);
        debug!("tectonics: {} plates", plates.len());

        // ── 3. Polish ────────────────────────────────────────────────────────
        let polish_seed = seeds.seed("polish")?;
        let weight = boundary.map(|b| {
            if b.kind == BoundaryKind::Convergent {
                b.strength * b.falloff(tp.corridor)
            } else {
                0.0
            }
        });
        let fp_polish =
            fingerprint(Layer::Polish, &config, polish_seed, fp_relief, &params.polish)?;
        let halo = polish_halo(&params.polish);
        let parts = run_layer(&c.polish, &chunks, fp_polish, |ch| {
            let b = config.chunk_bounds(ch);
            let mut win = Window::gather(&config, &tectonic, b, halo);
            polish_window(&mut win, &Window::gather(&config, &weight, b, halo), &params.polish);
            win.into_interior()
        });
        let polished = stitch(&config, &chunks, &parts, 0.0f32);

        // ── 4. Climate ───────────────────────────────────────────────────────
        let climate_seed = seeds.seed("climate")?;
        let model = ClimateModel::new(&config, &params.climate, climate_seed);
        let fp_climate =
            fingerprint(Layer::Climate, &config, climate_seed, fp_polish, &params.climate)?;
        let halo = model.halo();
        let parts = run_layer(&c.climate, &chunks, fp_climate, |ch| {
            model.chunk(&Window::gather(&config, &polished, config.chunk_bounds(ch), halo))
        });
        let fill = ClimateCell { heat: 0.0, moisture: 0.0, biome: crate::climate::Biome::Ocean };
        let climate = stitch(&config, &chunks, &parts, fill);

        // ── 5. Hydrology ─────────────────────────────────────────────────────
        let hydro_seed = seeds.seed("hydrology")?;
        let hp = &params.hydrology;
        let fp_drainage = fingerprint(Layer::Drainage, &config, hydro_seed, fp_polish, hp)?;
        let drainage_key = ChunkKey::global(Layer::Drainage, fp_drainage);
        let drainage = c.drainage.get_or_compute(drainage_key, || {
            route_drainage(&config, &polished, hp)
        });
        let fp_hydrology = fingerprint(Layer::Hydrology, &config, hydro_seed, fp_drainage, hp)?;
        let parts = run_layer(&c.hydrology, &chunks, fp_hydrology, |ch| {
            let b = config.chunk_bounds(ch);
            let win = Window::gather(&config, &polished, b, HYDROLOGY_HALO);
            hydrology_chunk(&config, &win, b, &drainage, hp)
        });
        let provisional_sinks: u64 = parts.iter().map(|p| p.provisional_sinks).sum();
        let provisional_ties: u64 = parts.iter().map(|p| p.provisional_ties).sum();
        let rivers: Vec<Arc<Vec<bool>>> = parts.iter().map(|p| Arc::new(p.river.clone())).collect();
        let river = stitch(&config, &chunks, &rivers, false);
        let strengths: Vec<Arc<Vec<u32>>> =
            parts.iter().map(|p| Arc::new(p.river_strength.clone())).collect();
        let river_strength = stitch(&config, &chunks, &strengths, 0u32);
        debug!(
            "hydrology: {} lakes ({} endorheic), {} provisional sinks",
            drainage.lakes.len(),
            drainage.endorheic_count(),
            provisional_sinks
        );

        // ── 6. Erosion ───────────────────────────────────────────────────────
        let erosion_seed = seeds.seed("erosion")?;
        let ep = &params.erosion;
        let channels = channel_field(&config, &polished, &drainage, hp.river_threshold);
        let fp_erosion = fingerprint(
            Layer::Erosion,
            &config,
            erosion_seed,
            chain(fp_polish, fp_hydrology),
            &(ep, hp.river_threshold),
        )?;
        let halo = erosion_halo(ep);
        let parts = run_layer(&c.erosion, &chunks, fp_erosion, |ch| {
            let b = config.chunk_bounds(ch);
            erode_window(
                &Window::gather(&config, &polished, b, halo),
                &Window::gather(&config, &channels, b, halo),
                ep,
                hp.river_threshold,
            )
        });
        let height = stitch(&config, &chunks, &parts, 0.0f32);

        // ── 7. Terrain ───────────────────────────────────────────────────────
        let fp_terrain = fingerprint(Layer::Terrain, &config, 0, fp_erosion, &())?;
        let parts = run_layer(&c.terrain, &chunks, fp_terrain, |ch| {
            terrain_chunk(&Window::gather(&config, &height, config.chunk_bounds(ch), 1))
        });
        let terrain = stitch(&config, &chunks, &parts, TerrainType::Ocean);

        let stats = GenerationStats {
            seeds: seeds.iter().map(|(k, v)| (k.to_string(), v)).collect(),
            plates: plates.len(),
            ties: TieCounts {
                partition: partition_ties,
                boundary: boundary_ties,
                relief: relief_ties,
                provisional_flow: provisional_ties,
                routing: drainage.routing_ties,
            },
            provisional_sinks,
            lakes: drainage.lakes.len(),
            endorheic_lakes: drainage.endorheic_count(),
            river_cells: river.data.iter().filter(|&&r| r).count(),
            cache: c.stats(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "world ready in {} ms: {} plates, {} lakes, {} river cells",
            stats.elapsed_ms, stats.plates, stats.lakes, stats.river_cells
        );

        Ok(World {
            config,
            seeds,
            plates: plates.as_ref().clone(),
            tectonic,
            polished,
            height,
            plate_ids,
            boundary,
            climate,
            drainage: drainage.as_ref().clone(),
            river,
            river_strength,
            terrain,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;
    use crate::error::WorldError;

    fn small() -> WorldConfig {
        WorldConfig {
            target_size: Size::new(256, 128),
            dev_size: Size::new(128, 64),
            macro_size: Size::new(128, 64),
            chunk_size: Size::new(32, 32),
            ..WorldConfig::dev()
        }
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let cfg = WorldConfig { chunk_size: Size::new(0, 64), ..WorldConfig::dev() };
        assert!(matches!(WorldGenerator::new(cfg), Err(WorldError::ConfigurationConflict(_))));
    }

    #[test]
    fn unknown_override_fails_before_any_layer_runs() {
        let gen = WorldGenerator::new(small()).unwrap();
        let req = GenerationRequest::new(1, Profile::Dev).with_override("weather", 3);
        assert!(matches!(gen.generate(&req), Err(WorldError::UnknownLayer(_))));
        assert!(gen.cache_stats().values().all(|s| s.misses == 0));
    }

    #[test]
    fn second_run_is_served_from_cache_and_identical() {
        let gen = WorldGenerator::new(small()).unwrap();
        let req = GenerationRequest::new(9, Profile::Dev);
        let a = gen.generate(&req).unwrap();
        let misses: u64 = gen.cache_stats().values().map(|s| s.misses).sum();
        let b = gen.generate(&req).unwrap();
        let after = gen.cache_stats();
        assert_eq!(after.values().map(|s| s.misses).sum::<u64>(), misses);
        assert!(after.values().map(|s| s.hits).sum::<u64>() > 0);
        assert_eq!(a.height, b.height);
        assert_eq!(a.climate, b.climate);
        assert_eq!(a.drainage, b.drainage);

        // A cold generator produces the same world.
        let cold = WorldGenerator::new(small()).unwrap().generate(&req).unwrap();
        assert_eq!(a.height, cold.height);
        assert_eq!(a.terrain, cold.terrain);
    }

    #[test]
    fn tiny_cache_evicts_without_changing_results() {
        let params = ProfileParams {
            cache: crate::params::CacheParams { capacity: 2 },
            ..ProfileParams::dev()
        };
        let small_cache = WorldGenerator::with_params(small(), params).unwrap();
        let req = GenerationRequest::new(5, Profile::Dev);
        let a = small_cache.generate(&req).unwrap();
        assert!(small_cache.cache_stats().values().any(|s| s.evictions > 0));
        let b = WorldGenerator::new(small()).unwrap().generate(&req).unwrap();
        assert_eq!(a.height, b.height);
        assert_eq!(a.climate, b.climate);
    }

    #[test]
    fn request_parses_from_json() {
        let text = r#"{"world_seed": 42, "seed_overrides": {"climate": 7}}"#;
        let req: GenerationRequest = serde_json::from_str(text).unwrap();
        assert_eq!(req.profile, Profile::Dev);
        assert_eq!(req.seed_overrides.get("climate"), Some(&7));
    }
}
