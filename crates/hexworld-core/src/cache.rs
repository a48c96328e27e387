//! Bounded per-layer chunk cache.
//!
//! Entries are write-once: the first caller to miss on a key computes the
//! value, concurrent callers for the same key block on the same slot and
//! receive that result. Eviction is least-recently-used. A stored entry whose
//! fingerprint no longer matches its key is dropped and recomputed.

use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;

use crate::chunk::ChunkCoord;
use crate::config::WorldConfig;
use crate::error::{Result, WorldError};

/// Pipeline stages that cache their output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    HeightMacro,
    HeightResample,
    HeightDespeckle,
    Plates,
    Partition,
    Boundary,
    Relief,
    Polish,
    Climate,
    Drainage,
    Hydrology,
    Erosion,
    Terrain,
}

impl Layer {
    pub fn name(self) -> &'static str {
        match self {
            Layer::HeightMacro => "height-macro",
            Layer::HeightResample => "height-resample",
            Layer::HeightDespeckle => "height-despeckle",
            Layer::Plates => "plates",
            Layer::Partition => "partition",
            Layer::Boundary => "boundary",
            Layer::Relief => "relief",
            Layer::Polish => "polish",
            Layer::Climate => "climate",
            Layer::Drainage => "drainage",
            Layer::Hydrology => "hydrology",
            Layer::Erosion => "erosion",
            Layer::Terrain => "terrain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub cx: u32,
    pub cy: u32,
    pub layer: Layer,
    pub fingerprint: u64,
}

impl ChunkKey {
    pub fn new(chunk: ChunkCoord, layer: Layer, fingerprint: u64) -> Self {
        Self { cx: chunk.cx, cy: chunk.cy, layer, fingerprint }
    }

    /// Key for a stage computed once per world rather than per chunk.
    pub fn global(layer: Layer, fingerprint: u64) -> Self {
        Self { cx: 0, cy: 0, layer, fingerprint }
    }
}

/// Fingerprint of everything a layer's output depends on. Parameters that
/// cannot be serialised are a configuration error.
pub fn fingerprint<P: Serialize>(
    layer: Layer,
    config: &WorldConfig,
    seed: u64,
    upstream: u64,
    params: &P,
) -> Result<u64> {
    let mut h = SipHasher24::new_with_keys(0x6368_756e_6b73, 0x6669_6e67_6572);
    h.write(layer.name().as_bytes());
    let active = config.active_size();
    for v in [active.width, active.height, config.macro_size.width, config.macro_size.height] {
        h.write_u32(v);
    }
    h.write_u32(config.chunk_size.width);
    h.write_u32(config.chunk_size.height);
    h.write_u64(seed);
    h.write_u64(upstream);
    let bytes = serde_json::to_vec(params).map_err(|e| {
        let msg = format!("{} parameters cannot be fingerprinted: {e}", layer.name());
        WorldError::ConfigurationConflict(msg)
    })?;
    h.write(&bytes);
    Ok(h.finish())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub corruptions: u64,
    pub entries: usize,
}

impl std::ops::AddAssign for CacheStats {
    fn add_assign(&mut self, o: Self) {
        self.hits += o.hits;
        self.misses += o.misses;
        self.evictions += o.evictions;
        self.corruptions += o.corruptions;
        self.entries += o.entries;
    }
}

struct Stored<V> {
    fingerprint: u64,
    value: Arc<V>,
}

struct Entry<V> {
    slot: Arc<OnceLock<Stored<V>>>,
    last_used: u64,
}

struct Inner<V> {
    map: HashMap<ChunkKey, Entry<V>>,
    tick: u64,
}

pub struct ChunkCache<V> {
    layer: Layer,
    capacity: usize,
    inner: Mutex<Inner<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    corruptions: AtomicU64,
}

impl<V> ChunkCache<V> {
    pub fn new(layer: Layer, capacity: usize) -> Self {
        Self {
            layer,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner { map: HashMap::new(), tick: 0 }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            corruptions: AtomicU64::new(0),
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached value for `key`, computing it on a miss.
    pub fn get_or_compute(&self, key: ChunkKey, compute: impl FnOnce() -> V) -> Arc<V> {
        let slot = {
            let mut inner = self.inner.lock();
            inner.tick += 1;
            let tick = inner.tick;

            let mut corrupted = false;
            if let Some(entry) = inner.map.get_mut(&key) {
                entry.last_used = tick;
                match entry.slot.get() {
                    Some(stored) if stored.fingerprint == key.fingerprint => {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        return Arc::clone(&stored.value);
                    }
                    Some(_) => corrupted = true,
                    // Still being computed by another caller.
                    None => {}
                }
            }
            if corrupted {
                inner.map.remove(&key);
                self.corruptions.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "{} chunk ({}, {}) failed fingerprint check, recomputing",
                    self.layer.name(),
                    key.cx,
                    key.cy
                );
            }

            let pending = inner.map.get(&key).map(|e| Arc::clone(&e.slot));
            match pending {
                Some(slot) => slot,
                None => {
                    self.evict_down_to(&mut inner, self.capacity - 1);
                    let slot = Arc::new(OnceLock::new());
                    inner.map.insert(key, Entry { slot: Arc::clone(&slot), last_used: tick });
                    slot
                }
            }
        };

        let mut computed = false;
        let stored = slot.get_or_init(|| {
            computed = true;
            Stored { fingerprint: key.fingerprint, value: Arc::new(compute()) }
        });
        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Arc::clone(&stored.value)
    }

    /// Evict completed entries, oldest first. Entries still being computed
    /// are never evicted, so the map may briefly exceed capacity.
    fn evict_down_to(&self, inner: &mut Inner<V>, target: usize) {
        while inner.map.len() > target {
            let oldest = inner
                .map
                .iter()
                .filter(|(_, e)| e.slot.get().is_some())
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| *k);
            let Some(k) = oldest else { break };
            inner.map.remove(&k);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            trace!("{} evicted chunk ({}, {})", self.layer.name(), k.cx, k.cy);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().map.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            corruptions: self.corruptions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Overwrite the stored fingerprint of a completed entry.
    #[cfg(test)]
    pub(crate) fn poison(&self, key: &ChunkKey) {
        let mut inner = self.inner.lock();
        let Some(entry) = inner.map.get_mut(key) else { return };
        let Some(stored) = entry.slot.get() else { return };
        let bad = OnceLock::new();
        let _ = bad.set(Stored {
            fingerprint: stored.fingerprint ^ 1,
            value: Arc::clone(&stored.value),
        });
        entry.slot = Arc::new(bad);
    }
}
