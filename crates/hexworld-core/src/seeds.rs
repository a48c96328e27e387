//! Sub-seed derivation.
//!
//! Every layer draws randomness only from its own sub-seed, so overriding one
//! layer's seed leaves every other layer's output untouched.

use std::collections::BTreeMap;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;

use crate::error::{Result, WorldError};

const SIP_K0: u64 = 0x6865_7877_6f72_6c64;
const SIP_K1: u64 = 0x7365_6564_2d64_6572;

/// Layer keys in pipeline order.
pub const LAYER_KEYS: [&str; 6] =
    ["height", "tectonics", "polish", "climate", "hydrology", "erosion"];

/// Stable sub-seed for `layer_key`. Identical across processes and platforms.
pub fn derive(world_seed: u64, layer_key: &str) -> u64 {
    let mut h = SipHasher24::new_with_keys(SIP_K0, SIP_K1);
    h.write(&world_seed.to_le_bytes());
    h.write_u8(0x1f);
    h.write(layer_key.as_bytes());
    h.finish()
}

/// Fold a 64-bit sub-seed into the 32-bit seed `noise::Perlin` takes.
#[inline]
pub fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Per-cell hash keyed by a sub-seed and a salt.
#[inline]
pub fn cell_hash(seed: u64, salt: u64, index: usize) -> u64 {
    splitmix64(seed ^ splitmix64(salt.wrapping_add(index as u64)))
}

/// Sub-seeds for every layer of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSet {
    pub world_seed: u64,
    seeds: BTreeMap<String, u64>,
}

impl SeedSet {
    /// Derive all layer sub-seeds, then apply explicit overrides.
    pub fn derive(world_seed: u64, overrides: &BTreeMap<String, u64>) -> Result<Self> {
        let mut seeds: BTreeMap<String, u64> =
            LAYER_KEYS.iter().map(|&k| (k.to_string(), derive(world_seed, k))).collect();
        for (layer, &seed) in overrides {
            match seeds.get_mut(layer.as_str()) {
                Some(slot) => *slot = seed,
                None => return Err(WorldError::UnknownLayer(layer.clone())),
            }
        }
        Ok(Self { world_seed, seeds })
    }

    /// Sub-seed of a known layer key.
    pub fn seed(&self, layer: &str) -> Result<u64> {
        self.seeds.get(layer).copied().ok_or_else(|| WorldError::UnknownLayer(layer.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.seeds.iter().map(|(k, &v)| (k.as_str(), v))
    }
}
