//! Deterministic, chunked generation of cylindrical hex worlds.
//!
//! Layers run in a fixed order: base height, tectonics, polish, climate,
//! hydrology, erosion, terrain. Each layer is computed per chunk from a halo
//! window so chunk seams are invisible, and cached by a fingerprint of its
//! inputs.

pub mod cache;
pub mod chunk;
pub mod climate;
pub mod config;
pub mod coords;
pub mod erosion;
pub mod error;
pub mod generator;
pub mod heightfield;
pub mod hydraulic;
pub mod metrics;
pub mod noise;
pub mod params;
pub mod plates;
pub mod polish;
pub mod seeds;
pub mod terrain;
pub mod world;

pub use config::{Profile, Size, WorldConfig};
pub use coords::HexCoord;
pub use error::{Result, WorldError};
pub use generator::{GenerationRequest, GenerationStats, WorldGenerator};
pub use world::{CellSample, Region, World, WorldSummary};
