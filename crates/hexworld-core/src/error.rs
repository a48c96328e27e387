//! Error taxonomy for world generation.
//!
//! Only conditions a caller can act on are errors. Algorithmic ties and cache
//! fingerprint mismatches are counted in the generation statistics instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Row outside the world's non-wrapping Y range.
    #[error("coordinate ({q}, {r}) is outside the world rows 0..{height}")]
    InvalidCoordinate { q: i32, r: i32, height: u32 },

    /// Inconsistent world configuration, detected before any layer runs.
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),

    /// Chunk row outside the chunk grid. Chunk columns wrap like cells do.
    #[error("chunk ({cx}, {cy}) is outside the chunk grid")]
    InvalidChunk { cx: i32, cy: i32 },

    /// A sub-seed override names a layer that does not exist.
    #[error("unknown layer `{0}` in seed overrides")]
    UnknownLayer(String),
}

pub type Result<T> = std::result::Result<T, WorldError>;
