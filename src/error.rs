//! Error types for the strip-packing engine.

use thiserror::Error;

/// Errors that can occur while constructing layouts or running a search.
#[derive(Debug, Error)]
pub enum Error {
    /// The constructive heuristic scanned its whole randomized candidate set
    /// without finding a valid slot for a block.
    #[error("no valid placement for block {id} after scanning {candidates} candidate positions")]
    PlacementExhausted { id: u16, candidates: usize },

    /// The annealing neighbor search gave up after the configured number of
    /// relocation attempts.
    #[error("neighbor search exhausted after {attempts} relocation attempts")]
    NeighborExhausted { attempts: usize },

    /// A layout's free area went negative, which means overlapping or
    /// otherwise invalid placements slipped past the validity checks.
    #[error(
        "corrupted layout: free area {free_area} with occupied height {occupied_height} \
         in a width-{width} strip"
    )]
    CorruptedLayout {
        free_area: i64,
        occupied_height: u32,
        width: u32,
    },

    /// A block without a position was handed to an operation that needs one.
    #[error("block {id} has no position")]
    UnplacedBlock { id: u16 },

    /// A placed block extends past the strip's right edge. Stamping it would
    /// wrap into the row above through the row-major grid.
    #[error("block {id} spans columns {left}..={right} outside a width-{width} strip")]
    OutOfStrip {
        id: u16,
        left: u32,
        right: u32,
        width: u32,
    },

    /// Invalid configuration, detected before any search work begins.
    #[error("configuration error: {0}")]
    Config(String),

    /// The worker pool for parallel population construction failed to build.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
