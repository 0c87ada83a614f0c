// Construction errors.
//
// Only building a hash can fail. Once a `SpatialHash` exists every operation
// clamps its inputs to the grid instead of rejecting them, so nothing after
// `SpatialHash::new` returns a `Result`.

use crate::types::Rect;

/// Why a `SpatialHash` could not be built.
#[derive(Debug, thiserror::Error)]
pub enum SpatialHashError {
    /// Width or height was zero.
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    /// `width * height` buckets do not fit in memory addressing.
    #[error("grid of {width}x{height} cells is too large")]
    GridTooLarge { width: u32, height: u32 },

    /// World bounds have zero area or contain non-finite values.
    #[error("world bounds {bounds} must be finite with a positive size on both axes")]
    DegenerateBounds { bounds: Rect },

    /// Config JSON failed to parse.
    #[error("invalid spatial hash config: {0}")]
    Config(#[from] serde_json::Error),
}
