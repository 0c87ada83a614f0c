// Data-driven construction parameters for a spatial hash.
//
// `SpatialHashConfig` holds the world bounds and grid dimensions, loadable
// from JSON so a game can tune cell granularity per level without
// recompiling. `with_cell_size()` derives the dimensions from a minimum cell
// edge instead of a fixed count.
//
// Validation happens in `SpatialHash::new`; a config can describe an invalid
// grid and only fails when built.
//
// See also: `grid.rs` (`SpatialHash::from_config`).

use crate::error::SpatialHashError;
use crate::types::Rect;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// World bounds and grid dimensions for a `SpatialHash`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialHashConfig {
    /// World area covered by the grid.
    pub bounds: Rect,
    /// Number of cells along X.
    pub width: u32,
    /// Number of cells along Y.
    pub height: u32,
}

impl SpatialHashConfig {
    /// Grid over `bounds` whose cells are at least `min_cell_size` on each
    /// side. Each axis gets `floor(extent / min_cell_size)` cells, minimum 1,
    /// so the actual cell size is stretched to fill the bounds exactly.
    pub fn with_cell_size(bounds: Rect, min_cell_size: f32) -> Self {
        let bounds = bounds.abs();
        let counts = (bounds.size / Vec2::splat(min_cell_size)).floor();
        Self {
            bounds,
            width: cells_along(counts.x),
            height: cells_along(counts.y),
        }
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SpatialHashError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(Vec2::ZERO, Vec2::splat(1024.0)),
            width: 32,
            height: 32,
        }
    }
}

/// Whole cells along one axis. Saturating `as` keeps huge or non-finite
/// ratios in range; zero cells rounds up to one.
fn cells_along(count: f32) -> u32 {
    (count as u32).max(1)
}
