// Core value types shared by the spatial hash.
//
// Defines grid coordinates (`CellIndex`), the inclusive cell range an item
// occupies (`HashBounds`), the per-query deduplication tag (`QueryId`), and
// the axis-aligned world rectangle (`Rect`) a grid covers. Points are plain
// `glam::Vec2`.
//
// "Not registered" is modelled as `Option<HashBounds>::None` everywhere. There
// is no sentinel cell pair; every `HashBounds` value names real cells (though
// a hand-built one may lie outside a particular grid, which is why `grid.rs`
// clamps every range it is given before indexing).
//
// See also: `hashable.rs` for the trait that stores these on items,
// `grid.rs` for the code that computes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Grid coordinates
// ---------------------------------------------------------------------------

/// A cell coordinate on the grid. `x` grows with world X, `y` with world Y.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellIndex {
    pub x: u32,
    pub y: u32,
}

impl CellIndex {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangular range of cells, `start` to `end` on both axes.
///
/// Ranges produced by `SpatialHash::hash_bounds_for` always satisfy
/// `start.x <= end.x && start.y <= end.y`. A hand-built range that violates
/// this covers no cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashBounds {
    pub start: CellIndex,
    pub end: CellIndex,
}

impl HashBounds {
    pub const fn new(start: CellIndex, end: CellIndex) -> Self {
        Self { start, end }
    }

    /// Range covering exactly one cell.
    pub const fn single(cell: CellIndex) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }

    /// True if the range covers no cells.
    pub fn is_empty(&self) -> bool {
        self.start.x > self.end.x || self.start.y > self.end.y
    }

    /// Whether `cell` lies inside the range (inclusive on both ends).
    pub fn contains(&self, cell: CellIndex) -> bool {
        (self.start.x..=self.end.x).contains(&cell.x)
            && (self.start.y..=self.end.y).contains(&cell.y)
    }

    /// Number of cells covered, saturating at `usize::MAX`.
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let w = u64::from(self.end.x - self.start.x) + 1;
        let h = u64::from(self.end.y - self.start.y) + 1;
        w.checked_mul(h)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX)
    }

    /// Every covered cell, row by row (`y` outer, `x` inner).
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + use<> {
        let (start, end) = (self.start, self.end);
        (start.y..=end.y).flat_map(move |y| (start.x..=end.x).map(move |x| CellIndex::new(x, y)))
    }

    /// Grow outward by `radius` cells on every side, staying inside a
    /// `width × height` grid. A zero dimension pins that axis to cell 0.
    pub fn expand(&self, radius: u32, width: u32, height: u32) -> Self {
        Self {
            start: CellIndex::new(
                self.start.x.saturating_sub(radius),
                self.start.y.saturating_sub(radius),
            ),
            end: CellIndex::new(
                self.end.x.saturating_add(radius).min(width.saturating_sub(1)),
                self.end.y.saturating_add(radius).min(height.saturating_sub(1)),
            ),
        }
    }
}

impl fmt::Display for HashBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Query tags
// ---------------------------------------------------------------------------

/// Tag written onto items as a query visits them.
///
/// `QueryId::NONE` is what a fresh item carries. The hash never mints it,
/// so an item that has never been visited cannot be mistaken for one that
/// the current query already yielded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(pub u64);

impl QueryId {
    pub const NONE: Self = Self(0);
}

// ---------------------------------------------------------------------------
// World-space rectangle
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle given by its minimum corner and its size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// The rectangle spanned by two opposite corners, in either order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        Self {
            position: min,
            size: a.max(b) - min,
        }
    }

    /// Same area with a non-negative size. A negative extent moves the
    /// position back along that axis.
    pub fn abs(&self) -> Self {
        Self {
            position: self.position + self.size.min(Vec2::ZERO),
            size: self.size.abs(),
        }
    }

    /// The corner opposite `position`.
    pub fn end(&self) -> Vec2 {
        self.position + self.size
    }

    /// Whether every component of the rectangle is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.size.is_finite()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.end();
        write!(
            f,
            "[({}, {})..({}, {})]",
            self.position.x, self.position.y, end.x, end.y
        )
    }
}
