// Fixed-size uniform grid spatial hash.
//
// The grid covers a world-space `Rect` with `width × height` equal cells,
// stored as a flat `Vec` of buckets indexed by `x + y * width`. Each bucket
// holds the handles of the items whose bounding box overlaps that cell; an
// item straddling cell edges is referenced from every cell it touches.
//
// World positions map to cells with a precomputed inverse cell size, then
// clamp to the edge cells, so a box partly (or entirely) outside the world
// lands on the border instead of failing. Every externally supplied
// `HashBounds` is clamped the same way before it is used to index buckets.
//
// The grid never resizes. Insertion, removal and query cost depend only on
// the number of cells an item or query covers, not on the total number of
// items.
//
// Item bookkeeping lives on the items themselves (see `hashable.rs`): the
// hash writes each item's registered range on insert/remove and stamps query
// ids during queries. `remove` trusts the recorded range rather than the
// item's current position, so it stays correct when an item moved without an
// `update_collider` call.
//
// Clearing policy: `clear()` empties the buckets and leaves item bookkeeping
// alone, so items keep a stale registered range. `remove` on such an item is
// a safe no-op for the grid. `update_collider` on such an item with
// unchanged cells is NOT a re-insert; callers that clear and then keep
// updating the same items should use `clear_and_reset()` instead.
//
// See also: `query.rs` for the lazy deduplicating scan, `config.rs` for
// JSON-driven construction.

use crate::config::SpatialHashConfig;
use crate::error::SpatialHashError;
use crate::hashable::{ColliderArena, Hashable};
use crate::query::NearbyColliders;
use crate::types::{CellIndex, HashBounds, QueryId, Rect};
use glam::Vec2;
use smallvec::SmallVec;

/// Handles registered in one cell. Most cells hold a handful of items, so the
/// first few live inline.
pub(crate) type Bucket<K> = SmallVec<[K; 4]>;

/// Uniform grid broad-phase index over item handles `K`.
#[derive(Clone, Debug)]
pub struct SpatialHash<K> {
    /// Flat storage: index = x + y * width.
    buckets: Vec<Bucket<K>>,
    bounds: Rect,
    width: u32,
    height: u32,
    /// Cells per world unit on each axis.
    inv_size: Vec2,
    next_query_id: u64,
}

impl<K: Copy + Eq> SpatialHash<K> {
    /// Create an empty grid of `width × height` cells covering `bounds`.
    ///
    /// `bounds` is normalized to a non-negative size first. Fails if either
    /// dimension is zero, the buckets cannot be allocated, or the normalized
    /// bounds are non-finite or have zero area.
    pub fn new(bounds: Rect, width: u32, height: u32) -> Result<Self, SpatialHashError> {
        if width == 0 || height == 0 {
            return Err(SpatialHashError::ZeroDimension { width, height });
        }
        let cell_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(SpatialHashError::GridTooLarge { width, height })?;

        let bounds = bounds.abs();
        if !bounds.is_finite() || bounds.size.x <= 0.0 || bounds.size.y <= 0.0 {
            return Err(SpatialHashError::DegenerateBounds { bounds });
        }

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(cell_count)
            .map_err(|_| SpatialHashError::GridTooLarge { width, height })?;
        buckets.resize_with(cell_count, SmallVec::new);
        let inv_size = Vec2::new(width as f32, height as f32) / bounds.size;

        log::debug!("spatial hash created: {width}x{height} cells over {bounds}");

        Ok(Self {
            buckets,
            bounds,
            width,
            height,
            inv_size,
            next_query_id: 1,
        })
    }

    /// Build from a loaded `SpatialHashConfig`.
    pub fn from_config(config: &SpatialHashConfig) -> Result<Self, SpatialHashError> {
        Self::new(config.bounds, config.width, config.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// World area covered, with non-negative size.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// World-space size of one cell.
    pub fn cell_size(&self) -> Vec2 {
        self.bounds.size / Vec2::new(self.width as f32, self.height as f32)
    }

    /// Cell containing `position`. Positions outside the world (and NaN
    /// components) snap to the nearest edge cell.
    pub fn get_cell_index(&self, position: Vec2) -> CellIndex {
        let local = ((position - self.bounds.position) * self.inv_size).floor();
        CellIndex::new(clamp_axis(local.x, self.width), clamp_axis(local.y, self.height))
    }

    /// Cell range covered by the box with the given corners. The corners may
    /// be passed in either order on each axis.
    pub fn hash_bounds_for(&self, top_left: Vec2, bottom_right: Vec2) -> HashBounds {
        let a = self.get_cell_index(top_left);
        let b = self.get_cell_index(bottom_right);
        HashBounds::new(a.min(b), a.max(b))
    }

    /// Register `key` in every cell overlapped by the box and record the
    /// range on `item`.
    ///
    /// Inserting an item that is already registered duplicates its bucket
    /// membership; call `update_collider` for items that move.
    pub fn insert<T>(&mut self, key: K, item: &mut T, top_left: Vec2, bottom_right: Vec2)
    where
        T: Hashable + ?Sized,
    {
        let range = self.hash_bounds_for(top_left, bottom_right);
        item.set_registered_hash_bounds(Some(range));
        for cell in range.cells() {
            let index = self.index(cell);
            self.buckets[index].push(key);
        }
    }

    /// Drop `key` from every cell of `item`'s recorded range and mark the
    /// item unregistered. No-op if the item is not registered.
    pub fn remove<T>(&mut self, key: K, item: &mut T)
    where
        T: Hashable + ?Sized,
    {
        let Some(range) = item.registered_hash_bounds() else {
            return;
        };
        item.set_registered_hash_bounds(None);
        for cell in self.clamp_range(range).cells() {
            let index = self.index(cell);
            let bucket = &mut self.buckets[index];
            if let Some(slot) = bucket.iter().position(|&k| k == key) {
                bucket.remove(slot);
            }
        }
    }

    /// Whether the box now covers a different cell range than the one
    /// recorded on `item`. Always true for an unregistered item.
    pub fn collider_has_moved_cells<T>(&self, item: &T, top_left: Vec2, bottom_right: Vec2) -> bool
    where
        T: Hashable + ?Sized,
    {
        item.registered_hash_bounds() != Some(self.hash_bounds_for(top_left, bottom_right))
    }

    /// Re-register `key` under the new box if it changed cells. Returns
    /// whether any bucket was touched. An unregistered item is inserted.
    pub fn update_collider<T>(
        &mut self,
        key: K,
        item: &mut T,
        top_left: Vec2,
        bottom_right: Vec2,
    ) -> bool
    where
        T: Hashable + ?Sized,
    {
        if !self.collider_has_moved_cells(item, top_left, bottom_right) {
            return false;
        }
        log::trace!(
            "collider moved cells: {:?} -> {}",
            item.registered_hash_bounds(),
            self.hash_bounds_for(top_left, bottom_right)
        );
        self.remove(key, item);
        self.insert(key, item, top_left, bottom_right);
        true
    }

    /// Lazily yield every distinct item registered within `radius` cells of
    /// `hash_bounds`.
    ///
    /// `hash_bounds` is usually the querying item's own registered range, or
    /// one built with `hash_bounds_for` for a point that is not in the grid.
    /// `None` yields nothing. The querying item itself is not filtered out.
    /// Order follows the cell scan and is not part of the contract.
    pub fn find_nearby_colliders<'a, A>(
        &'a mut self,
        hash_bounds: Option<HashBounds>,
        radius: u32,
        arena: &'a mut A,
    ) -> NearbyColliders<'a, K, A>
    where
        A: ColliderArena<K> + ?Sized,
    {
        let range = hash_bounds.map(|b| {
            self.clamp_range(b)
                .expand(radius, self.width, self.height)
        });
        let query_id = match range {
            Some(_) => self.mint_query_id(),
            None => QueryId::NONE,
        };
        NearbyColliders::new(&self.buckets, self.width, arena, query_id, range)
    }

    /// Empty every bucket. Items keep their recorded ranges; see the module
    /// notes on clearing.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        log::debug!("spatial hash cleared ({}x{})", self.width, self.height);
    }

    /// Mark every item still in the grid unregistered, then `clear()`.
    pub fn clear_and_reset<A>(&mut self, arena: &mut A)
    where
        A: ColliderArena<K> + ?Sized,
    {
        for &key in self.buckets.iter().flatten() {
            if let Some(collider) = arena.collider_mut(key) {
                collider.set_registered_hash_bounds(None);
            }
        }
        self.clear();
    }

    /// Handles registered in `cell`, or `None` if the cell is off the grid.
    pub fn bucket(&self, cell: CellIndex) -> Option<&[K]> {
        self.in_grid(cell)
            .then(|| self.buckets[self.index(cell)].as_slice())
    }

    /// World-space area of `cell`, or `None` if the cell is off the grid.
    pub fn cell_rect(&self, cell: CellIndex) -> Option<Rect> {
        if !self.in_grid(cell) {
            return None;
        }
        let size = self.cell_size();
        let offset = Vec2::new(cell.x as f32, cell.y as f32) * size;
        Some(Rect::new(self.bounds.position + offset, size))
    }

    /// Every non-empty cell with its handles, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (CellIndex, &[K])> + '_ {
        let width = self.width as usize;
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(move |(i, bucket)| {
                let cell = CellIndex::new((i % width) as u32, (i / width) as u32);
                (cell, bucket.as_slice())
            })
    }

    /// True if no cell holds any handle.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.is_empty())
    }

    fn in_grid(&self, cell: CellIndex) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Flat bucket index. `cell` must be on the grid.
    fn index(&self, cell: CellIndex) -> usize {
        cell.x as usize + cell.y as usize * self.width as usize
    }

    /// Cut `range` down to the part that lies on this grid. A range entirely
    /// off the grid comes back empty.
    fn clamp_range(&self, range: HashBounds) -> HashBounds {
        let last = CellIndex::new(self.width - 1, self.height - 1);
        HashBounds::new(range.start, range.end.min(last))
    }

    fn mint_query_id(&mut self) -> QueryId {
        let id = QueryId(self.next_query_id);
        // Skip NONE on wrap so a fresh item is never treated as visited.
        self.next_query_id = self.next_query_id.wrapping_add(1).max(1);
        id
    }
}

/// Clamp a floored cell coordinate into `[0, len - 1]`. `as` saturates on
/// overflow and maps NaN to 0.
fn clamp_axis(value: f32, len: u32) -> u32 {
    (value as i64).clamp(0, i64::from(len) - 1) as u32
}
