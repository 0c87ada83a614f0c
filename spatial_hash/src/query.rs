// Lazy neighbor query over a block of grid cells.
//
// `NearbyColliders` walks the buckets of an inclusive cell range row by row
// and yields each handle whose item has not yet been stamped with this
// query's id, stamping it as it goes. An item that spans several scanned
// buckets is therefore yielded once, at the first bucket reached.
//
// Scanning only advances as far as the consumer pulls. Dropping the iterator
// early needs no cleanup; the partially stamped tags are harmless because
// the next query mints a new id. The iterator holds the hash's buckets and
// the arena for its whole lifetime, so neither can be mutated mid-scan.
//
// `QueryStats` counts cells entered and items yielded so far, for tuning cell
// size and radius.
//
// See also: `grid.rs` (`SpatialHash::find_nearby_colliders`) which builds
// the range and mints the id.

use crate::grid::Bucket;
use crate::hashable::{ColliderArena, Hashable};
use crate::types::{CellIndex, HashBounds, QueryId};
use std::iter::FusedIterator;

/// Scan counters for one query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Buckets entered, including the one currently being read.
    pub cells_scanned: usize,
    /// Distinct items yielded.
    pub colliders_yielded: usize,
}

/// Iterator returned by `SpatialHash::find_nearby_colliders`.
pub struct NearbyColliders<'a, K, A: ?Sized> {
    buckets: &'a [Bucket<K>],
    width: u32,
    arena: &'a mut A,
    query_id: QueryId,
    /// Remaining range; `None` once exhausted or for an empty query.
    range: Option<HashBounds>,
    cursor: CellIndex,
    /// Next slot to read inside the bucket at `cursor`.
    slot: usize,
    stats: QueryStats,
}

impl<'a, K, A> NearbyColliders<'a, K, A>
where
    K: Copy,
    A: ColliderArena<K> + ?Sized,
{
    /// `range` must already be clamped to the grid the buckets belong to.
    pub(crate) fn new(
        buckets: &'a [Bucket<K>],
        width: u32,
        arena: &'a mut A,
        query_id: QueryId,
        range: Option<HashBounds>,
    ) -> Self {
        let range = range.filter(|r| !r.is_empty());
        let cursor = range.map(|r| r.start).unwrap_or_default();
        let stats = QueryStats {
            cells_scanned: usize::from(range.is_some()),
            colliders_yielded: 0,
        };
        Self {
            buckets,
            width,
            arena,
            query_id,
            range,
            cursor,
            slot: 0,
            stats,
        }
    }

    /// Id this query stamps onto the items it yields. `QueryId::NONE` for a
    /// query that had nothing to scan.
    pub fn query_id(&self) -> QueryId {
        self.query_id
    }

    /// Counters for the part of the scan consumed so far.
    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// Move the cursor to the next cell of the range. Returns `false` when
    /// the range is exhausted.
    fn advance_cell(&mut self, range: HashBounds) -> bool {
        self.slot = 0;
        if self.cursor.x < range.end.x {
            self.cursor.x += 1;
        } else if self.cursor.y < range.end.y {
            self.cursor.x = range.start.x;
            self.cursor.y += 1;
        } else {
            self.range = None;
            return false;
        }
        self.stats.cells_scanned += 1;
        true
    }
}

impl<K, A> Iterator for NearbyColliders<'_, K, A>
where
    K: Copy,
    A: ColliderArena<K> + ?Sized,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let range = self.range?;
        let buckets = self.buckets;
        loop {
            let index = self.cursor.x as usize + self.cursor.y as usize * self.width as usize;
            let bucket = &buckets[index];
            while let Some(&key) = bucket.get(self.slot) {
                self.slot += 1;
                let Some(collider) = self.arena.collider_mut(key) else {
                    log::warn!(
                        "spatial hash bucket {} holds a handle the arena cannot resolve",
                        self.cursor
                    );
                    continue;
                };
                if collider.query_id() != self.query_id {
                    collider.set_query_id(self.query_id);
                    self.stats.colliders_yielded += 1;
                    return Some(key);
                }
            }
            if !self.advance_cell(range) {
                return None;
            }
        }
    }
}

impl<K, A> FusedIterator for NearbyColliders<'_, K, A>
where
    K: Copy,
    A: ColliderArena<K> + ?Sized,
{
}
