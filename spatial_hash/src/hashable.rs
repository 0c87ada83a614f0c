// Item-side bookkeeping for the spatial hash.
//
// The grid stores handles (`K`), not items. Each item carries two fields that
// the hash reads and writes on its behalf:
// - the cell range it is currently registered in (`None` = not registered);
// - the id of the last query that yielded it, used to deduplicate items that
//   sit in several scanned buckets during one query.
//
// `Hashable` exposes those two fields. `HashState` is a ready-made pair that
// item types can embed and delegate to. `ColliderArena` resolves a handle to
// its item so a query can stamp tags while it scans; it is implemented for
// slices and vectors (handle = index) and for ordered and hashed maps.
//
// Once an item has been inserted, only the hash may write these fields.
// Changing them from outside while the item is registered leaves the grid and
// the item disagreeing about which buckets hold it.
//
// See also: `grid.rs` for the writer, `query.rs` for the tag stamping.

use crate::types::{HashBounds, QueryId};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Bookkeeping an item needs to live in a `SpatialHash`.
pub trait Hashable {
    /// Cell range the item is registered in, or `None`.
    fn registered_hash_bounds(&self) -> Option<HashBounds>;
    fn set_registered_hash_bounds(&mut self, bounds: Option<HashBounds>);

    /// Id of the last query that yielded this item.
    fn query_id(&self) -> QueryId;
    fn set_query_id(&mut self, id: QueryId);
}

/// Embeddable storage for the `Hashable` fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashState {
    pub registered_hash_bounds: Option<HashBounds>,
    pub query_id: QueryId,
}

impl HashState {
    pub fn is_registered(&self) -> bool {
        self.registered_hash_bounds.is_some()
    }
}

impl Hashable for HashState {
    fn registered_hash_bounds(&self) -> Option<HashBounds> {
        self.registered_hash_bounds
    }

    fn set_registered_hash_bounds(&mut self, bounds: Option<HashBounds>) {
        self.registered_hash_bounds = bounds;
    }

    fn query_id(&self) -> QueryId {
        self.query_id
    }

    fn set_query_id(&mut self, id: QueryId) {
        self.query_id = id;
    }
}

/// Handle-to-item lookup used while a query stamps tags.
pub trait ColliderArena<K> {
    type Collider: Hashable;

    /// The item behind `key`, or `None` if the handle is dangling.
    fn collider_mut(&mut self, key: K) -> Option<&mut Self::Collider>;
}

impl<T: Hashable> ColliderArena<usize> for [T] {
    type Collider = T;

    fn collider_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }
}

impl<T: Hashable> ColliderArena<usize> for Vec<T> {
    type Collider = T;

    fn collider_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }
}

impl<K: Ord, T: Hashable> ColliderArena<K> for BTreeMap<K, T> {
    type Collider = T;

    fn collider_mut(&mut self, key: K) -> Option<&mut T> {
        self.get_mut(&key)
    }
}

impl<K: Eq + Hash, T: Hashable, S: BuildHasher> ColliderArena<K> for HashMap<K, T, S> {
    type Collider = T;

    fn collider_mut(&mut self, key: K) -> Option<&mut T> {
        self.get_mut(&key)
    }
}
