// spatial_hash: fixed-size uniform grid for 2D broad-phase queries.
//
// A world rectangle is split into `width × height` equal cells. Items are
// registered by bounding box into every cell the box overlaps, and neighbor
// queries scan a block of cells, yielding each distinct item once. Costs
// scale with the number of cells touched, not with the number of items.
//
// The grid stores copyable handles (`K`), never items. Items live in a
// caller-owned arena (a `Vec`, a map, an entity table...) and carry two
// bookkeeping fields the hash manages: their registered cell range and the
// id of the last query that visited them.
//
// Module overview:
// - `grid.rs`:     `SpatialHash<K>`: construction, cell mapping, insert /
//                  remove / update, queries, clearing, inspection.
// - `query.rs`:    `NearbyColliders` lazy deduplicating iterator + `QueryStats`.
// - `hashable.rs`: `Hashable` bookkeeping trait, `HashState`, `ColliderArena`.
// - `types.rs`:    `CellIndex`, `HashBounds`, `QueryId`, `Rect`.
// - `config.rs`:   `SpatialHashConfig`: JSON-loadable bounds + dimensions.
// - `error.rs`:    `SpatialHashError`: construction failures.
//
// Single-threaded by intent: no internal locking, and a query mutably borrows
// both the hash and the arena for as long as it is alive.

pub mod config;
pub mod error;
pub mod grid;
pub mod hashable;
pub mod query;
pub mod types;

pub use config::SpatialHashConfig;
pub use error::SpatialHashError;
pub use grid::SpatialHash;
pub use hashable::{ColliderArena, HashState, Hashable};
pub use query::{NearbyColliders, QueryStats};
pub use types::{CellIndex, HashBounds, QueryId, Rect};
