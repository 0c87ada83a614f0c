// End-to-end behaviour of the spatial hash from a caller's point of view.
//
// Items here are a small "collider" struct stored in a caller-owned arena and
// addressed by index, the way a game's collision system would use the hash.
// The randomized workload cross-checks every bucket against each item's
// recorded range after every step.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_hash::{
    CellIndex, ColliderArena, HashBounds, HashState, Hashable, QueryId, Rect, SpatialHash,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default)]
struct Collider {
    min: Vec2,
    max: Vec2,
    hash: HashState,
}

impl Collider {
    fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            hash: HashState::default(),
        }
    }
}

impl Hashable for Collider {
    fn registered_hash_bounds(&self) -> Option<HashBounds> {
        self.hash.registered_hash_bounds
    }

    fn set_registered_hash_bounds(&mut self, bounds: Option<HashBounds>) {
        self.hash.registered_hash_bounds = bounds;
    }

    fn query_id(&self) -> QueryId {
        self.hash.query_id
    }

    fn set_query_id(&mut self, id: QueryId) {
        self.hash.query_id = id;
    }
}

fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

fn grid_4x4() -> SpatialHash<usize> {
    SpatialHash::new(Rect::new(Vec2::ZERO, Vec2::splat(100.0)), 4, 4).unwrap()
}

fn insert_all(hash: &mut SpatialHash<usize>, colliders: &mut [Collider]) {
    for (key, collider) in colliders.iter_mut().enumerate() {
        let (min, max) = (collider.min, collider.max);
        hash.insert(key, collider, min, max);
    }
}

fn nearby(
    hash: &mut SpatialHash<usize>,
    bounds: Option<HashBounds>,
    radius: u32,
    colliders: &mut [Collider],
) -> BTreeSet<usize> {
    hash.find_nearby_colliders(bounds, radius, colliders).collect()
}

#[test]
fn single_cell_item_finds_neighbor_one_cell_away() {
    let mut hash = grid_4x4();
    let mut colliders = vec![
        Collider::new(v(10.0, 10.0), v(20.0, 20.0)),
        Collider::new(v(30.0, 30.0), v(40.0, 40.0)),
    ];
    insert_all(&mut hash, &mut colliders);

    let a_bounds = colliders[0].registered_hash_bounds();
    assert_eq!(a_bounds, Some(HashBounds::single(CellIndex::new(0, 0))));
    assert_eq!(
        colliders[1].registered_hash_bounds(),
        Some(HashBounds::single(CellIndex::new(1, 1)))
    );

    // Radius 0: nothing but A itself (self-exclusion is the caller's job).
    let others: BTreeSet<_> = nearby(&mut hash, a_bounds, 0, &mut colliders)
        .into_iter()
        .filter(|&key| key != 0)
        .collect();
    assert!(others.is_empty());

    let others: BTreeSet<_> = nearby(&mut hash, a_bounds, 1, &mut colliders)
        .into_iter()
        .filter(|&key| key != 0)
        .collect();
    assert_eq!(others, BTreeSet::from([1]));
}

#[test]
fn removing_a_two_by_two_item_empties_all_four_buckets() {
    let mut hash = grid_4x4();
    let mut collider = Collider::new(v(10.0, 10.0), v(30.0, 30.0));
    let (min, max) = (collider.min, collider.max);
    hash.insert(0, &mut collider, min, max);

    let bounds = HashBounds::new(CellIndex::new(0, 0), CellIndex::new(1, 1));
    assert_eq!(collider.registered_hash_bounds(), Some(bounds));
    for cell in bounds.cells() {
        assert_eq!(hash.bucket(cell), Some(&[0][..]));
    }

    hash.remove(0, &mut collider);
    for cell in bounds.cells() {
        assert_eq!(hash.bucket(cell), Some(&[][..]));
    }
    assert!(hash.is_empty());
    assert_eq!(collider.registered_hash_bounds(), None);
}

#[test]
fn ephemeral_probe_finds_every_item_in_its_cell_once() {
    let mut hash = grid_4x4();
    let mut colliders = vec![
        Collider::new(v(51.0, 51.0), v(55.0, 55.0)),
        Collider::new(v(60.0, 52.0), v(70.0, 60.0)),
        Collider::new(v(55.0, 70.0), v(74.0, 74.0)),
    ];
    insert_all(&mut hash, &mut colliders);

    // A point that is not itself registered.
    let probe = hash.hash_bounds_for(v(62.0, 62.0), v(62.0, 62.0));
    assert_eq!(probe, HashBounds::single(CellIndex::new(2, 2)));

    let found: Vec<_> = hash
        .find_nearby_colliders(Some(probe), 0, &mut colliders)
        .collect();
    assert_eq!(found.len(), 3);
    assert_eq!(
        found.into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([0, 1, 2])
    );
}

#[test]
fn cleared_grid_answers_empty_despite_stale_item_records() {
    let mut hash = grid_4x4();
    let mut colliders = vec![
        Collider::new(v(10.0, 10.0), v(60.0, 60.0)),
        Collider::new(v(80.0, 5.0), v(90.0, 15.0)),
    ];
    insert_all(&mut hash, &mut colliders);
    let recorded: Vec<_> = colliders
        .iter()
        .map(|c| c.registered_hash_bounds())
        .collect();

    hash.clear();
    assert!(hash.is_empty());

    for (key, bounds) in recorded.iter().enumerate() {
        // Item records are untouched by clear().
        assert_eq!(colliders[key].registered_hash_bounds(), *bounds);
        assert!(nearby(&mut hash, *bounds, 1, &mut colliders).is_empty());
    }
}

#[test]
fn colliders_in_a_map_arena_with_string_handles() {
    let mut hash: SpatialHash<&str> =
        SpatialHash::new(Rect::new(Vec2::ZERO, Vec2::splat(64.0)), 8, 8).unwrap();
    let mut arena = BTreeMap::new();
    arena.insert("wolf", Collider::new(v(2.0, 2.0), v(12.0, 4.0)));
    arena.insert("deer", Collider::new(v(9.0, 1.0), v(10.0, 2.0)));
    arena.insert("hawk", Collider::new(v(60.0, 60.0), v(63.0, 63.0)));

    for (&name, collider) in arena.iter_mut() {
        let (min, max) = (collider.min, collider.max);
        hash.insert(name, collider, min, max);
    }

    let wolf = arena["wolf"].registered_hash_bounds();
    let near_wolf: BTreeSet<_> = hash.find_nearby_colliders(wolf, 0, &mut arena).collect();
    assert_eq!(near_wolf, BTreeSet::from(["deer", "wolf"]));

    // The hawk moves next to the wolf.
    let hawk = arena.collider_mut("hawk").unwrap();
    assert!(hash.update_collider("hawk", hawk, v(4.0, 4.0), v(5.0, 5.0)));
    let near_wolf: BTreeSet<_> = hash.find_nearby_colliders(wolf, 0, &mut arena).collect();
    assert_eq!(near_wolf, BTreeSet::from(["deer", "hawk", "wolf"]));
}

#[test]
fn stopping_a_query_early_leaves_the_hash_usable() {
    let mut hash = grid_4x4();
    let mut colliders: Vec<_> = (0..6)
        .map(|i| {
            let x = i as f32 * 15.0;
            Collider::new(v(x, x), v(x + 5.0, x + 5.0))
        })
        .collect();
    insert_all(&mut hash, &mut colliders);

    let everything = Some(HashBounds::new(CellIndex::new(0, 0), CellIndex::new(3, 3)));
    let first_two: Vec<_> = hash
        .find_nearby_colliders(everything, 0, &mut colliders)
        .take(2)
        .collect();
    assert_eq!(first_two.len(), 2);

    // A fresh query sees every item again, including the two already stamped.
    assert_eq!(nearby(&mut hash, everything, 0, &mut colliders).len(), 6);
}

/// Every registered collider sits in exactly the cells of its record, and
/// no bucket holds anything else.
fn assert_consistent(hash: &SpatialHash<usize>, colliders: &[Collider]) {
    for y in 0..hash.height() {
        for x in 0..hash.width() {
            let cell = CellIndex::new(x, y);
            let bucket = hash.bucket(cell).unwrap();
            for (key, collider) in colliders.iter().enumerate() {
                let expected = collider
                    .registered_hash_bounds()
                    .is_some_and(|b| b.contains(cell));
                let count = bucket.iter().filter(|&&k| k == key).count();
                assert_eq!(
                    count,
                    usize::from(expected),
                    "collider {key} in cell {cell}: expected membership {expected}"
                );
            }
            assert!(bucket.iter().all(|&k| k < colliders.len()));
        }
    }
}

/// Random box that may reach a little past the world edge.
fn random_box(rng: &mut StdRng) -> (Vec2, Vec2) {
    let min = v(rng.gen_range(-230.0..230.0), rng.gen_range(-130.0..130.0));
    let extent = v(rng.gen_range(0.0..90.0), rng.gen_range(0.0..90.0));
    (min, min + extent)
}

#[test]
fn random_workload_keeps_buckets_and_records_in_sync() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let world = Rect::new(v(-200.0, -100.0), v(400.0, 200.0));
    let mut hash = SpatialHash::new(world, 10, 5).unwrap();
    let mut colliders = vec![Collider::default(); 24];

    for _ in 0..400 {
        let key = rng.gen_range(0..colliders.len());
        let collider = &mut colliders[key];
        match rng.gen_range(0..3) {
            0 => {
                if collider.registered_hash_bounds().is_none() {
                    let (min, max) = random_box(&mut rng);
                    hash.insert(key, collider, min, max);
                }
            }
            1 => hash.remove(key, collider),
            _ => {
                let (min, max) = random_box(&mut rng);
                hash.update_collider(key, collider, min, max);
            }
        }
        assert_consistent(&hash, &colliders);

        let probe = colliders[key].registered_hash_bounds();
        let radius = rng.gen_range(0..3);
        let found: Vec<_> = hash
            .find_nearby_colliders(probe, radius, &mut colliders)
            .collect();
        let unique: BTreeSet<_> = found.iter().copied().collect();
        assert_eq!(unique.len(), found.len(), "query yielded a duplicate");
        if probe.is_some() {
            assert!(unique.contains(&key));
        }
    }
}
