// World seeding and the per-tick population floors.

use crate::domain::collision::{Point, clamp_to_world};
use crate::domain::registry::{IdAllocator, Registry, Store};
use crate::domain::state::{Collectible, EntityId, Npc};
use crate::domain::tuning::{CollectibleTuning, GameTuning, NpcTuning, WorldTuning};
use rand::Rng;
use std::f32::consts::TAU;

/// Uniform point at least `margin` away from every world edge.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, world: &WorldTuning, margin: f32) -> Point {
    let span_x = (world.width - 2.0 * margin).max(0.0);
    let span_y = (world.height - 2.0 * margin).max(0.0);
    Point::new(
        margin + rng.r#gen::<f32>() * span_x,
        margin + rng.r#gen::<f32>() * span_y,
    )
}

pub fn spawn_collectible<R: Rng + ?Sized>(
    collectibles: &mut Store<Collectible>,
    ids: &mut IdAllocator,
    at: Point,
    tuning: &CollectibleTuning,
    rng: &mut R,
) -> EntityId {
    let bob_offset = rng.r#gen::<f32>() * TAU;
    collectibles.insert(Collectible::new(ids.allocate(), at.x, at.y, bob_offset, tuning))
}

pub fn spawn_random_collectibles<R: Rng + ?Sized>(
    registry: &mut Registry,
    count: usize,
    tuning: &GameTuning,
    rng: &mut R,
) {
    for _ in 0..count {
        let at = random_point(rng, &tuning.world, tuning.collectible.spawn_margin);
        spawn_collectible(
            &mut registry.collectibles,
            &mut registry.ids,
            at,
            &tuning.collectible,
            rng,
        );
    }
}

pub fn spawn_npc<R: Rng + ?Sized>(
    registry: &mut Registry,
    color: &'static str,
    tuning: &GameTuning,
    rng: &mut R,
) -> EntityId {
    let at = random_point(rng, &tuning.world, tuning.npc.spawn_margin);
    let direction = rng.r#gen::<f32>() * TAU;
    let id = registry.ids.allocate();
    registry
        .npcs
        .insert(Npc::new(id, at.x, at.y, direction, color, &tuning.npc))
}

fn random_color<R: Rng + ?Sized>(rng: &mut R, tuning: &NpcTuning) -> &'static str {
    if tuning.palette.is_empty() {
        return "#ffffff";
    }
    tuning.palette[rng.gen_range(0..tuning.palette.len())]
}

/// Rings `count` coins around `center` at evenly spaced angles.
///
/// Coins that would poke out of the world are pulled back so their whole box
/// stays inside it; otherwise nothing could ever reach them.
pub fn spawn_reward_burst<R: Rng + ?Sized>(
    collectibles: &mut Store<Collectible>,
    ids: &mut IdAllocator,
    center: Point,
    count: usize,
    tuning: &CollectibleTuning,
    world: &WorldTuning,
    rng: &mut R,
) {
    let extent = tuning.size * 2.0;
    for k in 0..count {
        let angle = (k as f32 / count as f32) * TAU;
        let radius = tuning.burst_radius + rng.r#gen::<f32>() * tuning.burst_radius_jitter;
        let (left, top) = clamp_to_world(
            center.x + angle.cos() * radius - tuning.size,
            center.y + angle.sin() * radius - tuning.size,
            extent,
            extent,
            world,
        );
        let at = Point::new(left + tuning.size, top + tuning.size);
        spawn_collectible(collectibles, ids, at, tuning, rng);
    }
}

/// Initial coins and NPCs for a fresh world.
pub fn seed_world<R: Rng + ?Sized>(registry: &mut Registry, tuning: &GameTuning, rng: &mut R) {
    spawn_random_collectibles(registry, tuning.collectible.initial_count, tuning, rng);
    for i in 0..tuning.npc.initial_count {
        let color = if tuning.npc.palette.is_empty() {
            "#ffffff"
        } else {
            tuning.npc.palette[i % tuning.npc.palette.len()]
        };
        spawn_npc(registry, color, tuning, rng);
    }
}

/// Counts of entities spawned by one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refill {
    pub collectibles: usize,
    pub npcs: usize,
}

/// Tops up coins by one batch and NPCs by one body when under their floors.
pub fn maintain_population<R: Rng + ?Sized>(
    registry: &mut Registry,
    tuning: &GameTuning,
    rng: &mut R,
) -> Refill {
    let mut refill = Refill::default();

    if registry.active_collectibles() < tuning.collectible.floor {
        spawn_random_collectibles(registry, tuning.collectible.refill_batch, tuning, rng);
        refill.collectibles = tuning.collectible.refill_batch;
    }

    if registry.alive_npcs() < tuning.npc.floor {
        let color = random_color(rng, &tuning.npc);
        spawn_npc(registry, color, tuning, rng);
        refill.npcs = 1;
    }

    refill
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collision::in_world;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn when_world_is_seeded_then_initial_counts_match_tuning() {
        let tuning = GameTuning::default();
        let mut registry = Registry::new();
        seed_world(&mut registry, &tuning, &mut StdRng::seed_from_u64(1));

        assert_eq!(registry.active_collectibles(), 50);
        assert_eq!(registry.alive_npcs(), 3);
        let colors: Vec<_> = registry.npcs.iter().map(|n| n.color).collect();
        assert_eq!(colors, tuning.npc.palette[..3].to_vec());
        assert!(registry.collectibles.iter().all(|c| in_world(c.position(), &tuning.world)));
    }

    #[test]
    fn when_uncollected_coins_drop_below_floor_then_exactly_one_batch_spawns() {
        let tuning = GameTuning::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut registry = Registry::new();
        spawn_random_collectibles(&mut registry, 19, &tuning, &mut rng);
        for _ in 0..3 {
            spawn_npc(&mut registry, "#fff", &tuning, &mut rng);
        }

        let refill = maintain_population(&mut registry, &tuning, &mut rng);
        assert_eq!(refill, Refill { collectibles: 5, npcs: 0 });
        assert_eq!(registry.active_collectibles(), 24);

        let refill = maintain_population(&mut registry, &tuning, &mut rng);
        assert_eq!(refill, Refill::default());
    }

    #[test]
    fn when_alive_npcs_drop_below_floor_then_one_spawns_per_pass() {
        let tuning = GameTuning::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut registry = Registry::new();
        spawn_random_collectibles(&mut registry, 20, &tuning, &mut rng);
        spawn_npc(&mut registry, "#fff", &tuning, &mut rng);

        assert_eq!(maintain_population(&mut registry, &tuning, &mut rng).npcs, 1);
        assert_eq!(registry.alive_npcs(), 2);
        assert_eq!(maintain_population(&mut registry, &tuning, &mut rng).npcs, 1);
        assert_eq!(maintain_population(&mut registry, &tuning, &mut rng).npcs, 0);
        assert_eq!(registry.alive_npcs(), 3);
    }

    #[test]
    fn when_reward_burst_spawns_then_coins_ring_the_center() {
        let tuning = CollectibleTuning::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut store = Store::default();
        let mut ids = IdAllocator::default();
        let center = Point::new(500.0, 400.0);

        spawn_reward_burst(
            &mut store,
            &mut ids,
            center,
            5,
            &tuning,
            &WorldTuning::default(),
            &mut rng,
        );

        assert_eq!(store.len(), 5);
        for coin in store.iter() {
            let d = center.distance(coin.position());
            assert!((30.0..50.0 + 1e-3).contains(&d), "distance {d}");
        }
        // First coin sits on the positive x axis.
        let first = store.iter().next().expect("first coin");
        assert_approx_eq!(first.y, center.y, 1e-3);
        assert!(first.x > center.x);
    }

    #[test]
    fn when_burst_rings_a_corner_then_every_coin_stays_inside_the_world() {
        let tuning = CollectibleTuning::default();
        let world = WorldTuning::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut store = Store::default();
        let mut ids = IdAllocator::default();

        for center in [Point::new(16.0, 16.0), Point::new(2984.0, 2234.0)] {
            spawn_reward_burst(&mut store, &mut ids, center, 12, &tuning, &world, &mut rng);
        }

        assert_eq!(store.len(), 24);
        for coin in store.iter() {
            let bounds = coin.bounds();
            assert!(bounds.x >= 0.0 && bounds.y >= 0.0, "{bounds:?}");
            assert!(bounds.right() <= world.width, "{bounds:?}");
            assert!(bounds.bottom() <= world.height, "{bounds:?}");
        }
    }
}
