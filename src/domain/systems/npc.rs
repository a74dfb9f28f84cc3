use crate::domain::collision::{Point, clamp_to_world, within_radius};
use crate::domain::registry::{Registry, Store};
use crate::domain::state::{Collectible, Npc, NpcMode, Player};
use crate::domain::systems::population::random_point;
use crate::domain::systems::projectiles::npc_fireball;
use crate::domain::tuning::{GameTuning, NpcTuning, WorldTuning};
use rand::Rng;

/// Runs sensing, steering, attacks and pickups for every alive NPC.
///
/// Returns the number of fireballs launched this tick.
pub fn tick_npcs<R: Rng + ?Sized>(
    registry: &mut Registry,
    tuning: &GameTuning,
    tick: u64,
    rng: &mut R,
) -> usize {
    let Registry {
        players,
        projectiles,
        collectibles,
        npcs,
        ids,
    } = registry;

    let mut launched = 0;
    for npc in npcs.iter_mut() {
        if !npc.alive {
            continue;
        }

        let (target, mode) = choose_target(npc, players, collectibles, &tuning.npc, &tuning.world, rng);
        npc.mode = mode;
        steer_towards(npc, target, &tuning.world);

        npc.attack_timer = npc.attack_timer.saturating_add(1);
        if npc.attack_timer >= npc.attack_cooldown {
            // The scan keeps going after a shot: every alive player in range
            // gets a fireball this tick, not just the first one found.
            for player in players.iter().filter(|p| p.alive) {
                let aim = player.center();
                if !within_radius(npc.position(), aim, tuning.npc.engagement_radius) {
                    continue;
                }
                projectiles.insert(npc_fireball(ids.allocate(), npc, aim, &tuning.projectile));
                npc.attack_timer = 0;
                launched += 1;
            }
        }

        collect_nearby(npc, collectibles, &tuning.npc, tick);
    }
    launched
}

/// Picks where the NPC heads this tick: a coin, then a player, then a waypoint.
fn choose_target<R: Rng + ?Sized>(
    npc: &mut Npc,
    players: &Store<Player>,
    collectibles: &Store<Collectible>,
    tuning: &NpcTuning,
    world: &WorldTuning,
    rng: &mut R,
) -> (Point, NpcMode) {
    let origin = npc.position();

    let nearest_coin = collectibles
        .iter()
        .filter(|c| !c.collected)
        .map(|c| (c.position(), origin.distance(c.position())))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((at, distance)) = nearest_coin {
        if distance < tuning.collectible_sense_radius {
            return (at, NpcMode::Pursue);
        }
    }

    let nearest_player = players
        .iter()
        .filter(|p| p.alive)
        .map(|p| (p.center(), origin.distance(p.center())))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((at, distance)) = nearest_player {
        if distance < tuning.player_sense_radius {
            return (at, NpcMode::Pursue);
        }
    }

    let reroll = rng.r#gen::<f64>() < tuning.wander_reroll_chance;
    let waypoint = match npc.wander_target {
        Some(waypoint) if !reroll => waypoint,
        _ => random_point(rng, world, tuning.spawn_margin),
    };
    npc.wander_target = Some(waypoint);
    (waypoint, NpcMode::Wander)
}

fn steer_towards(npc: &mut Npc, target: Point, world: &WorldTuning) {
    let dx = target.x - npc.x;
    let dy = target.y - npc.y;
    if dx != 0.0 || dy != 0.0 {
        npc.direction = dy.atan2(dx);
        npc.x += npc.direction.cos() * npc.speed;
        npc.y += npc.direction.sin() * npc.speed;
    }

    let (x, y) = clamp_to_world(npc.x, npc.y, npc.width, npc.height, world);
    npc.x = x;
    npc.y = y;
}

fn collect_nearby(npc: &mut Npc, collectibles: &mut Store<Collectible>, tuning: &NpcTuning, tick: u64) {
    let origin = npc.position();
    for coin in collectibles.iter_mut() {
        if coin.collected || !within_radius(origin, coin.position(), tuning.pickup_radius) {
            continue;
        }
        coin.collect(tick);
        npc.coins += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{EntityId, ProjectileOwner};
    use crate::domain::tuning::{CollectibleTuning, PlayerTuning};
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn add_player(registry: &mut Registry, x: f32, y: f32) -> EntityId {
        let id = registry.ids.allocate();
        registry
            .players
            .insert(Player::new(id, x, y, &PlayerTuning::default()))
    }

    fn add_npc(registry: &mut Registry, x: f32, y: f32) -> EntityId {
        let id = registry.ids.allocate();
        registry
            .npcs
            .insert(Npc::new(id, x, y, 0.0, "#fff", &NpcTuning::default()))
    }

    fn add_coin(registry: &mut Registry, x: f32, y: f32) -> EntityId {
        let id = registry.ids.allocate();
        registry
            .collectibles
            .insert(Collectible::new(id, x, y, 0.0, &CollectibleTuning::default()))
    }

    fn step(registry: &mut Registry) -> usize {
        tick_npcs(registry, &GameTuning::default(), 1, &mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn when_coin_is_within_sense_radius_then_npc_heads_for_it() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        add_coin(&mut registry, 1100.0, 1000.0);
        // A player is closer, but coins take priority.
        add_player(&mut registry, 960.0, 984.0);

        step(&mut registry);
        let npc = registry.npcs.get(npc_id).expect("npc");
        assert_eq!(npc.mode, NpcMode::Pursue);
        assert_approx_eq!(npc.x, 1005.0, 1e-4);
        assert_approx_eq!(npc.y, 1000.0, 1e-4);
    }

    #[test]
    fn when_only_a_player_is_near_then_npc_chases_its_center() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        // Player centre at (1000, 1150).
        add_player(&mut registry, 984.0, 1134.0);

        step(&mut registry);
        let npc = registry.npcs.get(npc_id).expect("npc");
        assert_eq!(npc.mode, NpcMode::Pursue);
        assert_approx_eq!(npc.x, 1000.0, 1e-3);
        assert_approx_eq!(npc.y, 1005.0, 1e-3);
        assert!(npc.wander_target.is_none());
    }

    #[test]
    fn when_nothing_is_sensed_then_npc_wanders_to_a_waypoint_inside_the_world() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);

        step(&mut registry);
        let npc = registry.npcs.get(npc_id).expect("npc");
        assert_eq!(npc.mode, NpcMode::Wander);
        let waypoint = npc.wander_target.expect("waypoint assigned");
        assert!((50.0..2950.0).contains(&waypoint.x));
        assert!((50.0..2200.0).contains(&waypoint.y));
    }

    #[test]
    fn when_attack_is_ready_then_every_player_in_range_gets_a_fireball() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        registry.npcs.get_mut(npc_id).expect("npc").attack_timer = 59;
        add_player(&mut registry, 1100.0, 1000.0);
        add_player(&mut registry, 900.0, 1100.0);
        add_player(&mut registry, 2500.0, 2000.0);

        assert_eq!(step(&mut registry), 2);
        assert_eq!(registry.projectiles.len(), 2);
        assert!(
            registry
                .projectiles
                .iter()
                .all(|p| p.owner == ProjectileOwner::Npc && p.damage == 1)
        );
        assert_eq!(registry.npcs.get(npc_id).expect("npc").attack_timer, 0);
    }

    #[test]
    fn when_attack_is_not_ready_then_timer_just_advances() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        add_player(&mut registry, 1100.0, 1000.0);

        assert_eq!(step(&mut registry), 0);
        assert_eq!(registry.npcs.get(npc_id).expect("npc").attack_timer, 1);
    }

    #[test]
    fn when_attack_timer_is_saturated_with_nobody_in_range_then_it_holds_at_max() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        registry.npcs.get_mut(npc_id).expect("npc").attack_timer = u32::MAX;
        add_player(&mut registry, 2800.0, 2100.0);

        assert_eq!(step(&mut registry), 0);
        assert_eq!(registry.npcs.get(npc_id).expect("npc").attack_timer, u32::MAX);
    }

    #[test]
    fn when_coin_is_within_pickup_radius_then_npc_collects_it() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        let coin = add_coin(&mut registry, 1020.0, 1000.0);

        step(&mut registry);
        assert!(registry.collectibles.get(coin).expect("coin").collected);
        assert_eq!(registry.npcs.get(npc_id).expect("npc").coins, 1);
    }

    #[test]
    fn when_npc_steers_past_the_edge_then_it_is_clamped() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 2966.0, 10.0);
        add_coin(&mut registry, 2999.0, 10.0);

        step(&mut registry);
        let npc = registry.npcs.get(npc_id).expect("npc");
        assert_eq!(npc.x, 2968.0);
    }

    #[test]
    fn when_npc_is_dead_then_it_is_inert() {
        let mut registry = Registry::new();
        let npc_id = add_npc(&mut registry, 1000.0, 1000.0);
        registry.npcs.get_mut(npc_id).expect("npc").alive = false;
        add_coin(&mut registry, 1010.0, 1000.0);

        step(&mut registry);
        let npc = registry.npcs.get(npc_id).expect("npc");
        assert_eq!((npc.x, npc.y, npc.coins), (1000.0, 1000.0, 0));
    }
}
