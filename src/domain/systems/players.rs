use crate::domain::collision::{clamp_to_world, rect_intersect};
use crate::domain::events::WorldEvent;
use crate::domain::registry::Store;
use crate::domain::state::{Collectible, HeldKeys, Player};
use crate::domain::tuning::{PlayerTuning, WorldTuning};
use std::f32::consts::FRAC_1_SQRT_2;
use tracing::debug;

/// One tick of displacement for the held keys.
///
/// Diagonals are normalised so their length matches straight-line speed.
pub fn displacement(keys: HeldKeys, speed: f32) -> (f32, f32) {
    let mut dx: f32 = 0.0;
    let mut dy: f32 = 0.0;
    if keys.up {
        dy -= 1.0;
    }
    if keys.down {
        dy += 1.0;
    }
    if keys.left {
        dx -= 1.0;
    }
    if keys.right {
        dx += 1.0;
    }

    if dx != 0.0 && dy != 0.0 {
        dx *= FRAC_1_SQRT_2;
        dy *= FRAC_1_SQRT_2;
    }

    (dx * speed, dy * speed)
}

/// Grows the player by one level.
pub fn level_up(player: &mut Player, tuning: &PlayerTuning) {
    player.level += 1;
    player.coins_to_next_level += tuning.level_threshold_step;

    let scale = 1.0 + (player.level as f32).ln() * tuning.growth_factor;
    player.width = tuning.base_size * scale;
    player.height = tuning.base_size * scale;
    player.fireball_size = tuning.base_fireball_size * scale;
    player.speed = (player.speed - tuning.level_speed_penalty).max(tuning.min_speed);
}

pub fn tick_players(
    players: &mut Store<Player>,
    collectibles: &mut Store<Collectible>,
    world: &WorldTuning,
    tuning: &PlayerTuning,
    tick: u64,
    events: &mut Vec<WorldEvent>,
) {
    for player in players.iter_mut() {
        if !player.alive {
            continue;
        }

        let (dx, dy) = displacement(player.input.keys, player.speed);
        let (x, y) = clamp_to_world(
            player.x + dx,
            player.y + dy,
            player.width,
            player.height,
            world,
        );
        player.x = x;
        player.y = y;

        for coin in collectibles.iter_mut() {
            // Bounds are re-read per coin: a level-up mid-scan grows the pickup box.
            if coin.collected || !rect_intersect(&player.bounds(), &coin.bounds()) {
                continue;
            }
            coin.collect(tick);
            player.coins += 1;

            // One check per pickup, so a single pickup never yields two levels.
            if player.coins >= player.coins_to_next_level {
                level_up(player, tuning);
                debug!(player_id = %player.id, level = player.level, "player levelled up");
            }

            player.teleport_cooldown = player
                .teleport_cooldown
                .saturating_sub(tuning.pickup_teleport_refund);

            events.push(WorldEvent::CoinCollected {
                coin_id: coin.id,
                player_id: player.id,
                coins: player.coins,
                level: player.level,
            });
        }

        // A level-up grows the box in place, which can push it past the far edges.
        let (x, y) = clamp_to_world(player.x, player.y, player.width, player.height, world);
        player.x = x;
        player.y = y;

        player.teleport_cooldown = player.teleport_cooldown.saturating_sub(1);
        player.shoot_cooldown = player.shoot_cooldown.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::EntityId;
    use crate::domain::tuning::CollectibleTuning;
    use assert_approx_eq::assert_approx_eq;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(EntityId(1), x, y, &PlayerTuning::default())
    }

    fn coins_at(points: &[(f32, f32)]) -> Store<Collectible> {
        let mut store = Store::default();
        for (i, (x, y)) in points.iter().enumerate() {
            store.insert(Collectible::new(
                EntityId(100 + i as u64),
                *x,
                *y,
                0.0,
                &CollectibleTuning::default(),
            ));
        }
        store
    }

    fn run(player: Player, coins: &mut Store<Collectible>) -> (Player, Vec<WorldEvent>) {
        let mut players = Store::default();
        players.insert(player);
        let mut events = Vec::new();
        tick_players(
            &mut players,
            coins,
            &WorldTuning::default(),
            &PlayerTuning::default(),
            1,
            &mut events,
        );
        let player = players.iter().next().cloned().expect("player kept");
        (player, events)
    }

    #[test]
    fn when_two_perpendicular_keys_are_held_then_displacement_has_straight_line_length() {
        let keys = HeldKeys {
            up: true,
            right: true,
            ..HeldKeys::default()
        };
        let (dx, dy) = displacement(keys, 8.0);
        assert_approx_eq!((dx * dx + dy * dy).sqrt(), 8.0, 1e-4);
        assert!(dx > 0.0 && dy < 0.0);
    }

    #[test]
    fn when_opposite_keys_are_held_then_they_cancel() {
        let keys = HeldKeys {
            up: true,
            down: true,
            left: true,
            ..HeldKeys::default()
        };
        assert_eq!(displacement(keys, 8.0), (-8.0, 0.0));
    }

    #[test]
    fn when_player_walks_into_the_edge_then_position_is_clamped() {
        let mut player = player_at(2.0, 2240.0);
        player.input.keys = HeldKeys {
            left: true,
            down: true,
            ..HeldKeys::default()
        };
        let (player, _) = run(player, &mut Store::default());
        assert_eq!(player.x, 0.0);
        assert_eq!(player.y, 2250.0 - player.height);
    }

    #[test]
    fn when_player_overlaps_coin_then_it_is_collected_and_announced() {
        let mut coins = coins_at(&[(110.0, 110.0), (500.0, 500.0)]);
        let mut player = player_at(100.0, 100.0);
        player.teleport_cooldown = 100;
        let (player, events) = run(player, &mut coins);

        assert_eq!(player.coins, 1);
        // 30 refunded by the pickup, 1 by the tick itself.
        assert_eq!(player.teleport_cooldown, 69);
        assert!(coins.iter().next().is_some_and(|c| c.collected));
        assert!(!coins.iter().nth(1).is_some_and(|c| c.collected));
        assert!(matches!(
            events.as_slice(),
            [WorldEvent::CoinCollected { coins: 1, level: 1, .. }]
        ));
    }

    #[test]
    fn when_count_reaches_threshold_then_player_levels_up_once() {
        let mut coins = coins_at(&[(110.0, 110.0)]);
        let mut player = player_at(100.0, 100.0);
        player.coins = 9;
        let (player, _) = run(player, &mut coins);

        let tuning = PlayerTuning::default();
        let scale = 1.0 + 2f32.ln() * 1.5;
        assert_eq!(player.level, 2);
        assert_eq!(player.coins_to_next_level, 20);
        assert_approx_eq!(player.width, tuning.base_size * scale, 1e-4);
        assert_approx_eq!(player.fireball_size, tuning.base_fireball_size * scale, 1e-4);
        assert_approx_eq!(player.speed, 7.7, 1e-4);
    }

    #[test]
    fn when_several_coins_cross_one_threshold_in_a_tick_then_only_one_level_is_gained() {
        let mut coins = coins_at(&[(105.0, 105.0), (110.0, 110.0), (115.0, 115.0)]);
        let mut player = player_at(100.0, 100.0);
        player.coins = 8;
        let (player, events) = run(player, &mut coins);

        assert_eq!(player.coins, 11);
        assert_eq!(player.level, 2);
        assert_eq!(player.coins_to_next_level, 20);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn when_count_overshoots_several_thresholds_then_each_pickup_levels_at_most_once() {
        // Count already past two thresholds: each pickup can only climb one level.
        let mut coins = coins_at(&[(105.0, 105.0), (110.0, 110.0)]);
        let mut player = player_at(100.0, 100.0);
        player.coins = 30;
        let (player, _) = run(player, &mut coins);

        assert_eq!(player.coins, 32);
        assert_eq!(player.level, 3);
        assert_eq!(player.coins_to_next_level, 30);
    }

    #[test]
    fn when_player_levels_up_against_the_far_corner_then_the_grown_box_stays_inside() {
        let base = PlayerTuning::default().base_size;
        let world = WorldTuning::default();
        let (x, y) = (world.width - base, world.height - base);
        let mut coins = coins_at(&[(x + 10.0, y + 10.0)]);
        let mut player = player_at(x, y);
        player.coins = 9;
        let (player, _) = run(player, &mut coins);

        assert_eq!(player.level, 2);
        assert!(player.width > base);
        assert_approx_eq!(player.x + player.width, world.width, 1e-3);
        assert_approx_eq!(player.y + player.height, world.height, 1e-3);
    }

    #[test]
    fn when_speed_penalty_would_go_below_floor_then_speed_stops_at_min() {
        let tuning = PlayerTuning::default();
        let mut player = player_at(0.0, 0.0);
        player.speed = 4.1;
        level_up(&mut player, &tuning);
        assert_eq!(player.speed, tuning.min_speed);
    }

    #[test]
    fn when_player_is_dead_then_it_neither_moves_nor_collects() {
        let mut coins = coins_at(&[(110.0, 110.0)]);
        let mut player = player_at(100.0, 100.0);
        player.alive = false;
        player.input.keys.right = true;
        player.shoot_cooldown = 5;
        let (player, events) = run(player, &mut coins);

        assert_eq!(player.x, 100.0);
        assert_eq!(player.shoot_cooldown, 5);
        assert!(events.is_empty());
    }
}
