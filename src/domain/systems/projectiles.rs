use crate::domain::collision::{Point, in_world, within_radius};
use crate::domain::registry::{IdAllocator, Registry, Store};
use crate::domain::state::{
    Collectible, EntityId, Npc, Player, Projectile, ProjectileOwner,
};
use crate::domain::systems::population::spawn_reward_burst;
use crate::domain::tuning::{GameTuning, ProjectileTuning};
use rand::Rng;
use tracing::{debug, info};

/// Fireball launched by a player command. Damage grows with the shooter's level.
pub fn player_fireball(
    id: EntityId,
    shooter: &Player,
    origin: Point,
    direction: f32,
    size: Option<f32>,
    tuning: &ProjectileTuning,
) -> Projectile {
    let size = size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(shooter.fireball_size);
    Projectile {
        id,
        x: origin.x,
        y: origin.y,
        direction,
        speed: tuning.player_speed,
        size,
        lifetime: tuning.player_lifetime,
        damage: shooter.level as i32,
        owner: ProjectileOwner::Player(shooter.id),
    }
}

/// Fireball launched from an NPC's centre towards `target`.
pub fn npc_fireball(id: EntityId, npc: &Npc, target: Point, tuning: &ProjectileTuning) -> Projectile {
    let origin = npc.center();
    // Aim is taken from the top-left corner, matching how NPCs sense players.
    let direction = (target.y - npc.y).atan2(target.x - npc.x);
    Projectile {
        id,
        x: origin.x,
        y: origin.y,
        direction,
        speed: tuning.npc_speed,
        size: tuning.npc_size,
        lifetime: tuning.npc_lifetime,
        damage: tuning.npc_damage,
        owner: ProjectileOwner::Npc,
    }
}

/// Advances every projectile, resolves hits and drops spent projectiles.
///
/// The pass walks indices in reverse and only queues removals; they are
/// applied once the whole pass is done. Returns the number removed.
pub fn tick_projectiles<R: Rng + ?Sized>(
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

    let items = projectiles.items_mut();
    let mut spent: Vec<usize> = Vec::new();

    for index in (0..items.len()).rev() {
        let projectile = &mut items[index];
        projectile.x += projectile.direction.cos() * projectile.speed;
        projectile.y += projectile.direction.sin() * projectile.speed;

        if !in_world(projectile.position(), &tuning.world) {
            spent.push(index);
            continue;
        }

        let consumed = match projectile.owner {
            ProjectileOwner::Player(owner) => {
                hit_npcs(projectile, npcs, collectibles, ids, tuning, tick, rng)
                    || hit_players(projectile, players, Some(owner))
            }
            ProjectileOwner::Npc => hit_players(projectile, players, None),
        };

        projectile.lifetime -= 1;
        if consumed || projectile.lifetime <= 0 {
            spent.push(index);
        }
    }

    // Indices were queued in descending order, so each removal leaves the rest valid.
    for index in &spent {
        items.remove(*index);
    }
    spent.len()
}

fn hit_npcs<R: Rng + ?Sized>(
    projectile: &Projectile,
    npcs: &mut Store<Npc>,
    collectibles: &mut Store<Collectible>,
    ids: &mut IdAllocator,
    tuning: &GameTuning,
    tick: u64,
    rng: &mut R,
) -> bool {
    let position = projectile.position();
    let Some(npc) = npcs
        .iter_mut()
        .find(|npc| npc.alive && within_radius(position, npc.center(), projectile.size))
    else {
        return false;
    };

    if npc.take_damage(projectile.damage, tick) {
        let drop = tuning.collectible.burst_min.max(npc.coins as usize);
        info!(
            npc_id = %npc.id,
            projectile_id = %projectile.id,
            shooter_id = ?projectile.owner_player().map(|id| id.0),
            coins_dropped = drop,
            "npc killed"
        );
        spawn_reward_burst(
            collectibles,
            ids,
            npc.center(),
            drop,
            &tuning.collectible,
            &tuning.world,
            rng,
        );
    } else {
        debug!(npc_id = %npc.id, npc_hp = npc.health, "npc hit");
    }
    true
}

fn hit_players(
    projectile: &Projectile,
    players: &mut Store<Player>,
    shooter: Option<EntityId>,
) -> bool {
    let position = projectile.position();
    let Some(player) = players.iter_mut().find(|player| {
        player.alive
            && Some(player.id) != shooter
            && within_radius(position, player.center(), projectile.size)
    }) else {
        return false;
    };

    if player.take_damage(projectile.damage) {
        info!(
            victim_id = %player.id,
            projectile_id = %projectile.id,
            "player killed"
        );
    } else {
        debug!(
            victim_id = %player.id,
            victim_hp = player.health,
            projectile_id = %projectile.id,
            "player hit"
        );
    }
    true
}
