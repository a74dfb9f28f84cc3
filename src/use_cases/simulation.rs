// Explicit simulation state: the registry, tuning and randomness, advanced one tick at a time.

use crate::domain::collision::Point;
use crate::domain::systems::{npc, players, population, projectiles};
use crate::domain::tuning::GameTuning;
use crate::domain::{EntityId, Player, PlayerInput, Registry, WorldEvent, WorldSnapshot};
use crate::use_cases::types::FireballRequest;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

// Emit a periodic population summary at this tick stride.
const SUMMARY_EVERY_TICKS: u64 = 600;

pub struct Simulation<R = StdRng> {
    registry: Registry,
    tuning: GameTuning,
    rng: R,
    tick: u64,
}

impl<R: Rng> Simulation<R> {
    /// Creates a world seeded with the initial coins and NPCs.
    pub fn new(tuning: GameTuning, mut rng: R) -> Self {
        let mut registry = Registry::new();
        population::seed_world(&mut registry, &tuning, &mut rng);
        Self {
            registry,
            tuning,
            rng,
            tick: 0,
        }
    }

    /// Creates a world with no entities at all.
    pub fn empty(tuning: GameTuning, rng: R) -> Self {
        Self {
            registry: Registry::new(),
            tuning,
            rng,
            tick: 0,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Adds a player at a random in-bounds position.
    pub fn spawn_player(&mut self) -> EntityId {
        let at = population::random_point(
            &mut self.rng,
            &self.tuning.world,
            self.tuning.player.spawn_margin,
        );
        let id = self.registry.ids.allocate();
        self.registry
            .players
            .insert(Player::new(id, at.x, at.y, &self.tuning.player))
    }

    /// Returns false when the player was already gone.
    pub fn remove_player(&mut self, player_id: EntityId) -> bool {
        self.registry.players.remove(player_id).is_some()
    }

    /// Stores intent only; movement happens on the next tick.
    pub fn update_input(&mut self, player_id: EntityId, input: PlayerInput, direction: Option<f32>) {
        let Some(player) = self.registry.players.get_mut(player_id) else {
            return;
        };
        player.input = input;
        if let Some(direction) = direction {
            player.direction = direction;
        }
    }

    /// Launches a fireball if the player is alive and off cooldown.
    pub fn shoot(&mut self, player_id: EntityId, request: FireballRequest) -> Option<WorldEvent> {
        let player = self
            .registry
            .players
            .get_mut(player_id)
            .filter(|p| p.alive && p.shoot_cooldown == 0)?;
        player.shoot_cooldown = player.shoot_max_cooldown;

        let id = self.registry.ids.allocate();
        let projectile = projectiles::player_fireball(
            id,
            player,
            Point::new(request.x, request.y),
            request.direction,
            request.size,
            &self.tuning.projectile,
        );
        self.registry.projectiles.insert(projectile.clone());
        Some(WorldEvent::FireballShot(projectile))
    }

    /// Relocates the player if alive and off cooldown.
    ///
    /// The destination is taken as-is; the next tick's movement clamps it into the world.
    pub fn teleport(&mut self, player_id: EntityId, x: f32, y: f32) -> Option<WorldEvent> {
        let player = self
            .registry
            .players
            .get_mut(player_id)
            .filter(|p| p.alive && p.teleport_cooldown == 0)?;
        player.x = x;
        player.y = y;
        player.teleport_cooldown = player.teleport_max_cooldown;
        Some(WorldEvent::PlayerTeleported { player_id, x, y })
    }

    /// Advances the world by one tick and returns the events it produced.
    pub fn step(&mut self) -> Vec<WorldEvent> {
        self.tick += 1;
        let tick = self.tick;
        let mut events = Vec::new();

        players::tick_players(
            &mut self.registry.players,
            &mut self.registry.collectibles,
            &self.tuning.world,
            &self.tuning.player,
            tick,
            &mut events,
        );
        projectiles::tick_projectiles(&mut self.registry, &self.tuning, tick, &mut self.rng);
        npc::tick_npcs(&mut self.registry, &self.tuning, tick, &mut self.rng);

        let refill = population::maintain_population(&mut self.registry, &self.tuning, &mut self.rng);
        if refill.npcs > 0 {
            info!(tick, "npc respawned");
        }

        let compacted = self
            .registry
            .compact(tick, self.tuning.world.retired_grace_ticks);

        if tick % SUMMARY_EVERY_TICKS == 0 {
            debug!(
                tick,
                players = self.registry.players.len(),
                projectiles = self.registry.projectiles.len(),
                coins = self.registry.active_collectibles(),
                npcs = self.registry.alive_npcs(),
                compacted,
                "world summary"
            );
        }

        events
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.registry.snapshot(self.tick)
    }
}
