// Domain-level simulation entities and player intent.

use crate::domain::collision::{Point, Rect};
use crate::domain::tuning::{CollectibleTuning, NpcTuning, PlayerTuning};
use std::fmt;

/// Process-unique entity identifier; never reused while the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directional keys currently held down by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    /// Builds the held set from client key names. Unknown names are ignored.
    pub fn from_pressed<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut held = Self::default();
        for (name, pressed) in keys {
            if !pressed {
                continue;
            }
            match name.to_ascii_lowercase().as_str() {
                "w" | "arrowup" => held.up = true,
                "s" | "arrowdown" => held.down = true,
                "a" | "arrowleft" => held.left = true,
                "d" | "arrowright" => held.right = true,
                _ => {}
            }
        }
        held
    }
}

/// Last intent received from a client; applied on the next tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub keys: HeldKeys,
    pub mouse_x: f32,
    pub mouse_y: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,

    // Combat state.
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub direction: f32,

    // Progression.
    pub coins: u32,
    pub level: u32,
    pub coins_to_next_level: u32,
    pub fireball_size: f32,

    // Cooldowns in ticks.
    pub teleport_cooldown: u32,
    pub teleport_max_cooldown: u32,
    pub teleport_distance: f32,
    pub shoot_cooldown: u32,
    pub shoot_max_cooldown: u32,

    pub input: PlayerInput,
}

impl Player {
    pub fn new(id: EntityId, x: f32, y: f32, tuning: &PlayerTuning) -> Self {
        Self {
            id,
            x,
            y,
            width: tuning.base_size,
            height: tuning.base_size,
            speed: tuning.speed,
            health: tuning.max_health,
            max_health: tuning.max_health,
            alive: true,
            direction: 0.0,
            coins: 0,
            level: 1,
            coins_to_next_level: tuning.first_level_threshold,
            fireball_size: tuning.base_fireball_size,
            teleport_cooldown: 0,
            teleport_max_cooldown: tuning.teleport_cooldown,
            teleport_distance: tuning.teleport_distance,
            shoot_cooldown: 0,
            shoot_max_cooldown: tuning.shoot_cooldown,
            input: PlayerInput::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Applies damage and returns true when this hit killed the player.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= damage;
        if self.health <= 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

/// Who launched a projectile; decides which targets it can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player(EntityId),
    Npc,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    /// Heading in radians.
    pub direction: f32,
    pub speed: f32,
    /// Hit radius.
    pub size: f32,
    /// Remaining ticks.
    pub lifetime: i32,
    pub damage: i32,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn owner_player(&self) -> Option<EntityId> {
        match self.owner {
            ProjectileOwner::Player(id) => Some(id),
            ProjectileOwner::Npc => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: EntityId,
    /// Centre of the coin.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub collected: bool,
    /// Tick of collection; drives compaction.
    pub collected_at: Option<u64>,
    /// Cosmetic animation phase in radians.
    pub bob_offset: f32,
}

impl Collectible {
    pub fn new(id: EntityId, x: f32, y: f32, bob_offset: f32, tuning: &CollectibleTuning) -> Self {
        Self {
            id,
            x,
            y,
            size: tuning.size,
            collected: false,
            collected_at: None,
            bob_offset,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x - self.size,
            y: self.y - self.size,
            width: self.size * 2.0,
            height: self.size * 2.0,
        }
    }

    /// Marks the coin collected. Returns false if it already was; the flag never reverts.
    pub fn collect(&mut self, tick: u64) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        self.collected_at = Some(tick);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcMode {
    Wander,
    Pursue,
}

#[derive(Debug, Clone)]
pub struct Npc {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub direction: f32,
    pub coins: u32,

    /// Ticks since the last volley.
    pub attack_timer: u32,
    pub attack_cooldown: u32,

    pub mode: NpcMode,
    pub alive: bool,
    /// Tick of death; drives compaction.
    pub died_at: Option<u64>,
    pub color: &'static str,
    /// Lazily assigned roaming destination.
    pub wander_target: Option<Point>,
}

impl Npc {
    pub fn new(
        id: EntityId,
        x: f32,
        y: f32,
        direction: f32,
        color: &'static str,
        tuning: &NpcTuning,
    ) -> Self {
        Self {
            id,
            x,
            y,
            width: tuning.size,
            height: tuning.size,
            speed: tuning.speed,
            health: tuning.max_health,
            max_health: tuning.max_health,
            direction,
            coins: 0,
            attack_timer: 0,
            attack_cooldown: tuning.attack_cooldown,
            mode: NpcMode::Wander,
            alive: true,
            died_at: None,
            color,
            wander_target: None,
        }
    }

    /// Top-left corner; sensing distances are measured from here.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
        .center()
    }

    /// Applies damage and returns true when this hit killed the NPC.
    pub fn take_damage(&mut self, damage: i32, tick: u64) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= damage;
        if self.health <= 0 {
            self.alive = false;
            self.died_at = Some(tick);
            return true;
        }
        false
    }
}

/// Outbound view of the world: only live entities, all players.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub players: Vec<Player>,
    pub projectiles: Vec<Projectile>,
    pub collectibles: Vec<Collectible>,
    pub npcs: Vec<Npc>,
}
