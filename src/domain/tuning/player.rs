/// Gameplay tuning for player avatars.
///
/// Durations are expressed in ticks, distances in world units.

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Edge length of a level 1 avatar.
    pub base_size: f32,

    /// Movement per tick at level 1.
    pub speed: f32,

    /// Floor for movement speed after level-up penalties.
    pub min_speed: f32,

    /// Speed lost on every level-up.
    pub level_speed_penalty: f32,

    /// Size growth multiplier applied to `ln(level)`.
    pub growth_factor: f32,

    pub max_health: i32,

    /// Ticks between teleports.
    pub teleport_cooldown: u32,

    /// Advertised teleport reach; clients pick the destination.
    pub teleport_distance: f32,

    /// Teleport cooldown ticks refunded per pickup.
    pub pickup_teleport_refund: u32,

    /// Ticks between fireballs.
    pub shoot_cooldown: u32,

    /// Fireball size at level 1; scales with the avatar.
    pub base_fireball_size: f32,

    /// Collectibles needed for the first level-up.
    pub first_level_threshold: u32,

    /// Threshold increase per level.
    pub level_threshold_step: u32,

    /// Minimum distance between a spawn point and the world edge.
    pub spawn_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            base_size: 32.0,
            speed: 8.0,
            min_speed: 4.0,
            level_speed_penalty: 0.3,
            growth_factor: 1.5,
            max_health: 100,
            teleport_cooldown: 180,
            teleport_distance: 120.0,
            pickup_teleport_refund: 30,
            shoot_cooldown: 12,
            base_fireball_size: 12.0,
            first_level_threshold: 10,
            level_threshold_step: 10,
            spawn_margin: 50.0,
        }
    }
}
