/// Gameplay tuning for fireballs.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Player fireball movement per tick.
    pub player_speed: f32,

    /// Player fireball lifetime in ticks.
    pub player_lifetime: i32,

    /// NPC fireball movement per tick.
    pub npc_speed: f32,

    /// NPC fireball hit radius.
    pub npc_size: f32,

    /// NPC fireball lifetime in ticks.
    pub npc_lifetime: i32,

    pub npc_damage: i32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_speed: 8.0,
            player_lifetime: 120,
            npc_speed: 6.0,
            npc_size: 10.0,
            npc_lifetime: 90,
            npc_damage: 1,
        }
    }
}
