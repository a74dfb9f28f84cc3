/// Gameplay tuning for computer-controlled NPCs.

#[derive(Debug, Clone, Copy)]
pub struct NpcTuning {
    pub size: f32,
    pub speed: f32,
    pub max_health: i32,

    /// Ticks between attack volleys.
    pub attack_cooldown: u32,

    /// Range at which an NPC notices a collectible.
    pub collectible_sense_radius: f32,

    /// Range at which an NPC starts chasing a player.
    pub player_sense_radius: f32,

    /// Range at which an NPC fires at a player.
    pub engagement_radius: f32,

    /// Range at which an NPC picks up a collectible.
    pub pickup_radius: f32,

    /// Per-tick probability of picking a fresh wander waypoint.
    pub wander_reroll_chance: f64,

    /// Minimum distance between spawn points/waypoints and the world edge.
    pub spawn_margin: f32,

    /// NPCs created when the world starts.
    pub initial_count: usize,

    /// Alive NPC count below which a replacement spawns.
    pub floor: usize,

    /// Cosmetic tags handed to clients.
    pub palette: &'static [&'static str],
}

impl Default for NpcTuning {
    fn default() -> Self {
        Self {
            size: 32.0,
            speed: 5.0,
            max_health: 2,
            attack_cooldown: 60,
            collectible_sense_radius: 150.0,
            player_sense_radius: 200.0,
            engagement_radius: 300.0,
            pickup_radius: 25.0,
            wander_reroll_chance: 0.02,
            spawn_margin: 50.0,
            initial_count: 3,
            floor: 3,
            palette: &["#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57"],
        }
    }
}
