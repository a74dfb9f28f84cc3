/// Gameplay tuning for collectible coins.

#[derive(Debug, Clone, Copy)]
pub struct CollectibleTuning {
    /// Half-extent of the pickup box around the coin centre.
    pub size: f32,

    /// Coins scattered when the world starts.
    pub initial_count: usize,

    /// Uncollected count below which a refill batch spawns.
    pub floor: usize,

    pub refill_batch: usize,

    /// Minimum distance between a random coin and the world edge.
    pub spawn_margin: f32,

    /// Smallest reward burst dropped by a dying NPC.
    pub burst_min: usize,

    /// Base ring radius of a reward burst.
    pub burst_radius: f32,

    /// Random extra radius added per burst coin.
    pub burst_radius_jitter: f32,
}

impl Default for CollectibleTuning {
    fn default() -> Self {
        Self {
            size: 12.0,
            initial_count: 50,
            floor: 20,
            refill_batch: 5,
            spawn_margin: 20.0,
            burst_min: 5,
            burst_radius: 30.0,
            burst_radius_jitter: 20.0,
        }
    }
}
