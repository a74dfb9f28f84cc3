/// World dimensions and housekeeping shared with clients at init time.

#[derive(Debug, Clone, Copy)]
pub struct WorldTuning {
    /// World width in world units.
    pub width: f32,

    /// World height in world units.
    pub height: f32,

    /// Ticks a collected item or dead NPC stays in storage before compaction.
    pub retired_grace_ticks: u64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 3000.0,
            height: 2250.0,
            retired_grace_ticks: 300,
        }
    }
}
