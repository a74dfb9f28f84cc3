// Gameplay tuning, kept apart from runtime/server configuration.

pub mod collectible;
pub mod npc;
pub mod player;
pub mod projectile;
pub mod world;

pub use collectible::CollectibleTuning;
pub use npc::NpcTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;
pub use world::WorldTuning;

/// Every tuning table the simulation reads, bundled for injection.
#[derive(Debug, Clone, Default)]
pub struct GameTuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub npc: NpcTuning,
    pub collectible: CollectibleTuning,
}
