// Domain layer: core simulation types and rules.

pub mod collision;
pub mod events;
pub mod registry;
pub mod state;
pub mod systems;
pub mod tuning;

pub use events::WorldEvent;
pub use registry::{Entity, IdAllocator, Registry, Store};
pub use state::{
    Collectible, EntityId, HeldKeys, Npc, NpcMode, Player, PlayerInput, Projectile,
    ProjectileOwner, WorldSnapshot,
};
