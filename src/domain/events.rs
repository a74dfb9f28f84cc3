// Discrete occurrences broadcast to every connection as they happen.

use crate::domain::state::{EntityId, Projectile};

#[derive(Debug, Clone)]
pub enum WorldEvent {
    FireballShot(Projectile),
    PlayerTeleported {
        player_id: EntityId,
        x: f32,
        y: f32,
    },
    CoinCollected {
        coin_id: EntityId,
        player_id: EntityId,
        coins: u32,
        level: u32,
    },
    PlayerLeft {
        player_id: EntityId,
    },
}
