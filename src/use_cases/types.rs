// Use-case level inputs/outputs for the world task.

use crate::domain::{EntityId, PlayerInput, WorldEvent, WorldSnapshot};
use tokio::sync::oneshot;

/// Requests flowing from connection tasks into the world task.
#[derive(Debug)]
pub enum GameEvent {
    Join { reply: oneshot::Sender<JoinAck> },
    Leave { player_id: EntityId },
    Command { player_id: EntityId, command: PlayerCommand },
}

/// Validated client intent, ready for the simulation.
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    UpdateInput {
        input: PlayerInput,
        direction: Option<f32>,
    },
    ShootFireball(FireballRequest),
    Teleport {
        x: f32,
        y: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FireballRequest {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    pub size: Option<f32>,
}

/// Everything a freshly joined connection needs for its `init` message.
#[derive(Debug, Clone)]
pub struct JoinAck {
    pub player_id: EntityId,
    pub snapshot: WorldSnapshot,
    pub world_width: f32,
    pub world_height: f32,
    /// Sequence number of the first broadcast this connection should forward.
    pub first_seq: u64,
}

#[derive(Debug, Clone)]
pub enum ServerEvent {
    Snapshot(WorldSnapshot),
    Notice(WorldEvent),
}

impl ServerEvent {
    pub fn is_snapshot(&self) -> bool {
        matches!(self, ServerEvent::Snapshot(_))
    }
}

/// A broadcast event tagged with its position in the outbound stream.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub seq: u64,
    pub event: ServerEvent,
}
