// Use cases layer: application workflows for the game server.

pub mod connections;
pub mod game;
pub mod simulation;
pub mod types;

pub use connections::ConnectionManager;
pub use simulation::Simulation;
pub use types::{FireballRequest, GameEvent, JoinAck, OutboundFrame, PlayerCommand, ServerEvent};
