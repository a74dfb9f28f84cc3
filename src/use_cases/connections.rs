// Connection bookkeeping and command dispatch, owned by the world task.

use crate::domain::{EntityId, WorldEvent};
use crate::use_cases::simulation::Simulation;
use crate::use_cases::types::{JoinAck, OutboundFrame, PlayerCommand, ServerEvent};
use rand::Rng;
use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Tracks which players have an open connection and fans events out to all of them.
pub struct ConnectionManager {
    outbound_tx: broadcast::Sender<OutboundFrame>,
    open: HashSet<EntityId>,
    next_seq: u64,
}

impl ConnectionManager {
    pub fn new(outbound_tx: broadcast::Sender<OutboundFrame>) -> Self {
        Self {
            outbound_tx,
            open: HashSet::new(),
            next_seq: 1,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.open.len()
    }

    pub fn is_open(&self, player_id: EntityId) -> bool {
        self.open.contains(&player_id)
    }

    /// Spawns a player for a new connection and announces the new world to everyone.
    pub fn connect<R: Rng>(&mut self, sim: &mut Simulation<R>) -> JoinAck {
        let player_id = sim.spawn_player();
        self.open.insert(player_id);
        info!(
            player_id = %player_id,
            players = self.open.len(),
            coins = sim.registry().active_collectibles(),
            npcs = sim.registry().alive_npcs(),
            projectiles = sim.registry().projectiles.len(),
            "player connected"
        );

        let snapshot = sim.snapshot();
        let world = sim.tuning().world;
        let ack = JoinAck {
            player_id,
            snapshot: snapshot.clone(),
            world_width: world.width,
            world_height: world.height,
            first_seq: self.next_seq,
        };
        self.broadcast(ServerEvent::Snapshot(snapshot));
        ack
    }

    /// Applies one client command. Commands from closed connections are dropped.
    pub fn dispatch<R: Rng>(
        &mut self,
        sim: &mut Simulation<R>,
        player_id: EntityId,
        command: PlayerCommand,
    ) {
        if !self.is_open(player_id) {
            debug!(player_id = %player_id, "command for closed connection ignored");
            return;
        }

        let event = match command {
            PlayerCommand::UpdateInput { input, direction } => {
                sim.update_input(player_id, input, direction);
                None
            }
            PlayerCommand::ShootFireball(request) => sim.shoot(player_id, request),
            PlayerCommand::Teleport { x, y } => sim.teleport(player_id, x, y),
        };

        if let Some(event) = event {
            self.broadcast(ServerEvent::Notice(event));
        }
    }

    /// Removes the player and announces the departure. A second close is a no-op.
    pub fn disconnect<R: Rng>(&mut self, sim: &mut Simulation<R>, player_id: EntityId) -> bool {
        if !self.open.remove(&player_id) {
            debug!(player_id = %player_id, "duplicate disconnect ignored");
            return false;
        }
        sim.remove_player(player_id);
        info!(player_id = %player_id, players = self.open.len(), "player disconnected");
        self.broadcast(ServerEvent::Notice(WorldEvent::PlayerLeft { player_id }));
        true
    }

    /// Sends to every subscribed connection. Returns how many receivers saw it.
    ///
    /// Having no receivers is not an error; slow receivers lag on their own.
    pub fn broadcast(&mut self, event: ServerEvent) -> usize {
        let frame = OutboundFrame {
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;
        self.outbound_tx.send(frame).unwrap_or(0)
    }
}
