use super::types::{GameEvent, ServerEvent};
use crate::use_cases::connections::ConnectionManager;
use crate::use_cases::simulation::Simulation;
use rand::Rng;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// The single owner of world state.
///
/// Inbound events and ticks are handled one at a time, so nothing here needs a lock.
pub async fn world_task<R: Rng + Send + 'static>(
    mut input_rx: mpsc::Receiver<GameEvent>,
    mut sim: Simulation<R>,
    mut connections: ConnectionManager,
    tick_interval: Duration,
) {
    // Drive the fixed-step game loop; late ticks are delayed, never replayed.
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            event = input_rx.recv() => {
                let Some(event) = event else {
                    info!("input channel closed; world task exiting");
                    break;
                };
                handle_event(&mut sim, &mut connections, event);
            }
            _ = interval.tick() => {
                run_tick(&mut sim, &mut connections);
            }
        }
    }
}

fn handle_event<R: Rng>(sim: &mut Simulation<R>, connections: &mut ConnectionManager, event: GameEvent) {
    match event {
        GameEvent::Join { reply } => {
            let ack = connections.connect(sim);
            let player_id = ack.player_id;
            if reply.send(ack).is_err() {
                // The socket went away while we were spawning; undo the join.
                debug!(player_id = %player_id, "join reply dropped");
                connections.disconnect(sim, player_id);
            }
        }
        GameEvent::Leave { player_id } => {
            connections.disconnect(sim, player_id);
        }
        GameEvent::Command { player_id, command } => {
            connections.dispatch(sim, player_id, command);
        }
    }
}

fn run_tick<R: Rng>(sim: &mut Simulation<R>, connections: &mut ConnectionManager) {
    for event in sim.step() {
        connections.broadcast(ServerEvent::Notice(event));
    }
    connections.broadcast(ServerEvent::Snapshot(sim.snapshot()));
}
