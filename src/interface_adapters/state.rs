use crate::use_cases::GameEvent;
use axum::extract::ws::Utf8Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc, watch};

/// A serialized outbound message tagged with its stream position.
#[derive(Debug, Clone)]
pub struct OutboundBytes {
    pub seq: u64,
    pub text: Utf8Bytes,
}

impl Default for OutboundBytes {
    fn default() -> Self {
        Self {
            seq: 0,
            text: Utf8Bytes::from(""),
        }
    }
}

impl OutboundBytes {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct AppState {
    // Commands flowing from the network into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Serialized outbound messages, shared across all connections.
    pub outbound_bytes_tx: broadcast::Sender<OutboundBytes>,
    // Latest serialized snapshot for lag recovery.
    pub latest_snapshot_tx: watch::Sender<OutboundBytes>,
    // Log correlation only; players get their id from the world.
    next_conn_id: AtomicU64,
}

impl AppState {
    pub fn new(
        input_tx: mpsc::Sender<GameEvent>,
        outbound_bytes_tx: broadcast::Sender<OutboundBytes>,
        latest_snapshot_tx: watch::Sender<OutboundBytes>,
    ) -> Self {
        Self {
            input_tx,
            outbound_bytes_tx,
            latest_snapshot_tx,
            next_conn_id: AtomicU64::new(1),
        }
    }

    pub fn next_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }
}
