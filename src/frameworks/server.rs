// Framework bootstrap for the arena server runtime.

use crate::domain::tuning::GameTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{outbound_serializer, ws_handler};
use crate::interface_adapters::state::{AppState, OutboundBytes};
use crate::use_cases::game::world_task;
use crate::use_cases::{ConnectionManager, GameEvent, OutboundFrame, Simulation};

use axum::{Router, routing::get};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::{io::Result, sync::Arc};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the game on an already bound listener until the server fails.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let app = router(build_state());

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = format!("{}:{}", config::bind_host(), config::http_port());

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

fn build_state() -> Arc<AppState> {
    // input_tx/rx: every connection feeds the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);

    // frames_tx: domain events and snapshots, in broadcast order.
    let (frames_tx, frames_rx) =
        broadcast::channel::<OutboundFrame>(config::OUTBOUND_BROADCAST_CAPACITY);

    // outbound_bytes_tx: the same frames serialized once for all connections.
    let (outbound_bytes_tx, _outbound_bytes_rx) =
        broadcast::channel::<OutboundBytes>(config::OUTBOUND_BROADCAST_CAPACITY);
    let (latest_snapshot_tx, _latest_snapshot_rx) = watch::channel(OutboundBytes::default());

    // The serializer subscribed above, before the world task can emit anything.
    let serializer = tokio::spawn(outbound_serializer(
        frames_rx,
        outbound_bytes_tx.clone(),
        latest_snapshot_tx.clone(),
    ));
    tokio::spawn(watch_task("outbound_serializer", serializer));

    let sim = Simulation::new(GameTuning::default(), StdRng::from_entropy());
    tracing::info!(
        coins = sim.registry().collectibles.len(),
        npcs = sim.registry().npcs.len(),
        "world seeded"
    );
    let world = tokio::spawn(world_task(
        input_rx,
        sim,
        ConnectionManager::new(frames_tx),
        config::TICK_INTERVAL,
    ));
    tokio::spawn(watch_task("world", world));

    Arc::new(AppState::new(input_tx, outbound_bytes_tx, latest_snapshot_tx))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskExit {
    Finished,
    Panicked,
    Cancelled,
}

/// Waits on a long-lived task and logs how it ended.
///
/// Neither task is expected to return while the server is up, so any exit is reported.
async fn watch_task(name: &'static str, handle: JoinHandle<()>) -> TaskExit {
    match handle.await {
        Ok(()) => {
            tracing::warn!(task = name, "task exited");
            TaskExit::Finished
        }
        Err(e) if e.is_panic() => {
            tracing::error!(task = name, error = %e, "task panicked");
            TaskExit::Panicked
        }
        Err(e) => {
            tracing::error!(task = name, error = %e, "task cancelled");
            TaskExit::Cancelled
        }
    }
}
