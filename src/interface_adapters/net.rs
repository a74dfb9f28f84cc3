use crate::domain::EntityId;
use crate::interface_adapters::protocol::{ServerMessage, parse_client_message};
use crate::interface_adapters::state::{AppState, OutboundBytes};
use crate::use_cases::{GameEvent, OutboundFrame};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    WorldClosed,
    JoinRejected,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

/// Serializes each outbound frame once and rebroadcasts the shared bytes.
pub async fn outbound_serializer(
    mut frames_rx: broadcast::Receiver<OutboundFrame>,
    bytes_tx: broadcast::Sender<OutboundBytes>,
    latest_snapshot_tx: watch::Sender<OutboundBytes>,
) {
    loop {
        match frames_rx.recv().await {
            Ok(frame) => {
                let msg = ServerMessage::from(&frame.event);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(seq = frame.seq, error = ?e, "failed to serialize outbound frame");
                        continue;
                    }
                };

                let bytes = OutboundBytes {
                    seq: frame.seq,
                    text: Utf8Bytes::from(txt),
                };
                if frame.event.is_snapshot() {
                    // Stored even while nobody is subscribed.
                    latest_snapshot_tx.send_replace(bytes.clone());
                }
                let _ = bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "outbound serializer lagged; skipping to latest frame");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("outbound frames channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Separate connection id for correlating logs before a player id exists.
    let conn_id = state.next_conn_id();
    let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
    serve_connection(socket, state).instrument(span).await;
}

async fn serve_connection(mut socket: WebSocket, state: Arc<AppState>) {
    let mut ctx = match bootstrap_connection(&mut socket, &state).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: "join failed".into(),
                })))
                .await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id.0);
    info!("client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket.send(Message::Text(txt.into())).await?;
    Ok(bytes)
}

struct ConnCtx {
    player_id: EntityId,
    input_tx: mpsc::Sender<GameEvent>,
    outbound_rx: broadcast::Receiver<OutboundBytes>,
    latest_snapshot_rx: watch::Receiver<OutboundBytes>,
    // Frames below this sequence number predate what the client has already seen.
    resume_seq: u64,
    lag_recovery_count: u64,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_messages: u32,

    last_input_full_log: Instant,
    last_lag_log: Instant,
    last_invalid_input_log: Instant,
}

async fn bootstrap_connection(socket: &mut WebSocket, state: &AppState) -> Result<ConnCtx, NetError> {
    // Subscribe before joining so the snapshot broadcast for this join is not missed.
    let outbound_rx = state.outbound_bytes_tx.subscribe();
    let latest_snapshot_rx = state.latest_snapshot_tx.subscribe();

    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .input_tx
        .send(GameEvent::Join { reply: reply_tx })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let ack = reply_rx.await.map_err(|_| NetError::JoinRejected)?;
    let player_id = ack.player_id;

    // If anything after Join fails, compensate with Leave to avoid a ghost player.
    let init_bytes = match send_message(socket, &ServerMessage::from(&ack)).await {
        Ok(bytes) => bytes,
        Err(e) => {
            state
                .input_tx
                .send(GameEvent::Leave { player_id })
                .await
                .map_err(|_| NetError::InputClosed)?;
            return Err(e);
        }
    };

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        input_tx: state.input_tx.clone(),
        outbound_rx,
        latest_snapshot_rx,
        resume_seq: ack.first_seq,
        lag_recovery_count: 0,

        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out: init_bytes as u64,

        invalid_messages: 0,

        last_input_full_log: now,
        last_lag_log: now,
        last_invalid_input_log: now,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

fn is_stale(seq: u64, resume_seq: u64) -> bool {
    seq < resume_seq
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            outbound = ctx.outbound_rx.recv() => {
                match outbound {
                    Ok(bytes) if is_stale(bytes.seq, ctx.resume_seq) => false,
                    Ok(bytes) => matches!(
                        forward_bytes(bytes.text, socket, ctx).await,
                        LoopControl::Disconnect
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_lag_log) {
                            warn!(missed = n, "outbound lagged; sending latest snapshot");
                        }
                        matches!(recover_from_lag(socket, ctx).await, LoopControl::Disconnect)
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Err(err) = socket.send(Message::Close(None)).await {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, axum::Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id.0;
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            ctx.bytes_in += text.len() as u64;

            let command = match parse_client_message(&text) {
                Ok(command) => command,
                Err(e) => {
                    // Bad messages are dropped; the connection stays open.
                    ctx.invalid_messages += 1;
                    if should_log(&mut ctx.last_invalid_input_log) {
                        warn!(player_id, bytes = text.len(), error = %e, "dropping client message");
                    }
                    return Ok(LoopControl::Continue);
                }
            };

            let event = GameEvent::Command {
                player_id: ctx.player_id,
                command,
            };
            match ctx.input_tx.try_send(event) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if should_log(&mut ctx.last_input_full_log) {
                        warn!(player_id, "input channel full; dropping command");
                    }
                    Ok(LoopControl::Continue)
                }
                Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::InputClosed),
            }
        }
        Some(Ok(Message::Binary(bytes))) => {
            ctx.msgs_in += 1;
            ctx.bytes_in += bytes.len() as u64;
            ctx.invalid_messages += 1;
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(player_id, bytes = bytes.len(), "binary messages not supported; dropping");
            }
            Ok(LoopControl::Continue)
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(LoopControl::Continue),
        Some(Ok(Message::Close(_))) => Ok(LoopControl::Disconnect),
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn recover_from_lag(socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let latest = ctx.latest_snapshot_rx.borrow().clone();
    if latest.is_empty() || is_stale(latest.seq, ctx.resume_seq) {
        if should_log(&mut ctx.last_lag_log) {
            warn!("snapshot unavailable during lag recovery");
        }
        return LoopControl::Continue;
    }

    // Anything still buffered up to this snapshot is superseded by it.
    ctx.resume_seq = latest.seq + 1;
    ctx.lag_recovery_count += 1;
    let bytes_len = latest.text.len();
    let outcome = forward_bytes(latest.text, socket, ctx).await;
    if should_log(&mut ctx.last_lag_log) {
        debug!(
            bytes = bytes_len,
            count = ctx.lag_recovery_count,
            "sent lag recovery snapshot"
        );
    }
    outcome
}

async fn forward_bytes(text: Utf8Bytes, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let bytes_len = text.len();
    match socket.send(Message::Text(text)).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send outbound message");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    ctx.input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_messages = ctx.invalid_messages,
        lag_recovery_count = ctx.lag_recovery_count,
        "connection stats"
    );
    info!(player_id = player_id.0, "client disconnected");
    Ok(())
}
