//! The realtime synchronization channel.
//!
//! Connection lifecycle: `Pending` (open, no room) -> `Bound` (first text
//! frame named a known room) -> `Closed`. Room selection is one-shot - every
//! text frame after the first is ignored. A frame naming an unknown room is
//! answered with exactly one fixed payload (empty schedule, the invalid-room
//! textbox, current weather) and the connection closes without ever joining
//! a subscriber set.
//!
//! Heartbeat: a per-connection interval sends a protocol-level Ping; if the
//! Pong has not arrived by the next tick the connection is pruned. The
//! interval dies with this task, so the timer is cancelled exactly once
//! however the connection ends.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::application::{BroadcastCoordinator, ConnectionId, OutboundFrame, OutboundSender, RoomRegistry};
use crate::domain::foundation::RoomName;
use crate::domain::layout::INVALID_ROOM_SLOT;
use crate::domain::RoomSnapshot;

use super::AppState;

/// `GET /sync` - upgrade to the room synchronization channel.
pub async fn sync_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_sync_socket(socket, state))
}

/// What became of a first-frame bind attempt.
enum BindOutcome {
    /// Subscribed; a targeted snapshot was already queued on the channel
    Bound(RoomName),
    /// Unknown room: send this payload once, then close
    InvalidRoom(String),
}

/// Bind a pending connection to the room its first frame names.
async fn bind_first_frame(
    registry: &RoomRegistry,
    broadcast: &BroadcastCoordinator,
    conn_id: ConnectionId,
    sender: &OutboundSender,
    frame: &str,
) -> BindOutcome {
    match RoomName::new(frame) {
        Ok(room) if registry.subscribe(room.as_str(), conn_id, sender.clone()) => {
            tracing::info!(room = %room, connection = %conn_id, "connection bound");
            broadcast.update_one(sender, &room).await;
            BindOutcome::Bound(room)
        }
        _ => {
            tracing::info!(connection = %conn_id, frame, "unknown room requested");
            BindOutcome::InvalidRoom(invalid_room_payload(broadcast))
        }
    }
}

/// The fixed payload for a connection that named an unknown room.
fn invalid_room_payload(broadcast: &BroadcastCoordinator) -> String {
    let snapshot = RoomSnapshot {
        schedule: Vec::new(),
        layout: INVALID_ROOM_SLOT.clone(),
        weather: broadcast.current_weather(),
    };
    serde_json::to_string(&snapshot).unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid-room payload serialization failed");
        String::from("{\"schedule\":[]}")
    })
}

async fn handle_sync_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let conn_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let mut bound_room: Option<RoomName> = None;
    let mut awaiting_ack = false;
    let mut heartbeat = tokio::time::interval(state.heartbeat_period);
    // the first tick resolves immediately; consume it so the first probe
    // goes out a full period after connect
    heartbeat.tick().await;

    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(OutboundFrame::Payload(payload)) => {
                    if sink.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Some(OutboundFrame::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },

            _ = heartbeat.tick() => {
                if awaiting_ack {
                    tracing::debug!(connection = %conn_id, "heartbeat unanswered; pruning");
                    break;
                }
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
                awaiting_ack = true;
            },

            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if bound_room.is_some() {
                        // room selection is one-shot
                        continue;
                    }
                    match bind_first_frame(&state.registry, &state.broadcast, conn_id, &tx, &text)
                        .await
                    {
                        BindOutcome::Bound(room) => bound_room = Some(room),
                        BindOutcome::InvalidRoom(payload) => {
                            let _ = sink.send(Message::Text(payload)).await;
                            let _ = sink.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }
                Some(Ok(Message::Pong(_))) => {
                    awaiting_ack = false;
                }
                Some(Ok(Message::Close(_))) | None => {
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(connection = %conn_id, error = %e, "websocket error");
                    break;
                }
            },
        }
    }

    if let Some(room) = bound_room {
        state.registry.unsubscribe(room.as_str(), &conn_id);
        tracing::info!(room = %room, connection = %conn_id, "connection closed");
    }
    // dropping the task drops the heartbeat interval and the outbound
    // channel; a broadcast racing the close just sees a send error
}
