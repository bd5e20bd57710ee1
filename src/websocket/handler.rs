//! WebSocket Handlers
//!
//! Handles upgrade requests and manages the connection lifecycle for
//! both collaboration rooms and the directory room.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::AppState;
use crate::directory::SessionDirectory;
use crate::room::RoomRegistry;

/// Connection parameters supplied out-of-band on the upgrade URL
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub username: Option<String>,
    #[serde(rename = "currentTool")]
    pub current_tool: Option<String>,
}

/// GET /rooms/:room_id/ws
///
/// Collaboration WebSocket upgrade. Identity comes from the query
/// string; the hub rejects the connection if `username` is absent.
pub async fn room_ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let rooms = Arc::clone(&state.rooms);
    ws.on_upgrade(move |socket| handle_room_socket(socket, rooms, room_id, params))
}

async fn handle_room_socket(
    socket: WebSocket,
    rooms: Arc<RoomRegistry>,
    room_id: String,
    params: ConnectParams,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let hub = rooms.room(&room_id).await;

    // Channel for relayed frames headed to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    let connection_id = match hub.accept(tx, params.username, params.current_tool).await {
        Ok(id) => id,
        Err(e) => {
            // No identity, no state: close immediately
            tracing::debug!(room = %room_id, error = %e, "Rejected connection");
            let _ = ws_sender.close().await;
            return;
        }
    };

    let conn_id_for_send = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Binary(frame)).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Binary(frame)) => {
                    hub_for_recv.handle_frame(&conn_id_for_recv, &frame).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %conn_id_for_recv, "Client requested close");
                    break;
                }
                // Collaboration sockets speak binary only
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.disconnect(&connection_id).await;
}

/// GET /directory/ws
///
/// Directory subscription upgrade. The socket immediately receives the
/// current snapshot, then a fresh one after every mutation.
pub async fn directory_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let directory = Arc::clone(&state.directory);
    ws.on_upgrade(move |socket| handle_directory_socket(socket, directory))
}

async fn handle_directory_socket(socket: WebSocket, directory: Arc<SessionDirectory>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let subscriber_id = match directory.subscribe(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to attach directory subscriber");
            let _ = ws_sender.close().await;
            return;
        }
    };

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let sub_id_for_recv = subscriber_id.clone();
    // The directory socket is outbound-only; drain until close
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        connection_id = %sub_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    directory.unsubscribe(&subscriber_id).await;
}
