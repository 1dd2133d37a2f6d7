/// Realtime channel registry and WebSocket endpoint
///
/// Maps a user id to its set of live connections ("room"). A user may hold
/// several simultaneous connections (multi-device); every one of them
/// receives pushes for that user. Delivery is best-effort: if no connection
/// is joined, the push is silently dropped — no queuing, no retry. The
/// durable notification row is the source of truth.
///
/// # Protocol
///
/// `GET /ws` upgrades to a WebSocket. The first text frame from the client
/// must be a join event naming the room to subscribe to:
///
/// ```json
/// { "event": "join", "userId": "..." }
/// ```
///
/// After joining, the server emits frames of the form:
///
/// ```json
/// { "event": "task-assigned", "data": { "message": "...", "task": { ... } } }
/// ```
///
/// Disconnecting implicitly leaves the room.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::AppState;

/// Event name for assignment pushes
pub const TASK_ASSIGNED_EVENT: &str = "task-assigned";

type ConnectionMap = HashMap<Uuid, HashMap<u64, mpsc::UnboundedSender<String>>>;

/// Registry of live connections keyed by user id
///
/// The map is mutated by join/leave/push arriving concurrently from many
/// clients; the lock is held only to mutate or snapshot the per-user set,
/// never across a send await point (senders are unbounded, sending never
/// blocks).
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    connections: Arc<RwLock<ConnectionMap>>,
    next_conn_id: Arc<AtomicU64>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a new connection with the user's room
    ///
    /// Returns the connection id (needed to leave) and the receiving end
    /// the socket task forwards to the client.
    pub fn join(&self, user_id: Uuid) -> (u64, mpsc::UnboundedReceiver<String>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut connections = self.connections.write().expect("registry lock poisoned");
        connections.entry(user_id).or_default().insert(conn_id, tx);

        debug!(%user_id, conn_id, "Connection joined room");
        (conn_id, rx)
    }

    /// Removes a connection from the user's room
    ///
    /// No error if the connection is already absent.
    pub fn leave(&self, user_id: Uuid, conn_id: u64) {
        let mut connections = self.connections.write().expect("registry lock poisoned");

        if let Some(room) = connections.get_mut(&user_id) {
            room.remove(&conn_id);
            if room.is_empty() {
                connections.remove(&user_id);
            }
        }

        debug!(%user_id, conn_id, "Connection left room");
    }

    /// Delivers an event to every connection in the user's room
    ///
    /// Returns the number of connections the frame was handed to. Zero
    /// connections means the push is dropped — by design, not an error.
    pub fn push_to_user(&self, user_id: Uuid, event: &str, payload: serde_json::Value) -> usize {
        let frame = json!({ "event": event, "data": payload }).to_string();

        let senders: Vec<(u64, mpsc::UnboundedSender<String>)> = {
            let connections = self.connections.read().expect("registry lock poisoned");
            match connections.get(&user_id) {
                Some(room) => room.iter().map(|(id, tx)| (*id, tx.clone())).collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (conn_id, tx) in senders {
            if tx.send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(conn_id);
            }
        }

        // Connections whose socket task has gone away are pruned here
        for conn_id in dead {
            self.leave(user_id, conn_id);
        }

        delivered
    }

    /// Number of live connections in the user's room
    pub fn connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .read()
            .expect("registry lock poisoned")
            .get(&user_id)
            .map(|room| room.len())
            .unwrap_or(0)
    }
}

/// Join event sent by the client as its first frame
#[derive(Debug, Deserialize)]
struct JoinFrame {
    event: String,
    #[serde(rename = "userId")]
    user_id: Uuid,
}

/// WebSocket upgrade handler for `GET /ws`
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let registry = state.channels.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Runs one client connection: wait for the join frame, then forward room
/// events until the client disconnects
async fn handle_socket(socket: WebSocket, registry: ChannelRegistry) {
    let (mut sink, mut stream) = socket.split();

    // The first meaningful frame must be a join event
    let user_id = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<JoinFrame>(&text) {
                Ok(frame) if frame.event == "join" => break frame.user_id,
                Ok(frame) => {
                    warn!(event = %frame.event, "Expected join event, ignoring frame");
                }
                Err(_) => {
                    warn!("Unparseable frame before join, ignoring");
                }
            },
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(_)) => return,
        }
    };

    let (conn_id, mut events) = registry.join(user_id);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(frame) => {
                    if sink.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Inbound traffic after join is ignored
                Some(Ok(_)) => {}
            },
        }
    }

    registry.leave(user_id, conn_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_reaches_joined_connection() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();

        let (_conn, mut rx) = registry.join(user);

        let delivered = registry.push_to_user(user, TASK_ASSIGNED_EVENT, json!({"x": 1}));
        assert_eq!(delivered, 1);

        let frame = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "task-assigned");
        assert_eq!(value["data"]["x"], 1);
    }

    #[tokio::test]
    async fn test_push_to_absent_user_is_silently_dropped() {
        let registry = ChannelRegistry::new();

        let delivered = registry.push_to_user(Uuid::new_v4(), TASK_ASSIGNED_EVENT, json!({}));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_multi_device_fanout() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();

        let (_c1, mut rx1) = registry.join(user);
        let (_c2, mut rx2) = registry.join(user);
        assert_eq!(registry.connection_count(user), 2);

        let delivered = registry.push_to_user(user, TASK_ASSIGNED_EVENT, json!({"n": 2}));
        assert_eq!(delivered, 2);

        assert!(rx1.recv().await.is_some());
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_push_does_not_cross_rooms() {
        let registry = ChannelRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let (_a, _rx_a) = registry.join(alice);
        let (_b, mut rx_b) = registry.join(bob);

        registry.push_to_user(alice, TASK_ASSIGNED_EVENT, json!({}));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_removes_connection() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();

        let (conn, _rx) = registry.join(user);
        assert_eq!(registry.connection_count(user), 1);

        registry.leave(user, conn);
        assert_eq!(registry.connection_count(user), 0);

        // Leaving twice is a no-op
        registry.leave(user, conn);
    }

    #[tokio::test]
    async fn test_push_prunes_dead_connections() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();

        let (_conn, rx) = registry.join(user);
        drop(rx);

        let delivered = registry.push_to_user(user, TASK_ASSIGNED_EVENT, json!({}));
        assert_eq!(delivered, 0);
        assert_eq!(registry.connection_count(user), 0);
    }
}
