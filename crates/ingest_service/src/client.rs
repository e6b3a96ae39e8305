//! Connected dashboard session state and registry.
//!
//! Every connected session receives every new reading, so the registry is
//! a flat id → state map with no subscription filtering. Uses DashMap for
//! lock-free concurrent access from the broadcast and connection paths.

use crate::error::{Error, Result};
use axum::extract::ws::Message;
use chrono::Utc;
use common::ServerMessage;
use dashmap::DashMap;
use metrics::counter;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique session identifier.
pub type ClientId = Uuid;

/// Buffer size for per-client message channels. Bounded so one slow
/// client cannot accumulate unbounded memory; a full buffer drops the
/// message for that client only.
pub const CLIENT_CHANNEL_BUFFER_SIZE: usize = 64;

/// State for a single connected dashboard session.
pub struct ClientState {
    /// Unique session identifier.
    pub id: ClientId,
    /// Channel to the session's websocket forwarding task.
    pub tx: mpsc::Sender<Message>,
    /// Timestamp when the session connected.
    pub connected_at: i64,
    /// Timestamp of the last ping received.
    last_ping: AtomicI64,
}

impl ClientState {
    /// Create state for a freshly connected session.
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            tx,
            connected_at: now,
            last_ping: AtomicI64::new(now),
        }
    }

    /// Send a protocol message to this session.
    /// Non-blocking; fails if the session is gone or its buffer is full.
    pub fn send(&self, msg: &ServerMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.tx
            .try_send(Message::Text(json.into()))
            .map_err(|_| Error::ChannelSend)
    }

    /// Record a ping from this session.
    pub fn update_ping(&self) {
        self.last_ping
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Last ping timestamp in epoch milliseconds.
    pub fn last_ping_time(&self) -> i64 {
        self.last_ping.load(Ordering::Relaxed)
    }
}

/// Registry of connected dashboard sessions.
///
/// Join and leave are independent of store state; a session that connects
/// after N readings were stored sees none of them here, only future
/// broadcasts.
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<ClientId, Arc<ClientState>>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    /// Register a newly connected session.
    pub fn register(&self, client: Arc<ClientState>) -> ClientId {
        let id = client.id;
        self.clients.insert(id, client);
        debug!("Client {} registered", id);
        id
    }

    /// Remove a session.
    pub fn unregister(&self, client_id: &ClientId) {
        if self.clients.remove(client_id).is_some() {
            debug!("Client {} unregistered", client_id);
        }
    }

    /// Get a session by id.
    pub fn get(&self, client_id: &ClientId) -> Option<Arc<ClientState>> {
        self.clients.get(client_id).map(|r| r.clone())
    }

    /// Number of connected sessions.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Push a message to every connected session, fire-and-forget.
    ///
    /// The message is serialized once; delivery is at-most-once per
    /// session with no retry and no queuing for sessions that connect
    /// later. A full per-client buffer drops the message for that client.
    pub fn broadcast(&self, msg: &ServerMessage) {
        if self.clients.is_empty() {
            return;
        }

        let json = match serde_json::to_string(msg) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize broadcast message: {}", e);
                return;
            }
        };

        for entry in self.clients.iter() {
            let client = entry.value();
            if client
                .tx
                .try_send(Message::Text(json.clone().into()))
                .is_err()
            {
                debug!("Dropped broadcast for slow client {}", client.id);
                counter!("broadcast_messages_dropped_total").increment(1);
            } else {
                counter!("broadcast_messages_total").increment(1);
            }
        }
    }
}
