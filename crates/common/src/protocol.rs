//! Websocket protocol message types.
//!
//! JSON messages exchanged over `/ws`. Connected sessions receive a
//! `new_data` event for every reading that is successfully ingested; no
//! backlog is replayed on connect (history comes from `GET /data`).

use crate::reading::Reading;
use serde::{Deserialize, Serialize};

/// Message sent from a dashboard client to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive ping.
    Ping,
}

/// Message sent from the server to a dashboard client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A freshly ingested reading, pushed to every connected session.
    NewData { reading: Reading },
    /// Pong response to a client ping.
    Pong,
    /// Error message.
    Error { message: String, code: String },
}
