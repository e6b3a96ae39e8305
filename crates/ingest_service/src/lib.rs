//! Ingest service: real-time sensor reading relay.
//!
//! This service:
//! - Accepts sensor readings over HTTP and stores the most recent 100,
//!   newest-first, in redis or an in-memory fallback
//! - Pushes every stored reading to all connected websocket sessions
//! - Serves bounded history queries for the dashboard
//!
//! ## Architecture
//!
//! ```text
//! POST /data ─┐
//!             ├─> ReadingStore (append + trim to 100)
//! simulation ─┘         ↓
//!             ClientRegistry (DashMap-based broadcast)
//!                        ↓
//!             Websocket sessions (/ws)
//! ```
//!
//! Broadcast is fire-and-forget: at-most-once per session, no retry, no
//! backlog replay for sessions that connect later.

pub mod api;
pub mod client;
pub mod error;
pub mod ingest;
pub mod simulation;
pub mod store;
pub mod ws_server;

pub use api::{create_router, AppState};
pub use client::{ClientId, ClientRegistry, ClientState};
pub use error::{Error, Result};
pub use store::{MemoryStore, ReadingStore, RedisStore, SharedStore, RETENTION_LIMIT};
