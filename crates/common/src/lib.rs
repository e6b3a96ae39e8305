//! Shared types for the IoT sensor relay.
//!
//! The reading data model and the websocket protocol messages exchanged
//! between the ingest service and dashboard clients.

pub mod protocol;
pub mod reading;

pub use protocol::{ClientMessage, ServerMessage};
pub use reading::{NewReading, Reading, DEFAULT_DEVICE_ID};
