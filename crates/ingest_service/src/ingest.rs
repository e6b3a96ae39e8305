//! The ingestion pipeline: append to the store, then broadcast.
//!
//! Shared by the HTTP handler and the in-process simulation task so both
//! paths have identical semantics: a storage failure propagates and the
//! reading is NOT broadcast; a successful append produces exactly one
//! broadcast event.

use crate::client::ClientRegistry;
use crate::error::Result;
use crate::store::SharedStore;
use common::{NewReading, Reading, ServerMessage};
use metrics::counter;

/// Ingest one reading: store it, then push it to every connected session.
pub async fn ingest(
    store: &SharedStore,
    registry: &ClientRegistry,
    new: NewReading,
) -> Result<Reading> {
    let reading = store.append(new).await?;
    counter!("ingest_readings_total").increment(1);

    registry.broadcast(&ServerMessage::NewData {
        reading: reading.clone(),
    });

    Ok(reading)
}
