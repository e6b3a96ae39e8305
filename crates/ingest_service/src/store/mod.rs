//! Reading storage backends.
//!
//! A single `ReadingStore` capability with two interchangeable
//! implementations: a durable redis-backed list and a bounded in-memory
//! deque. The backend is picked once at process start; callers never see
//! which one they are talking to. No update or delete exists — readings
//! leave the store only by capacity eviction.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::error::Result;
use async_trait::async_trait;
use common::{NewReading, Reading};
use std::sync::Arc;
use tracing::{info, warn};

/// Maximum number of readings retained; appends trim the oldest beyond this.
pub const RETENTION_LIMIT: usize = 100;

/// Storage capability for sensor readings.
///
/// Both implementations keep readings newest-first, bounded to
/// [`RETENTION_LIMIT`], and must serialize `append` so concurrent writers
/// cannot leave the store above capacity or corrupt ordering.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Backend label for health reporting and startup logs.
    fn backend_name(&self) -> &'static str;

    /// Assign id/defaults, insert at the head, trim the tail beyond
    /// [`RETENTION_LIMIT`]. Returns the stored reading.
    async fn append(&self, new: NewReading) -> Result<Reading>;

    /// Most recent readings, newest-first, at most
    /// `min(limit, RETENTION_LIMIT)` entries.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Reading>>;

    /// The most recently appended reading, if any.
    async fn latest(&self) -> Result<Option<Reading>>;
}

/// Shared handle to the process-wide store.
pub type SharedStore = Arc<dyn ReadingStore>;

/// Select the storage backend for the process lifetime.
///
/// Probes redis when a URL is configured; if it is absent or unreachable
/// the service runs on the in-memory store instead. The choice is made
/// exactly once — a redis failure later surfaces as a storage error rather
/// than a mid-operation fallback.
pub async fn connect(redis_url: Option<&str>) -> SharedStore {
    match redis_url {
        Some(url) => match RedisStore::connect(url).await {
            Ok(store) => {
                info!("Connected to redis at {}, using durable storage", url);
                Arc::new(store)
            }
            Err(e) => {
                warn!(
                    "Redis at {} unavailable ({}), using in-memory storage for this process",
                    url, e
                );
                Arc::new(MemoryStore::new())
            }
        },
        None => {
            warn!("REDIS_URL not set, using in-memory storage for this process");
            Arc::new(MemoryStore::new())
        }
    }
}
