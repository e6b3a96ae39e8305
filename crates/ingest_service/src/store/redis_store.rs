//! Redis-backed reading storage.
//!
//! Readings live in a single list, newest-first, as JSON documents.
//! Append pushes at the head and trims the tail in one atomic pipeline so
//! concurrent writers cannot leave the list above capacity.

use super::{ReadingStore, RETENTION_LIMIT};
use crate::error::Result;
use async_trait::async_trait;
use common::{NewReading, Reading};
use redis::AsyncCommands;
use tracing::debug;

/// Redis key holding the reading list.
const READINGS_KEY: &str = "readings";

/// Durable reading store on a redis list.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    /// Connect to redis and verify it is reachable.
    ///
    /// The ping is the startup probe: if it fails the caller falls back to
    /// in-memory storage for the rest of the process lifetime.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(Self { client })
    }

    /// Get an async connection.
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }
}

#[async_trait]
impl ReadingStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn append(&self, new: NewReading) -> Result<Reading> {
        let reading = new.into_reading();
        let json = serde_json::to_string(&reading)?;

        let mut conn = self.get_connection().await?;
        redis::pipe()
            .atomic()
            .lpush(READINGS_KEY, &json)
            .ignore()
            .ltrim(READINGS_KEY, 0, RETENTION_LIMIT as isize - 1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!("Stored reading {} from {}", reading.id, reading.device_id);
        Ok(reading)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Reading>> {
        let limit = limit.min(RETENTION_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.get_connection().await?;
        let raw: Vec<String> = conn.lrange(READINGS_KEY, 0, limit as isize - 1).await?;

        let mut readings = Vec::with_capacity(raw.len());
        for json in raw {
            readings.push(serde_json::from_str(&json)?);
        }
        Ok(readings)
    }

    async fn latest(&self) -> Result<Option<Reading>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.lindex(READINGS_KEY, 0).await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
