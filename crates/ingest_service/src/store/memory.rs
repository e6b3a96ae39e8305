//! In-memory reading storage.
//!
//! Non-persistent fallback used when no redis backend is configured or
//! reachable at startup. A mutex-guarded deque keeps append+trim atomic
//! from the callers' perspective.

use super::{ReadingStore, RETENTION_LIMIT};
use crate::error::Result;
use async_trait::async_trait;
use common::{NewReading, Reading};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Bounded in-memory store, newest-first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: Mutex<VecDeque<Reading>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            readings: Mutex::new(VecDeque::with_capacity(RETENTION_LIMIT)),
        }
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, new: NewReading) -> Result<Reading> {
        let reading = new.into_reading();
        let mut readings = self.readings.lock().unwrap();
        readings.push_front(reading.clone());
        readings.truncate(RETENTION_LIMIT);
        Ok(reading)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Reading>> {
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .take(limit.min(RETENTION_LIMIT))
            .cloned()
            .collect())
    }

    async fn latest(&self) -> Result<Option<Reading>> {
        let readings = self.readings.lock().unwrap();
        Ok(readings.front().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn make_reading(temperature: f64) -> NewReading {
        NewReading {
            temperature,
            humidity: 45.0,
            device_id: None,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_latest_on_empty_store() {
        let store = MemoryStore::new();
        assert!(store.latest().await.unwrap().is_none());
        assert!(store.list_recent(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_returns_last_append() {
        let store = MemoryStore::new();
        store.append(make_reading(20.0)).await.unwrap();
        let second = store.append(make_reading(21.0)).await.unwrap();

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.temperature, 21.0);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store.append(make_reading(i as f64)).await.unwrap();
        }

        let recent = store.list_recent(100).await.unwrap();
        assert_eq!(recent.len(), 10);
        for (i, reading) in recent.iter().enumerate() {
            assert_eq!(reading.temperature, (9 - i) as f64);
        }
    }

    #[tokio::test]
    async fn test_append_trims_beyond_limit() {
        let store = MemoryStore::new();
        let first = store.append(make_reading(0.0)).await.unwrap();
        for i in 1..=RETENTION_LIMIT {
            store.append(make_reading(i as f64)).await.unwrap();
        }

        let recent = store.list_recent(RETENTION_LIMIT).await.unwrap();
        assert_eq!(recent.len(), RETENTION_LIMIT);
        // The 101st append evicted the very first reading.
        assert!(recent.iter().all(|r| r.id != first.id));
        assert_eq!(recent[0].temperature, RETENTION_LIMIT as f64);
        assert_eq!(recent[RETENTION_LIMIT - 1].temperature, 1.0);
    }

    #[tokio::test]
    async fn test_list_recent_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..20 {
            store.append(make_reading(i as f64)).await.unwrap();
        }

        let recent = store.list_recent(5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].temperature, 19.0);

        // A limit above the retention bound is capped, not an error.
        let capped = store.list_recent(10_000).await.unwrap();
        assert_eq!(capped.len(), 20);
    }

    #[tokio::test]
    async fn test_concurrent_appends_stay_within_capacity() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for i in 0..250 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(make_reading(i as f64)).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let recent = store.list_recent(RETENTION_LIMIT).await.unwrap();
        assert_eq!(recent.len(), RETENTION_LIMIT);

        let ids: HashSet<_> = recent.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), RETENTION_LIMIT);
    }
}
