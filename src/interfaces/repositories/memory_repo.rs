use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::{errors::StoreError, repositories::rate_limit::RateLimitRepository};

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    expires_at: Instant,
}

/// Process-local counter store for development and tests. Entries expire
/// lazily on read and are swept by `purge_expired`.
#[derive(Clone, Default)]
pub struct MemoryRateLimitRepo {
    map: Arc<DashMap<String, Entry>>,
}

impl MemoryRateLimitRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired counters and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.map.len();
        self.map.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.map.len())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl RateLimitRepository for MemoryRateLimitRepo {
    async fn get_count(&self, key: &str) -> Result<Option<u32>, StoreError> {
        let now = Instant::now();
        let live = self
            .map
            .get(key)
            .map(|entry| (entry.count, entry.expires_at > now));

        match live {
            Some((count, true)) => Ok(Some(count)),
            Some((_, false)) => {
                self.map.remove_if(key, |_, entry| entry.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put_count(&self, key: &str, count: u32, ttl: Duration) -> Result<(), StoreError> {
        self.map.insert(
            key.to_string(),
            Entry {
                count,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
