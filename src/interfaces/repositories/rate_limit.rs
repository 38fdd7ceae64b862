use std::time::Duration;

use async_trait::async_trait;

use crate::errors::StoreError;

/// Key-value store holding per-email submission counters.
///
/// Reads and writes are separate calls, so a check followed by a put is not
/// atomic: concurrent submissions for the same key may both be admitted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Current count for `key`, or `None` if absent or expired.
    async fn get_count(&self, key: &str) -> Result<Option<u32>, StoreError>;

    /// Stores `count` under `key`, expiring `ttl` after this write.
    async fn put_count(&self, key: &str, count: u32, ttl: Duration) -> Result<(), StoreError>;

    /// Round-trips to the backing store.
    async fn ping(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}
