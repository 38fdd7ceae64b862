use std::time::Duration;

use async_trait::async_trait;

use crate::{
    errors::StoreError,
    repositories::{
        memory_repo::MemoryRateLimitRepo,
        rate_limit::RateLimitRepository,
        redis_repo::RedisRateLimitRepo,
    },
};

/// Rate-limit store picked at startup: Redis when configured, otherwise the
/// in-process map.
#[derive(Clone)]
pub enum SharedRateLimitRepo {
    Redis(RedisRateLimitRepo),
    Memory(MemoryRateLimitRepo),
}

impl SharedRateLimitRepo {
    pub fn new(redis_pool: Option<deadpool_redis::Pool>) -> Self {
        match redis_pool {
            Some(pool) => SharedRateLimitRepo::Redis(RedisRateLimitRepo::new(pool)),
            None => SharedRateLimitRepo::Memory(MemoryRateLimitRepo::new()),
        }
    }

    pub fn as_memory(&self) -> Option<&MemoryRateLimitRepo> {
        match self {
            SharedRateLimitRepo::Memory(repo) => Some(repo),
            SharedRateLimitRepo::Redis(_) => None,
        }
    }
}

#[async_trait]
impl RateLimitRepository for SharedRateLimitRepo {
    async fn get_count(&self, key: &str) -> Result<Option<u32>, StoreError> {
        match self {
            SharedRateLimitRepo::Redis(repo) => repo.get_count(key).await,
            SharedRateLimitRepo::Memory(repo) => repo.get_count(key).await,
        }
    }

    async fn put_count(&self, key: &str, count: u32, ttl: Duration) -> Result<(), StoreError> {
        match self {
            SharedRateLimitRepo::Redis(repo) => repo.put_count(key, count, ttl).await,
            SharedRateLimitRepo::Memory(repo) => repo.put_count(key, count, ttl).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            SharedRateLimitRepo::Redis(repo) => repo.ping().await,
            SharedRateLimitRepo::Memory(repo) => repo.ping().await,
        }
    }

    fn backend(&self) -> &'static str {
        match self {
            SharedRateLimitRepo::Redis(repo) => repo.backend(),
            SharedRateLimitRepo::Memory(repo) => repo.backend(),
        }
    }
}
