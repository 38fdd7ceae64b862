use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::{errors::StoreError, repositories::rate_limit::RateLimitRepository};

#[derive(Clone)]
pub struct RedisRateLimitRepo {
    pool: Pool,
}

impl RedisRateLimitRepo {
    pub fn new(pool: Pool) -> Self {
        RedisRateLimitRepo { pool }
    }
}

#[async_trait]
impl RateLimitRepository for RedisRateLimitRepo {
    async fn get_count(&self, key: &str) -> Result<Option<u32>, StoreError> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(key).await?;

        // A value we did not write (or cannot read) counts as zero.
        Ok(raw.map(|v| v.trim().parse().unwrap_or(0)))
    }

    async fn put_count(&self, key: &str, count: u32, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(key, count.to_string(), ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let pong: String = conn.ping().await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::RedisOperation(format!("unexpected ping reply: {pong}")))
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
