use tokio::time::{interval, Duration};

use crate::repositories::memory_repo::MemoryRateLimitRepo;

/// Periodically drops expired in-memory counters. Redis expires its own keys.
pub async fn start_purge_task(repo: MemoryRateLimitRepo, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let purged = repo.purge_expired();
        if purged > 0 {
            tracing::debug!("Purged {} expired rate-limit counters", purged);
        }
    }
}
