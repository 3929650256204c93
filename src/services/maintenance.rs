use std::time::Duration;

use crate::services::list_cache::ListCache;

/// Sweeps expired list pages on the cache TTL, at least once a minute.
pub fn spawn_cache_purge<V>(cache: ListCache<V>, ttl: Duration)
where
    V: Clone + Send + Sync + 'static,
{
    if !cache.is_enabled() {
        return;
    }
    tokio::spawn(async move {
        let period = ttl.min(Duration::from_secs(60));
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;
            let before = cache.len();
            cache.purge_expired();
            let purged = before.saturating_sub(cache.len());
            if purged > 0 {
                tracing::debug!("Purged {} expired comment list pages", purged);
            }
        }
    });
}
