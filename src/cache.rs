use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Holds one fetched list for a bounded time.
///
/// Owned by `AppState`; every handler that mutates the underlying data calls
/// [`ListCache::invalidate`]. A fetch that started before an invalidation is
/// returned to its caller but not stored.
#[derive(Clone)]
pub struct ListCache<T> {
    ttl: Duration,
    state: Arc<Mutex<CacheState<T>>>,
}

struct CacheState<T> {
    entry: Option<CacheEntry<T>>,
    generation: u64,
}

struct CacheEntry<T> {
    items: Arc<Vec<T>>,
    fetched_at: Instant,
}

impl<T> ListCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(Mutex::new(CacheState {
                entry: None,
                generation: 0,
            })),
        }
    }

    /// The cached list if it is younger than the TTL.
    #[cfg(test)]
    async fn get(&self) -> Option<Arc<Vec<T>>> {
        self.lookup().await.0
    }

    #[cfg(test)]
    async fn put(&self, items: Vec<T>) -> Arc<Vec<T>> {
        let items = Arc::new(items);
        self.state.lock().await.entry = Some(CacheEntry {
            items: items.clone(),
            fetched_at: Instant::now(),
        });
        items
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.entry = None;
        state.generation += 1;
    }

    /// Returns the cached list, or runs `fetch` and caches its result.
    /// Errors from `fetch` are returned and nothing is cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<Arc<Vec<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>, E>>,
    {
        let (cached, generation) = self.lookup().await;
        if let Some(items) = cached {
            tracing::debug!(len = items.len(), "List cache hit");
            return Ok(items);
        }

        let items = Arc::new(fetch().await?);
        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.entry = Some(CacheEntry {
                items: items.clone(),
                fetched_at: Instant::now(),
            });
        }
        Ok(items)
    }

    async fn lookup(&self) -> (Option<Arc<Vec<T>>>, u64) {
        let state = self.state.lock().await;
        let items = state
            .entry
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.items.clone());
        (items, state.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn serves_cached_list_within_ttl() {
        let cache = ListCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let items = cache
                .get_or_fetch(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(*items, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = ListCache::new(Duration::from_secs(60));
        cache.put(vec!["old"]).await;
        cache.invalidate().await;
        assert!(cache.get().await.is_none());

        let items = cache
            .get_or_fetch(|| async { Ok::<_, ()>(vec!["new"]) })
            .await
            .unwrap();
        assert_eq!(*items, vec!["new"]);
    }

    #[tokio::test]
    async fn zero_ttl_never_caches() {
        let cache = ListCache::new(Duration::ZERO);
        cache.put(vec![1]).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn expires_after_ttl() {
        let cache = ListCache::new(Duration::from_millis(20));
        cache.put(vec![1]).await;
        assert!(cache.get().await.is_some());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn invalidation_during_fetch_discards_result() {
        let cache = ListCache::new(Duration::from_secs(60));
        let items = cache
            .get_or_fetch(|| async {
                cache.invalidate().await;
                Ok::<_, ()>(vec![1])
            })
            .await
            .unwrap();
        assert_eq!(*items, vec![1]);
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn fetch_errors_are_not_cached() {
        let cache: ListCache<i32> = ListCache::new(Duration::from_secs(60));
        let result = cache.get_or_fetch(|| async { Err("boom") }).await;
        assert_eq!(result.unwrap_err(), "boom");
        assert!(cache.get().await.is_none());
    }
}
