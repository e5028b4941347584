//! Query cache with stale time
//!
//! Wraps a `moka::future::Cache` keyed by [`FetchParams::cache_key`]
//! (resource plus sorted parameters). Concurrent loads of the same key are
//! de-duplicated: the second caller awaits the first caller's fetch.
//!
//! [`FetchParams::cache_key`]: crate::list::FetchParams::cache_key

use crate::error::CoreError;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const MAX_ENTRIES: u64 = 512;

pub struct QueryCache<V> {
    inner: Cache<String, V>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Entries are considered fresh for `stale_time` after insertion
    pub fn new(stale_time: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(stale_time)
            .build();
        Self { inner }
    }

    /// Return the fresh cached value or run `fetch` once for all waiters.
    /// Errors are not cached.
    pub async fn get_or_fetch<F>(&self, key: &str, fetch: F) -> Result<V, CoreError>
    where
        F: Future<Output = Result<V, CoreError>>,
    {
        self.inner
            .try_get_with(key.to_string(), fetch)
            .await
            .map_err(|shared: Arc<CoreError>| match Arc::try_unwrap(shared) {
                Ok(error) => error,
                Err(shared) => CoreError::Shared(shared),
            })
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.inner.insert(key.into(), value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Drop every entry of a resource after a mutation (`"tickets"` drops
    /// `tickets` and `tickets?page=2`, not `tickets-archive`)
    pub async fn invalidate_prefix(&self, resource: &str) {
        let keys: Vec<Arc<String>> = self
            .inner
            .iter()
            .filter(|(key, _)| {
                key.as_str() == resource
                    || key
                        .strip_prefix(resource)
                        .is_some_and(|rest| rest.starts_with('?') || rest.starts_with('/'))
            })
            .map(|(key, _)| key)
            .collect();

        debug!(resource, count = keys.len(), "Invalidating cached queries");
        for key in keys {
            self.inner.invalidate(key.as_str()).await;
        }
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}
