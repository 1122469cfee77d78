//! Generic TTL-cached deserializer over one [`ConfigStore`] key.
//!
//! Mirrors the facilitator-client `/supported` response cache of the HTTP
//! transport layer this crate family grew out of, generalized to any `T` with
//! a pluggable deserializer rather than one hardcoded response shape.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::config_store::ConfigStore;
use crate::error::ConfigError;

struct CacheState<T> {
    value: T,
    loaded_at: Option<Instant>,
}

/// A TTL-cached, deserialized view of one key in a [`ConfigStore`].
///
/// - `T` is the deserialized value type (must be `Clone` so `get()` can hand
///   back a snapshot without holding the lock).
/// - The deserializer is a plain function/closure, not a trait impl, per the
///   "prefer composition over subclassing" guidance for this container.
///
/// No negative caching: a store error or malformed payload leaves the
/// previously cached value (and its timestamp) untouched, and is reported to
/// the caller as an error.
pub struct CachedView<T> {
    store: Arc<dyn ConfigStore>,
    key: String,
    fallback: T,
    deserialize: Box<dyn Fn(&str) -> Result<T, serde_json::Error> + Send + Sync>,
    ttl: Duration,
    state: RwLock<CacheState<T>>,
}

impl<T: Clone + Send + Sync + 'static> CachedView<T> {
    /// Builds a new cached view.
    ///
    /// `fallback` is returned (and cached) whenever the store reports the key
    /// as absent. `ttl` is the freshness window; pass
    /// [`crate::CACHE_TTL_MS`] milliseconds to match the default worker policy.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        key: impl Into<String>,
        fallback: T,
        ttl: Duration,
        deserialize: impl Fn(&str) -> Result<T, serde_json::Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            fallback: fallback.clone(),
            deserialize: Box::new(deserialize),
            ttl,
            state: RwLock::new(CacheState {
                value: fallback,
                loaded_at: None,
            }),
        }
    }

    /// Returns the cached value, refreshing it from the store if the TTL has
    /// elapsed since the last successful load.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError::Store`] on a failed store call and
    /// [`ConfigError::Deserialize`] on a malformed payload. In both cases the
    /// previously cached value is retained for the next call.
    pub async fn get(&self) -> Result<T, ConfigError> {
        {
            let state = self.state.read().await;
            if let Some(loaded_at) = state.loaded_at
                && loaded_at.elapsed() < self.ttl
            {
                return Ok(state.value.clone());
            }
        }

        let raw = self.store.get(&self.key).await?;
        match raw {
            None => {
                let mut state = self.state.write().await;
                state.value = self.fallback.clone();
                state.loaded_at = Some(Instant::now());
                Ok(state.value.clone())
            }
            Some(raw) => match (self.deserialize)(&raw) {
                Ok(value) => {
                    let mut state = self.state.write().await;
                    state.value = value.clone();
                    state.loaded_at = Some(Instant::now());
                    Ok(value)
                }
                Err(source) => Err(ConfigError::Deserialize {
                    key: self.key.clone(),
                    source,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        value: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ConfigStore for CountingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, crate::error::StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.clone())
        }
    }

    #[tokio::test]
    async fn returns_fallback_when_absent() {
        let store = Arc::new(CountingStore {
            value: None,
            calls: AtomicUsize::new(0),
        });
        let view = CachedView::new(
            store,
            "host-config",
            7_i32,
            Duration::from_millis(30_000),
            |raw| raw.parse::<i32>().map_err(serde::de::Error::custom),
        );
        assert_eq!(view.get().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn caches_within_ttl() {
        let store = Arc::new(CountingStore {
            value: Some("42".into()),
            calls: AtomicUsize::new(0),
        });
        let view = CachedView::new(
            Arc::clone(&store) as Arc<dyn ConfigStore>,
            "k",
            0_i32,
            Duration::from_secs(30),
            |raw| raw.parse::<i32>().map_err(serde::de::Error::custom),
        );
        assert_eq!(view.get().await.unwrap(), 42);
        assert_eq!(view.get().await.unwrap(), 42);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshes_after_ttl() {
        let store = Arc::new(CountingStore {
            value: Some("1".into()),
            calls: AtomicUsize::new(0),
        });
        let view = CachedView::new(
            Arc::clone(&store) as Arc<dyn ConfigStore>,
            "k",
            0_i32,
            Duration::from_millis(5),
            |raw| raw.parse::<i32>().map_err(serde::de::Error::custom),
        );
        assert_eq!(view.get().await.unwrap(), 1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(view.get().await.unwrap(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn deserialize_failure_does_not_poison_cache() {
        let store = Arc::new(CountingStore {
            value: Some("not-a-number".into()),
            calls: AtomicUsize::new(0),
        });
        let view = CachedView::new(
            Arc::clone(&store) as Arc<dyn ConfigStore>,
            "k",
            99_i32,
            Duration::from_secs(30),
            |raw| raw.parse::<i32>().map_err(serde::de::Error::custom),
        );
        assert!(view.get().await.is_err());
        // previous (fallback) value is retained, so a subsequent call against
        // a store that now behaves observes the retry, not a poisoned state.
        assert_eq!(view.get().await.unwrap_err().to_string().contains("k"), true);
    }
}
