//! The abstract remote key-value store consulted by every [`crate::cached_view::CachedView`].

use crate::error::StoreError;

/// Async key-value lookup over a remote store.
///
/// Implementations are expected to tenant-prefix keys internally
/// (`"{tenant_id}:{key}"`) — callers pass the bare schema key
/// (e.g. `"host-config"`).
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetches the raw string value for `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any transport failure. Absence of the key is
    /// not an error — it is represented by `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

#[async_trait::async_trait]
impl<S: ConfigStore + ?Sized> ConfigStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }
}
