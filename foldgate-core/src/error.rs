//! Shared error types for the configuration layer.

/// Opaque error returned by a [`crate::config_store::ConfigStore`] implementation.
///
/// The core crate does not know the transport (REST call, local map, ...) behind
/// the store, so the underlying cause is boxed.
#[derive(Debug, thiserror::Error)]
#[error("config store error: {0}")]
pub struct StoreError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    /// Wraps an arbitrary error as a [`StoreError`].
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

/// Errors surfaced by a [`crate::cached_view::CachedView`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The underlying store call failed. The cache keeps its previous value.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store returned a value but it did not match the expected schema.
    /// The cache is not poisoned by this; the next `get()` retries the fetch.
    #[error("failed to deserialize config at key {key:?}: {source}")]
    Deserialize {
        /// The KV key that produced the bad payload.
        key: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}
