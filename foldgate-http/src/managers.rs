//! The five concrete [`CachedView<T>`] instances: one per KV schema.
//!
//! Each manager is a thin `CachedView` wrapper that fixes the key, fallback,
//! and deserializer for its schema. They are cheap to construct (a handful
//! of `Arc` clones) and are owned by [`crate::worker::FoldgateWorker`].

use std::sync::Arc;
use std::time::Duration;

use foldgate_core::bot::Bot;
use foldgate_core::cached_view::CachedView;
use foldgate_core::config_store::ConfigStore;
use foldgate_core::error::ConfigError;
use foldgate_core::host_config::HostConfig;
use foldgate_core::payment_method::PaymentMethod;
use foldgate_core::restriction::Restriction;

use crate::facilitator_client::FacilitatorConfig;

/// `CachedView<Option<HostConfig>>`: absent when the host has no entry.
pub struct HostConfigManager(CachedView<Option<HostConfig>>);

impl HostConfigManager {
    /// Builds the manager with the default 30s TTL (`foldgate_core::CACHE_TTL_MS`).
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self(CachedView::new(
            store,
            "host-config",
            None,
            Duration::from_millis(foldgate_core::CACHE_TTL_MS),
            |raw| serde_json::from_str(raw).map(Some),
        ))
    }

    /// Returns the cached `host-config` entry, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] on store failure or malformed payload.
    pub async fn get(&self) -> Result<Option<HostConfig>, ConfigError> {
        self.0.get().await
    }
}

/// `CachedView<Vec<Restriction>>`, empty fallback.
pub struct RestrictionsManager(CachedView<Vec<Restriction>>);

impl RestrictionsManager {
    /// Builds the manager with the default 30s TTL.
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self(CachedView::new(
            store,
            "restrictions",
            Vec::new(),
            Duration::from_millis(foldgate_core::CACHE_TTL_MS),
            |raw| {
                Restriction::parse_list(raw)
                    .map_err(|err| serde::de::Error::custom(err.to_string()))
            },
        ))
    }

    /// Returns the cached `restrictions` list.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] on store failure, malformed payload, or an
    /// unknown restriction `type` tag — an unrecognized restriction fails
    /// loudly rather than being silently skipped.
    pub async fn get(&self) -> Result<Vec<Restriction>, ConfigError> {
        self.0.get().await
    }
}

/// `CachedView<Vec<PaymentMethod>>`, empty fallback.
pub struct PaymentMethodsManager(CachedView<Vec<PaymentMethod>>);

impl PaymentMethodsManager {
    /// Builds the manager with the default 30s TTL.
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self(CachedView::new(
            store,
            "payment-methods",
            Vec::new(),
            Duration::from_millis(foldgate_core::CACHE_TTL_MS),
            |raw| PaymentMethod::parse_list(raw),
        ))
    }

    /// Returns the cached `payment-methods` list.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] on store failure or malformed payload.
    pub async fn get(&self) -> Result<Vec<PaymentMethod>, ConfigError> {
        self.0.get().await
    }
}

/// `CachedView<Vec<Bot>>`, empty fallback. User agents are lowercased at load.
pub struct BotsManager(CachedView<Vec<Bot>>);

impl BotsManager {
    /// Builds the manager with the default 30s TTL.
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self(CachedView::new(
            store,
            "bots",
            Vec::new(),
            Duration::from_millis(foldgate_core::CACHE_TTL_MS),
            |raw| Bot::parse_list(raw),
        ))
    }

    /// Returns the cached `bots` list.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] on store failure or malformed payload.
    pub async fn get(&self) -> Result<Vec<Bot>, ConfigError> {
        self.0.get().await
    }

    /// Matches a `User-Agent` value against the cached bot list.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] if the underlying fetch fails.
    pub async fn match_user_agent(&self, user_agent: &str) -> Result<Option<Bot>, ConfigError> {
        let bots = self.get().await?;
        Ok(Bot::match_user_agent(&bots, user_agent).cloned())
    }
}

/// `CachedView<Option<FacilitatorConfig>>`: absent when unconfigured.
pub struct FacilitatorManager(CachedView<Option<FacilitatorConfig>>);

impl FacilitatorManager {
    /// Builds the manager with the default 30s TTL.
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self(CachedView::new(
            store,
            "facilitator",
            None,
            Duration::from_millis(foldgate_core::CACHE_TTL_MS),
            |raw| serde_json::from_str(raw).map(Some),
        ))
    }

    /// Returns the cached `facilitator` config, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] on store failure or malformed payload.
    pub async fn get(&self) -> Result<Option<FacilitatorConfig>, ConfigError> {
        self.0.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldgate_core::error::StoreError;

    struct StaticStore(Option<String>);

    #[async_trait::async_trait]
    impl ConfigStore for StaticStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn host_config_absent_is_none() {
        let manager = HostConfigManager::new(Arc::new(StaticStore(None)));
        assert!(manager.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restrictions_unknown_type_propagates_error() {
        let manager = RestrictionsManager::new(Arc::new(StaticStore(Some(
            r#"[{"type":"ftp"}]"#.to_string(),
        ))));
        assert!(manager.get().await.is_err());
    }

    #[tokio::test]
    async fn bots_match_lowercases_and_clones() {
        let manager = BotsManager::new(Arc::new(StaticStore(Some(
            r#"[{"userAgent":"GoogleBot","force200":true}]"#.to_string(),
        ))));
        let hit = manager.match_user_agent("Mozilla Googlebot/2.1").await.unwrap();
        assert!(hit.unwrap().force_200);
    }
}
