//! Process-singleton worker construction and bootstrap.

use std::sync::Arc;

use foldgate_core::config_store::ConfigStore;
use foldgate_store::{RedisCredentials, UpstashConfigStore, bootstrap_credentials};
use tokio::sync::OnceCell;

use crate::error::WorkerInitError;
use crate::http_server_manager::HttpServerManager;
use crate::managers::{BotsManager, FacilitatorManager, HostConfigManager, PaymentMethodsManager, RestrictionsManager};
use crate::telemetry::TelemetryClient;

const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The platform's config-issuance and telemetry base URL. Not configurable
/// through [`FoldgateOptions`] — the worker configuration surface is
/// deliberately limited to credentials and display metadata.
pub const API_BASE_URL: &str = "https://api.foldgate.dev";

/// Construction options for [`FoldgateWorker::from_options`].
#[derive(Debug, Clone)]
pub struct FoldgateOptions {
    /// API key identifying the tenant. Required.
    pub api_key: String,
    /// Pre-supplied Redis credentials, bypassing the bootstrap call.
    pub redis_credentials: Option<RedisCredentials>,
    /// Platform label surfaced in the health response and telemetry.
    pub platform: Option<String>,
    /// SDK version string surfaced in the health response.
    pub sdk_version: Option<String>,
}

/// The assembled, process-wide worker: the five config managers, the
/// TTL-cached [`HttpServerManager`], and a telemetry sink, all sharing one
/// [`reqwest::Client`] and one [`foldgate_core::ConfigStore`].
#[derive(Debug)]
pub struct FoldgateWorker {
    pub(crate) host_config: Arc<HostConfigManager>,
    pub(crate) restrictions: Arc<RestrictionsManager>,
    pub(crate) payment_methods: Arc<PaymentMethodsManager>,
    pub(crate) bots: Arc<BotsManager>,
    pub(crate) http_server: Arc<HttpServerManager>,
    pub(crate) telemetry: TelemetryClient,
    pub(crate) core_version: String,
    pub(crate) sdk_version: String,
    pub(crate) platform: String,
}

impl std::fmt::Debug for HostConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HostConfigManager")
    }
}
impl std::fmt::Debug for RestrictionsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RestrictionsManager")
    }
}
impl std::fmt::Debug for PaymentMethodsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PaymentMethodsManager")
    }
}
impl std::fmt::Debug for BotsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BotsManager")
    }
}
impl std::fmt::Debug for HttpServerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HttpServerManager")
    }
}

static WORKER: OnceCell<Arc<FoldgateWorker>> = OnceCell::const_new();

impl FoldgateWorker {
    /// Returns the process-singleton worker, constructing it on the first
    /// call. Concurrent first callers may each start construction; the
    /// first to publish wins and every caller observes the same instance.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerInitError`] if bootstrapping Redis credentials fails.
    /// `options` passed by a caller that loses the race are discarded.
    pub async fn from_options(options: FoldgateOptions) -> Result<Arc<Self>, WorkerInitError> {
        WORKER
            .get_or_try_init(|| Self::build(options))
            .await
            .map(Arc::clone)
    }

    async fn build(options: FoldgateOptions) -> Result<Arc<Self>, WorkerInitError> {
        let http_client = reqwest::Client::new();
        let credentials = match options.redis_credentials {
            Some(credentials) => credentials,
            None => bootstrap_credentials(&http_client, API_BASE_URL, &options.api_key).await?,
        };
        let store: Arc<dyn ConfigStore> = Arc::new(UpstashConfigStore::new(credentials, http_client.clone()));

        Ok(Arc::new(Self::from_parts(
            store,
            http_client,
            options.api_key,
            options.platform,
            options.sdk_version,
        )))
    }

    pub(crate) fn from_parts(
        store: Arc<dyn ConfigStore>,
        http_client: reqwest::Client,
        api_key: String,
        platform: Option<String>,
        sdk_version: Option<String>,
    ) -> Self {
        let host_config = Arc::new(HostConfigManager::new(Arc::clone(&store)));
        let restrictions = Arc::new(RestrictionsManager::new(Arc::clone(&store)));
        let payment_methods = Arc::new(PaymentMethodsManager::new(Arc::clone(&store)));
        let bots = Arc::new(BotsManager::new(Arc::clone(&store)));
        let facilitator = Arc::new(FacilitatorManager::new(store));

        let http_server = Arc::new(HttpServerManager::new(
            Arc::clone(&host_config),
            Arc::clone(&restrictions),
            Arc::clone(&payment_methods),
            facilitator,
            http_client.clone(),
        ));

        let telemetry = TelemetryClient::new(http_client, API_BASE_URL, api_key);

        Self {
            host_config,
            restrictions,
            payment_methods,
            bots,
            http_server,
            telemetry,
            core_version: CORE_VERSION.to_string(),
            sdk_version: sdk_version.unwrap_or_else(|| CORE_VERSION.to_string()),
            platform: platform.unwrap_or_else(|| "rust".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldgate_core::error::StoreError;

    struct EmptyStore;

    #[async_trait::async_trait]
    impl ConfigStore for EmptyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    #[test]
    fn from_parts_defaults_platform_and_sdk_version() {
        let worker = FoldgateWorker::from_parts(
            Arc::new(EmptyStore),
            reqwest::Client::new(),
            "key".to_string(),
            None,
            None,
        );
        assert_eq!(worker.platform, "rust");
        assert_eq!(worker.sdk_version, CORE_VERSION);
    }

    #[test]
    fn from_parts_keeps_explicit_overrides() {
        let worker = FoldgateWorker::from_parts(
            Arc::new(EmptyStore),
            reqwest::Client::new(),
            "key".to_string(),
            Some("cloudflare-workers".to_string()),
            Some("9.9.9".to_string()),
        );
        assert_eq!(worker.platform, "cloudflare-workers");
        assert_eq!(worker.sdk_version, "9.9.9");
    }
}
