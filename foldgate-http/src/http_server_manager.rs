//! The TTL-cached [`ResourceServer`] build.
//!
//! Shares the 30s TTL policy with [`foldgate_core::CachedView`] but cannot
//! reuse it directly: building a [`ResourceServer`] fans out four concurrent
//! config fetches rather than deserializing one KV entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use foldgate_core::error::ConfigError;
use foldgate_core::routes::{build_mcp_routes_config, build_routes_config};
use tokio::sync::RwLock;

use crate::facilitator_client::HttpFacilitatorClient;
use crate::managers::{FacilitatorManager, HostConfigManager, PaymentMethodsManager, RestrictionsManager};
use crate::resource_server::ResourceServer;

struct CacheState {
    value: Option<Arc<ResourceServer>>,
    loaded_at: Option<Instant>,
}

/// Owns the four config managers a [`ResourceServer`] is built from and
/// caches the build for `ttl`.
pub struct HttpServerManager {
    host_config: Arc<HostConfigManager>,
    restrictions: Arc<RestrictionsManager>,
    payment_methods: Arc<PaymentMethodsManager>,
    facilitator: Arc<FacilitatorManager>,
    http_client: reqwest::Client,
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl HttpServerManager {
    /// Builds the manager with the default 30s TTL.
    #[must_use]
    pub fn new(
        host_config: Arc<HostConfigManager>,
        restrictions: Arc<RestrictionsManager>,
        payment_methods: Arc<PaymentMethodsManager>,
        facilitator: Arc<FacilitatorManager>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            host_config,
            restrictions,
            payment_methods,
            facilitator,
            http_client,
            ttl: Duration::from_millis(foldgate_core::CACHE_TTL_MS),
            state: RwLock::new(CacheState {
                value: None,
                loaded_at: None,
            }),
        }
    }

    /// Returns the cached [`ResourceServer`], rebuilding it if the TTL has
    /// elapsed. Returns `Ok(None)` when the worker is unconfigured for this
    /// host (no `host-config` or no `facilitator` entry) — callers treat
    /// that as "no payment required".
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] if any of the four underlying fetches
    /// fails (store error or malformed payload).
    pub async fn get(&self) -> Result<Option<Arc<ResourceServer>>, ConfigError> {
        {
            let state = self.state.read().await;
            if let Some(loaded_at) = state.loaded_at
                && loaded_at.elapsed() < self.ttl
            {
                return Ok(state.value.clone());
            }
        }

        let (host_config, restrictions, payment_methods, facilitator) = tokio::join!(
            self.host_config.get(),
            self.restrictions.get(),
            self.payment_methods.get(),
            self.facilitator.get(),
        );
        let host_config = host_config?;
        let restrictions = restrictions?;
        let payment_methods = payment_methods?;
        let facilitator = facilitator?;

        let built = match (host_config, facilitator) {
            (Some(host_config), Some(facilitator_config)) => {
                let client = Arc::new(HttpFacilitatorClient::new(&facilitator_config, self.http_client.clone()));
                let tos_url = host_config.terms_of_service_url.as_deref();
                let mut routes = build_routes_config(&restrictions, &payment_methods, tos_url);
                if let Some(mcp_endpoint) = &host_config.mcp_endpoint {
                    routes.extend(build_mcp_routes_config(
                        &restrictions,
                        &payment_methods,
                        tos_url,
                        mcp_endpoint,
                    ));
                }
                Some(Arc::new(ResourceServer::new(routes, client)))
            }
            _ => {
                tracing::debug!("worker unconfigured: missing host-config or facilitator");
                None
            }
        };

        let mut state = self.state.write().await;
        state.value = built.clone();
        state.loaded_at = Some(Instant::now());
        Ok(built)
    }

}
