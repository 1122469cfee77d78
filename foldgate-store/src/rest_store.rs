//! A [`ConfigStore`] implemented as a REST client against Upstash's
//! Redis-compatible REST API: `GET {url}/get/{key}` with
//! `Authorization: Bearer {token}`, body `{result: string | null}`.
//!
//! Keys are tenant-prefixed internally as `"{tenant_id}:{key}"`; callers of
//! [`foldgate_core::CachedView`] pass only the bare schema key.

use foldgate_core::config_store::ConfigStore;
use foldgate_core::error::StoreError;
use serde::Deserialize;

use crate::bootstrap::RedisCredentials;

#[derive(Deserialize)]
struct GetResponse {
    result: Option<String>,
}

/// Tenant-scoped [`ConfigStore`] over Upstash's REST API.
#[derive(Debug, Clone)]
pub struct UpstashConfigStore {
    base_url: String,
    token: String,
    tenant_id: String,
    client: reqwest::Client,
}

impl UpstashConfigStore {
    /// Builds a store from bootstrapped or directly-supplied credentials.
    #[must_use]
    pub fn new(credentials: RedisCredentials, client: reqwest::Client) -> Self {
        Self {
            base_url: credentials.url.trim_end_matches('/').to_string(),
            token: credentials.token,
            tenant_id: credentials.tenant_id,
            client,
        }
    }

    fn tenant_key(&self, key: &str) -> String {
        format!("{}:{}", self.tenant_id, key)
    }
}

#[async_trait::async_trait]
impl ConfigStore for UpstashConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let tenant_key = self.tenant_key(key);
        let url = format!("{}/get/{}", self.base_url, tenant_key);

        tracing::debug!(key = %tenant_key, "fetching config key");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(StoreError::new)?;

        let response = response.error_for_status().map_err(StoreError::new)?;
        let parsed: GetResponse = response.json().await.map_err(StoreError::new)?;
        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(url: String) -> RedisCredentials {
        RedisCredentials {
            url,
            token: "tok".into(),
            tenant_id: "acme".into(),
        }
    }

    #[tokio::test]
    async fn prefixes_key_with_tenant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get/acme:host-config"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "{}"})),
            )
            .mount(&server)
            .await;

        let store = UpstashConfigStore::new(credentials(server.uri()), reqwest::Client::new());
        let value = store.get("host-config").await.unwrap();
        assert_eq!(value.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn absent_key_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get/acme:missing"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": null})),
            )
            .mount(&server)
            .await;

        let store = UpstashConfigStore::new(credentials(server.uri()), reqwest::Client::new());
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get/acme:host-config"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = UpstashConfigStore::new(credentials(server.uri()), reqwest::Client::new());
        assert!(store.get("host-config").await.is_err());
    }
}
