//! The HTTP-based `Facilitator` implementation: verifies/settles payments
//! against a remote x402 facilitator, constructed from a
//! `{url, verifyHeaders?, settleHeaders?, supportedHeaders?}` config entry.
//!
//! The KV entry uses camelCase header-group keys (`verifyHeaders`,
//! `settleHeaders`, `supportedHeaders`); this crate follows the KV schema
//! rather than the snake_case convention the public Rust types otherwise use.

use std::collections::HashMap;

use foldgate_core::facilitator::{BoxFuture, Facilitator, SettleRequest, SettleResponse, VerifyRequest, VerifyResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::FacilitatorClientError;

/// Deserialized `facilitator` KV entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorConfig {
    /// Facilitator base URL (no trailing slash required).
    pub url: String,
    /// Extra headers sent on `/verify` calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_headers: Option<HashMap<String, String>>,
    /// Extra headers sent on `/settle` calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_headers: Option<HashMap<String, String>>,
    /// Extra headers sent on `/supported` calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_headers: Option<HashMap<String, String>>,
}

fn to_header_map(headers: Option<&HashMap<String, String>>) -> HeaderMap {
    let mut map = HeaderMap::new();
    let Some(headers) = headers else {
        return map;
    };
    for (name, value) in headers {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(name, "skipping invalid facilitator header name");
            continue;
        };
        let Ok(value) = HeaderValue::from_str(value) else {
            tracing::warn!(name = %name, "skipping invalid facilitator header value");
            continue;
        };
        map.insert(name, value);
    }
    map
}

/// HTTP-based [`Facilitator`]: `POST {url}/verify`, `POST {url}/settle`,
/// `GET {url}/supported`.
pub struct HttpFacilitatorClient {
    base_url: String,
    client: reqwest::Client,
    verify_headers: HeaderMap,
    settle_headers: HeaderMap,
    supported_headers: HeaderMap,
}

impl HttpFacilitatorClient {
    /// Builds a client from a deserialized [`FacilitatorConfig`], installing
    /// per-endpoint header providers when the config carries them.
    #[must_use]
    pub fn new(config: &FacilitatorConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
            verify_headers: to_header_map(config.verify_headers.as_ref()),
            settle_headers: to_header_map(config.settle_headers.as_ref()),
            supported_headers: to_header_map(config.supported_headers.as_ref()),
        }
    }
}

impl HttpFacilitatorClient {
    async fn try_verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, FacilitatorClientError> {
        let url = format!("{}/verify", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.verify_headers.clone())
            .json(&request.0)
            .send()
            .await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn try_settle(&self, request: &SettleRequest) -> Result<SettleResponse, FacilitatorClientError> {
        let url = format!("{}/settle", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.settle_headers.clone())
            .json(&request.0)
            .send()
            .await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Facilitator for HttpFacilitatorClient {
    fn verify<'a>(&'a self, request: &'a VerifyRequest) -> BoxFuture<'a, VerifyResponse> {
        Box::pin(async move {
            match self.try_verify(request).await {
                Ok(response) => response,
                Err(source) => {
                    tracing::error!(%source, "facilitator /verify call failed");
                    VerifyResponse::Invalid {
                        reason: "facilitator_unreachable".into(),
                        message: Some(source.to_string()),
                        payer: None,
                    }
                }
            }
        })
    }

    fn settle<'a>(&'a self, request: &'a SettleRequest) -> BoxFuture<'a, SettleResponse> {
        Box::pin(async move {
            match self.try_settle(request).await {
                Ok(response) => response,
                Err(source) => {
                    tracing::error!(%source, "facilitator /settle call failed");
                    SettleResponse::Error {
                        reason: "facilitator_unreachable".into(),
                        message: Some(source.to_string()),
                        network: "unknown".into(),
                    }
                }
            }
        })
    }

    fn supported<'a>(&'a self) -> BoxFuture<'a, Option<serde_json::Value>> {
        Box::pin(async move {
            let url = format!("{}/supported", self.base_url);
            let response = self
                .client
                .get(&url)
                .headers(self.supported_headers.clone())
                .send()
                .await
                .ok()?;
            response.json::<serde_json::Value>().await.ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn verify_success_parses_valid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "isValid": true, "payer": "0xabc"
            })))
            .mount(&server)
            .await;

        let config = FacilitatorConfig {
            url: server.uri(),
            verify_headers: None,
            settle_headers: None,
            supported_headers: None,
        };
        let client = HttpFacilitatorClient::new(&config, reqwest::Client::new());
        let response = client.verify(&VerifyRequest(serde_json::json!({}))).await;
        assert!(response.is_valid());
    }

    #[tokio::test]
    async fn unreachable_facilitator_yields_invalid() {
        let config = FacilitatorConfig {
            url: "http://127.0.0.1:1".to_string(),
            verify_headers: None,
            settle_headers: None,
            supported_headers: None,
        };
        let client = HttpFacilitatorClient::new(&config, reqwest::Client::new());
        let response = client.verify(&VerifyRequest(serde_json::json!({}))).await;
        assert!(!response.is_valid());
    }
}
