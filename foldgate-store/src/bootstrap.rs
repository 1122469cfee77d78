//! Fetches Redis (Upstash) credentials from the platform's config-issuance endpoint.
//!
//! `GET {API_BASE_URL}/v1/config/redis`, `Authorization: Bearer {api_key}`,
//! returning `{data: {url, token, tenantId}}`. A non-200 response is fatal —
//! worker construction cannot proceed without a store, so there is no
//! fallback here.

use serde::Deserialize;

use crate::error::BootstrapError;

/// Credentials for [`crate::rest_store::UpstashConfigStore`], either supplied
/// directly by the caller or fetched via [`bootstrap_credentials`].
#[derive(Debug, Clone, Deserialize)]
pub struct RedisCredentials {
    /// Upstash REST base URL.
    pub url: String,
    /// Upstash REST bearer token.
    pub token: String,
    /// Tenant id, used to prefix every KV key.
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
}

#[derive(Deserialize)]
struct BootstrapResponse {
    data: RedisCredentials,
}

/// Calls the bootstrap endpoint to obtain [`RedisCredentials`] for `api_key`.
///
/// # Errors
///
/// Returns [`BootstrapError::Transport`] on a network failure,
/// [`BootstrapError::NonSuccess`] for any non-2xx response, and
/// [`BootstrapError::Malformed`] if the body does not match `{data: {...}}`.
pub async fn bootstrap_credentials(
    client: &reqwest::Client,
    api_base_url: &str,
    api_key: &str,
) -> Result<RedisCredentials, BootstrapError> {
    let url = format!("{}/v1/config/redis", api_base_url.trim_end_matches('/'));
    tracing::debug!(url, "bootstrapping redis credentials");

    let response = client
        .get(&url)
        .bearer_auth(api_key)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, "bootstrap endpoint returned non-success status");
        return Err(BootstrapError::NonSuccess {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    let body: BootstrapResponse = serde_json::from_str(&text)?;
    Ok(body.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/config/redis"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"url": "https://redis.example", "token": "tok", "tenantId": "acme"}
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let creds = bootstrap_credentials(&client, &server.uri(), "secret")
            .await
            .unwrap();
        assert_eq!(creds.tenant_id, "acme");
    }

    #[tokio::test]
    async fn non_200_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/config/redis"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = bootstrap_credentials(&client, &server.uri(), "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::NonSuccess { status: 500, .. }));
    }
}
