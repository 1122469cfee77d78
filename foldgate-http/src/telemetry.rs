//! Fire-and-forget telemetry: event and error POSTs.
//!
//! Both endpoints are best-effort — any transport failure is logged and
//! swallowed, never propagated to the request pipeline and never retried.

use foldgate_core::metadata::RequestMetadata;
use serde::Serialize;

use crate::request_adapter::RequestAdapter;

/// The body of a `POST {API_BASE_URL}/v1/events` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// HTTP method of the originating request.
    pub method: String,
    /// The final status code assigned to the request.
    pub status_code: u16,
    /// `User-Agent` header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// `Referer` header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// The full request URL.
    pub href: String,
    /// The URL's host component.
    pub hostname: String,
    /// The URL's path component.
    pub pathname: String,
    /// The URL's query string, without the leading `?`.
    pub search: String,
    /// Best-effort client IP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// The request's id.
    pub request_id: String,
    /// The `PAYMENT-RESPONSE` header value, when settlement succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_response: Option<String>,
}

/// Builds an [`EventPayload`] from an adapter, the request's metadata, the
/// final status code, and (after settlement) the `PAYMENT-RESPONSE` value.
#[must_use]
pub fn build_event_payload(
    adapter: &dyn RequestAdapter,
    metadata: &RequestMetadata,
    status_code: u16,
    payment_response: Option<String>,
) -> EventPayload {
    let parsed = url::Url::parse(adapter.url()).ok();
    let hostname = parsed
        .as_ref()
        .and_then(url::Url::host_str)
        .map(str::to_string)
        .or_else(|| adapter.host().map(str::to_string))
        .unwrap_or_default();
    let pathname = parsed
        .as_ref()
        .map(url::Url::path)
        .map(str::to_string)
        .unwrap_or_else(|| adapter.path().to_string());
    let search = parsed
        .as_ref()
        .and_then(url::Url::query)
        .map(str::to_string)
        .unwrap_or_default();

    EventPayload {
        method: adapter.method().to_string(),
        status_code,
        user_agent: adapter.user_agent().map(str::to_string),
        referer: adapter.header("Referer").map(str::to_string),
        href: adapter.url().to_string(),
        hostname,
        pathname,
        search,
        ip_address: adapter.client_ip().map(str::to_string),
        request_id: metadata.request_id.to_string(),
        payment_response,
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
    stack: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<serde_json::Value>,
}

/// A telemetry sink posting events/errors to `{api_base_url}/v1/events` and
/// `{api_base_url}/v1/errors`.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: reqwest::Client,
    api_base_url: String,
    api_key: String,
}

impl TelemetryClient {
    /// Builds a client bound to one worker's API key.
    #[must_use]
    pub fn new(client: reqwest::Client, api_base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Posts an event. Errors are logged and discarded.
    pub async fn send_event(&self, payload: &EventPayload) {
        let url = format!("{}/v1/events", self.api_base_url.trim_end_matches('/'));
        if let Err(source) = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
        {
            tracing::warn!(%source, "telemetry event POST failed, discarding");
        }
    }

    /// Posts an error report. Errors are logged and discarded.
    pub async fn report_error(&self, error: &str, stack: &str, context: Option<serde_json::Value>) {
        let url = format!("{}/v1/errors", self.api_base_url.trim_end_matches('/'));
        let payload = ErrorPayload { error, stack, context };
        if let Err(source) = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            tracing::warn!(%source, "telemetry error-report POST failed, discarding");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeAdapter;

    #[async_trait::async_trait]
    impl RequestAdapter for FakeAdapter {
        fn path(&self) -> &str {
            "/api/x"
        }
        fn method(&self) -> &str {
            "GET"
        }
        fn url(&self) -> &str {
            "https://example.com/api/x?q=1"
        }
        fn host(&self) -> Option<&str> {
            Some("example.com")
        }
        fn header(&self, name: &str) -> Option<&str> {
            (name == "User-Agent").then_some("TestAgent/1.0")
        }
        fn client_ip(&self) -> Option<&str> {
            Some("1.2.3.4")
        }
        fn query_param(&self, _name: &str) -> Option<&str> {
            None
        }
        async fn body_json(&self) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn builds_payload_from_url_parts() {
        let metadata = RequestMetadata::new("1.0");
        let payload = build_event_payload(&FakeAdapter, &metadata, 402, None);
        assert_eq!(payload.hostname, "example.com");
        assert_eq!(payload.pathname, "/api/x");
        assert_eq!(payload.search, "q=1");
        assert_eq!(payload.status_code, 402);
    }

    #[tokio::test]
    async fn send_event_swallows_transport_errors() {
        let telemetry = TelemetryClient::new(reqwest::Client::new(), "http://127.0.0.1:1", "key");
        let metadata = RequestMetadata::new("1.0");
        let payload = build_event_payload(&FakeAdapter, &metadata, 200, None);
        telemetry.send_event(&payload).await;
    }

    #[tokio::test]
    async fn send_event_posts_to_events_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let telemetry = TelemetryClient::new(reqwest::Client::new(), server.uri(), "key");
        let metadata = RequestMetadata::new("1.0");
        let payload = build_event_payload(&FakeAdapter, &metadata, 200, None);
        telemetry.send_event(&payload).await;
    }
}
