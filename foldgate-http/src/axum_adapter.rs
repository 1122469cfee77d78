//! A [`RequestAdapter`] over `axum`/`http` types — the one concrete framework
//! adapter this crate ships. Bespoke runtimes (Actix, a CDN worker, ...)
//! implement the trait directly instead.

use axum::body::Bytes;
use http::{HeaderMap, Method, Uri};
use serde_json::Value;

use crate::request_adapter::RequestAdapter;

/// A fully-buffered snapshot of an axum request, suitable for the
/// synchronous accessors [`RequestAdapter`] requires.
///
/// Building one drains the request body, so it is constructed once per
/// request (typically inside the axum middleware/handler) and then handed to
/// the dispatcher.
#[derive(Debug, Clone)]
pub struct AxumRequestAdapter {
    method: Method,
    uri: Uri,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl AxumRequestAdapter {
    /// Builds an adapter from the request's parts and its already-buffered
    /// body.
    ///
    /// `base_url` is prefixed onto the URI's path+query to compute
    /// [`RequestAdapter::url`] when the URI itself is relative (the common
    /// case for an in-process axum extractor).
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes, base_url: &str) -> Self {
        let url = if uri.scheme().is_some() {
            uri.to_string()
        } else {
            format!(
                "{}{}",
                base_url.trim_end_matches('/'),
                uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str())
            )
        };
        Self {
            method,
            uri,
            url,
            headers,
            body,
        }
    }
}

#[async_trait::async_trait]
impl RequestAdapter for AxumRequestAdapter {
    fn path(&self) -> &str {
        self.uri.path()
    }

    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    fn client_ip(&self) -> Option<&str> {
        self.header("X-Forwarded-For")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        let query = self.uri.query()?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }

    async fn body_json(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        if self.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn adapter(body: &str) -> AxumRequestAdapter {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("TestAgent/1.0"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        AxumRequestAdapter::new(
            Method::POST,
            "/mcp?x=1".parse().unwrap(),
            headers,
            Bytes::from(body.to_string()),
            "https://example.com",
        )
    }

    #[tokio::test]
    async fn exposes_path_method_and_user_agent() {
        let adapter = adapter("{}");
        assert_eq!(adapter.path(), "/mcp");
        assert_eq!(adapter.method(), "POST");
        assert_eq!(adapter.user_agent(), Some("TestAgent/1.0"));
        assert_eq!(adapter.url(), "https://example.com/mcp?x=1");
    }

    #[tokio::test]
    async fn client_ip_takes_first_hop() {
        let adapter = adapter("{}");
        assert_eq!(adapter.client_ip(), Some("1.2.3.4"));
    }

    #[tokio::test]
    async fn parses_json_body() {
        let adapter = adapter(r#"{"jsonrpc":"2.0","method":"tools/list"}"#);
        let value = adapter.body_json().await.unwrap();
        assert_eq!(value["method"], "tools/list");
    }

    #[tokio::test]
    async fn empty_body_is_null() {
        let adapter = adapter("");
        assert_eq!(adapter.body_json().await.unwrap(), Value::Null);
    }
}
