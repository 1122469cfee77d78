//! The `RequestAdapter` capability consumed (not owned) by the dispatcher.
//!
//! Concrete framework adapters translate a framework-specific request object
//! into this trait; `foldgate-core`/`foldgate-http` never see the framework
//! type directly. [`crate::axum_adapter`] is the one reference implementation
//! this crate ships.

use serde_json::Value;

/// Abstract inbound-request capability the pipeline needs: path, method,
/// headers, and an async JSON body read.
///
/// All accessors are synchronous except [`RequestAdapter::body_json`], which
/// is the one suspension point — reading the body may require draining an
/// async stream.
#[async_trait::async_trait]
pub trait RequestAdapter: Send + Sync {
    /// Request path, without query string.
    fn path(&self) -> &str;

    /// HTTP method, uppercased (`"GET"`, `"POST"`, ...).
    fn method(&self) -> &str;

    /// The full request URL (scheme + host + path + query), used for
    /// telemetry and paywall rendering.
    fn url(&self) -> &str;

    /// The `Host` header value, if present.
    fn host(&self) -> Option<&str>;

    /// Looks up a header by name, case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// The `User-Agent` header value, if present.
    fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    /// The best-effort client IP: `X-Forwarded-For`'s first hop, or the
    /// adapter's notion of the peer address.
    fn client_ip(&self) -> Option<&str>;

    /// A single query parameter, if present.
    fn query_param(&self, name: &str) -> Option<&str>;

    /// Reads and parses the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an adapter-defined error (boxed) if the body cannot be read or
    /// does not parse as JSON. Callers treat any error here as "not a valid
    /// MCP body" rather than propagating it.
    async fn body_json(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}
