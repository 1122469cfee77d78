//! The HTTP resource server wrapper: route pattern parsing, request
//! matching, 402 response construction, and payment verification against
//! the matched route's accepted payment options.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use foldgate_core::facilitator::{Facilitator, SettleRequest, VerifyRequest, VerifyResponse};
use foldgate_core::restriction::Restriction;
use foldgate_core::result::ResponseParts;
use foldgate_core::routes::{PaymentOption, RouteConfig, RouteTable};
use regex::Regex;
use serde::Serialize;

/// The inputs [`ResourceServer`] needs from one HTTP request: already
/// extracted by the dispatcher from a [`crate::request_adapter::RequestAdapter`],
/// with `path` possibly overridden to an MCP route key.
#[derive(Debug, Clone)]
pub struct HttpRequestContext {
    /// The path (or MCP route key override) to match against.
    pub path: String,
    /// The HTTP method.
    pub method: String,
    /// The decoded `PAYMENT-SIGNATURE`/`X-PAYMENT` header value, if present.
    pub payment_header: Option<String>,
}

/// The outcome of matching and verifying one request against the route
/// table, before metadata is stamped on by the dispatcher.
#[derive(Debug, Clone)]
pub enum HttpOutcome {
    /// No route matched this `(path, method)` pair.
    NoPaymentRequired,
    /// A route matched but payment is missing or invalid.
    PaymentError {
        /// The restriction that produced this error.
        restriction: Restriction,
        /// The ready-to-send 402 response.
        response: ResponseParts,
    },
    /// A route matched and the payment payload verified successfully.
    PaymentVerified {
        /// The restriction that was satisfied.
        restriction: Restriction,
        /// The verified payment payload.
        payment_payload: VerifyRequest,
        /// The payment requirements it was verified against.
        payment_requirements: SettleRequest,
    },
}

/// Splits a route key into its verb and compiled path regex.
///
/// `"GET /a"` → `("GET", /a)`; `"/a"` → `("*", /a)`; leading/trailing
/// whitespace around a bare path is stripped (`"  /a"` → `("*", /a)`).
///
/// # Errors
///
/// Returns a [`regex::Error`] if the path portion does not compile.
pub fn split_key(key: &str) -> Result<(String, Regex), regex::Error> {
    let trimmed = key.trim();
    let (verb, pattern) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb.to_uppercase(), rest.trim_start()),
        None => ("*".to_string(), trimmed),
    };
    let regex = Regex::new(&format!("(?i)^(?:{pattern})$"))?;
    Ok((verb, regex))
}

struct CompiledRoute {
    key: String,
    verb: String,
    path: Regex,
}

/// Wraps a merged content+MCP [`RouteTable`] with verb/regex route matching,
/// plus the facilitator used to verify matched payments.
pub struct ResourceServer {
    routes: RouteTable,
    compiled: Vec<CompiledRoute>,
    facilitator: Arc<dyn Facilitator>,
}

impl ResourceServer {
    /// Builds a resource server from a route table, pre-compiling every
    /// route key's verb/regex pair. A key whose path does not compile as a
    /// regex is dropped with a warning rather than failing construction, so
    /// one malformed operator-authored key can't take the whole server down.
    #[must_use]
    pub fn new(routes: RouteTable, facilitator: Arc<dyn Facilitator>) -> Self {
        let compiled = routes
            .iter()
            .filter_map(|(key, _)| match split_key(key) {
                Ok((verb, path)) => Some(CompiledRoute {
                    key: key.to_string(),
                    verb,
                    path,
                }),
                Err(source) => {
                    tracing::warn!(key, %source, "dropping route with unparseable path");
                    None
                }
            })
            .collect();
        Self {
            routes,
            compiled,
            facilitator,
        }
    }

    /// Returns the first route (insertion order) whose verb and path match.
    #[must_use]
    pub fn match_route(&self, path: &str, method: &str) -> Option<(&str, &RouteConfig)> {
        self.compiled
            .iter()
            .find(|route| (route.verb == "*" || route.verb == method) && route.path.is_match(path))
            .and_then(|route| self.routes.get(&route.key).map(|config| (route.key.as_str(), config)))
    }

    /// `true` iff some route matches `(ctx.path, ctx.method)` — i.e. this
    /// request is gated by a restriction at all.
    #[must_use]
    pub fn requires_payment(&self, ctx: &HttpRequestContext) -> bool {
        self.match_route(&ctx.path, &ctx.method).is_some()
    }

    /// Returns the facilitator this server verifies/settles payments
    /// against, for the dispatcher's settlement step.
    #[must_use]
    pub fn facilitator(&self) -> &Arc<dyn Facilitator> {
        &self.facilitator
    }

    /// Matches, then verifies or rejects the payment, producing an
    /// [`HttpOutcome`].
    pub async fn process_http_request_with_restriction(&self, ctx: &HttpRequestContext) -> HttpOutcome {
        let Some((_, route)) = self.match_route(&ctx.path, &ctx.method) else {
            return HttpOutcome::NoPaymentRequired;
        };

        let Some(header_value) = &ctx.payment_header else {
            return HttpOutcome::PaymentError {
                restriction: route.restriction.clone(),
                response: payment_required_response(route),
            };
        };

        let Some(payload) = decode_payment_header(header_value) else {
            return HttpOutcome::PaymentError {
                restriction: route.restriction.clone(),
                response: payment_required_response(route),
            };
        };

        let Some(requirement) = select_requirement(route, &payload) else {
            return HttpOutcome::PaymentError {
                restriction: route.restriction.clone(),
                response: payment_required_response(route),
            };
        };

        let verify_request = VerifyRequest(serde_json::json!({
            "payload": payload,
            "paymentRequirements": requirement,
        }));
        match self.facilitator.verify(&verify_request).await {
            VerifyResponse::Valid { .. } => HttpOutcome::PaymentVerified {
                restriction: route.restriction.clone(),
                payment_payload: verify_request.clone(),
                payment_requirements: SettleRequest::from(verify_request),
            },
            VerifyResponse::Invalid { .. } => HttpOutcome::PaymentError {
                restriction: route.restriction.clone(),
                response: payment_required_response(route),
            },
        }
    }
}

/// Picks the accepted payment option a decoded payload verifies against:
/// the one whose network matches the payload's `network` field, or the
/// route's first accepted option if the payload carries none/no match.
fn select_requirement<'a>(route: &'a RouteConfig, payload: &serde_json::Value) -> Option<&'a PaymentOption> {
    let network = payload.get("network").and_then(serde_json::Value::as_str);
    match network {
        Some(network) => route
            .accepts
            .iter()
            .find(|option| option.network == network)
            .or_else(|| route.accepts.first()),
        None => route.accepts.first(),
    }
}

/// Decodes a `PAYMENT-SIGNATURE`/`X-PAYMENT` header: base64 of a JSON object.
fn decode_payment_header(header_value: &str) -> Option<serde_json::Value> {
    let bytes = BASE64.decode(header_value.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequiredEnvelope<'a> {
    x402_version: u32,
    accepts: &'a [PaymentOption],
    description: &'a str,
    mime_type: &'a str,
}

/// Encodes the route's accepted options into the base64 `PAYMENT-REQUIRED`
/// header value and builds an otherwise-empty 402 response.
#[must_use]
pub fn payment_required_response(route: &RouteConfig) -> ResponseParts {
    let envelope = PaymentRequiredEnvelope {
        x402_version: 1,
        accepts: &route.accepts,
        description: &route.description,
        mime_type: &route.mime_type,
    };
    let encoded = BASE64.encode(serde_json::to_vec(&envelope).unwrap_or_default());
    let mut response = ResponseParts::empty(402);
    response.push_header("PAYMENT-REQUIRED", encoded);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldgate_core::facilitator::{BoxFuture, SettleResponse};
    use foldgate_core::routes::build_routes_config;

    fn restriction(path: &str, method: Option<&str>) -> Restriction {
        let mut value = serde_json::json!({
            "type": "api", "description": "d", "price": 0.01, "scheme": "exact", "path": path,
        });
        if let Some(method) = method {
            value["httpMethod"] = serde_json::json!(method);
        }
        Restriction::from_value(&value).unwrap()
    }

    struct AlwaysValid;
    impl Facilitator for AlwaysValid {
        fn verify<'a>(&'a self, _request: &'a VerifyRequest) -> BoxFuture<'a, VerifyResponse> {
            Box::pin(async { VerifyResponse::Valid { payer: "0xabc".into() } })
        }
        fn settle<'a>(&'a self, _request: &'a SettleRequest) -> BoxFuture<'a, SettleResponse> {
            Box::pin(async {
                SettleResponse::Success {
                    payer: "0xabc".into(),
                    transaction: "0xdead".into(),
                    network: "eip155:8453".into(),
                }
            })
        }
        fn supported<'a>(&'a self) -> BoxFuture<'a, Option<serde_json::Value>> {
            Box::pin(async { None })
        }
    }

    #[test]
    fn split_key_verb_and_path() {
        let (verb, re) = split_key("GET /a").unwrap();
        assert_eq!(verb, "GET");
        assert!(re.is_match("/a"));

        let (verb, _) = split_key("/a").unwrap();
        assert_eq!(verb, "*");

        let (verb, _) = split_key("  /a").unwrap();
        assert_eq!(verb, "*");
    }

    #[tokio::test]
    async fn missing_payment_yields_402_with_header() {
        let table = build_routes_config(&[restriction("/api/x", Some("GET"))], &[], None);
        let server = ResourceServer::new(table, Arc::new(AlwaysValid));
        let ctx = HttpRequestContext {
            path: "/api/x".into(),
            method: "GET".into(),
            payment_header: None,
        };
        match server.process_http_request_with_restriction(&ctx).await {
            HttpOutcome::PaymentError { response, .. } => {
                assert_eq!(response.status, 402);
                assert!(response.headers.iter().any(|(k, _)| k == "PAYMENT-REQUIRED"));
            }
            other => panic!("expected PaymentError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_payment_header_verifies() {
        let table = build_routes_config(&[restriction("/api/x", Some("GET"))], &[], None);
        let server = ResourceServer::new(table, Arc::new(AlwaysValid));
        let header = BASE64.encode(serde_json::to_vec(&serde_json::json!({"network":"x"})).unwrap());
        let ctx = HttpRequestContext {
            path: "/api/x".into(),
            method: "GET".into(),
            payment_header: Some(header),
        };
        match server.process_http_request_with_restriction(&ctx).await {
            HttpOutcome::PaymentVerified { .. } => {}
            other => panic!("expected PaymentVerified, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_route_requires_no_payment() {
        let table = build_routes_config(&[restriction("/api/x", Some("GET"))], &[], None);
        let server = ResourceServer::new(table, Arc::new(AlwaysValid));
        assert!(!server.requires_payment(&HttpRequestContext {
            path: "/other".into(),
            method: "GET".into(),
            payment_header: None,
        }));
    }
}
