//! JSON-RPC 2.0 request parsing for the MCP sub-pipeline.
//!
//! Only the fields the pipeline actually consumes are retained: `id`,
//! `method`, and `params`. A request is considered valid JSON-RPC iff the
//! body is an object containing both `jsonrpc` and `method`; anything else
//! is not an error, it simply isn't MCP traffic and the caller falls back
//! to `no-payment-required`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-RPC request id: string, number, or (for notifications) absent.
///
/// Kept as a raw [`Value`] rather than a typed enum so it round-trips
/// byte-for-byte into the error envelope, matching whatever shape the caller
/// sent (JSON-RPC permits both string and integer ids).
pub type JsonRpcId = Value;

/// The subset of an inbound JSON-RPC request the MCP pipeline needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    /// The request id, echoed verbatim into any error envelope.
    #[serde(default)]
    pub id: JsonRpcId,
    /// The JSON-RPC method, e.g. `"tools/call"` or `"tools/list"`.
    pub method: String,
    /// Method parameters, if any.
    #[serde(default)]
    pub params: Value,
}

impl McpRequest {
    /// Parses a request body, returning `None` if it is not a valid
    /// JSON-RPC object (missing `jsonrpc` or `method`, or not an object at
    /// all).
    #[must_use]
    pub fn parse(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        if !object.contains_key("jsonrpc") {
            return None;
        }
        let method = object.get("method")?.as_str()?.to_string();
        Some(Self {
            id: object.get("id").cloned().unwrap_or(Value::Null),
            method,
            params: object.get("params").cloned().unwrap_or(Value::Null),
        })
    }

    /// Returns `params.name` or `params.uri` as a string, the call-method
    /// route identifier. Returns `None` if neither is a string, in which
    /// case the caller returns `no-payment-required`.
    #[must_use]
    pub fn call_identifier(&self) -> Option<&str> {
        self.params
            .get("name")
            .or_else(|| self.params.get("uri"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_jsonrpc_object() {
        let body = serde_json::json!({"jsonrpc":"2.0","id":1,"method":"tools/list"});
        let req = McpRequest::parse(&body).unwrap();
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, serde_json::json!(1));
    }

    #[test]
    fn rejects_missing_jsonrpc_field() {
        let body = serde_json::json!({"id":1,"method":"tools/list"});
        assert!(McpRequest::parse(&body).is_none());
    }

    #[test]
    fn rejects_non_object_body() {
        assert!(McpRequest::parse(&serde_json::json!([1, 2, 3])).is_none());
    }

    #[test]
    fn call_identifier_prefers_name_over_uri() {
        let body = serde_json::json!({
            "jsonrpc":"2.0","method":"tools/call",
            "params":{"name":"foo","uri":"bar"}
        });
        let req = McpRequest::parse(&body).unwrap();
        assert_eq!(req.call_identifier(), Some("foo"));
    }

    #[test]
    fn call_identifier_falls_back_to_uri() {
        let body = serde_json::json!({
            "jsonrpc":"2.0","method":"resources/read",
            "params":{"uri":"file:///x"}
        });
        let req = McpRequest::parse(&body).unwrap();
        assert_eq!(req.call_identifier(), Some("file:///x"));
    }

    #[test]
    fn call_identifier_none_when_neither_present() {
        let body = serde_json::json!({"jsonrpc":"2.0","method":"tools/call","params":{}});
        let req = McpRequest::parse(&body).unwrap();
        assert!(req.call_identifier().is_none());
    }
}
