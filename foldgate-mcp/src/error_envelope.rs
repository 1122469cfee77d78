//! The JSON-RPC 402 error envelope for MCP call-method rejections.
//!
//! `{jsonrpc:"2.0", id, error:{code:402, message:"Payment required", data:{...}}}`.

use serde::Serialize;

use crate::request::JsonRpcId;

/// One payment method surfaced in the envelope's `error.data.payment_methods`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpPaymentMethod {
    /// CAIP-2 network id.
    pub network: String,
    /// On-chain asset/token contract address.
    pub asset: String,
    /// Number of decimals for the asset.
    pub decimals: u32,
    /// Recipient wallet address.
    pub pay_to: String,
    /// Chain display name.
    pub chain: String,
    /// Asset display name.
    pub asset_name: String,
}

/// The `error.data` object of the JSON-RPC 402 envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpErrorData {
    /// Protocol/core version string.
    pub version: String,
    /// The request's metadata id.
    pub request_id: String,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
    /// The matched restriction's description.
    pub description: String,
    /// Price in USD.
    pub price: f64,
    /// Terms-of-service link, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
    /// Accepted payment methods.
    pub payment_methods: Vec<McpPaymentMethod>,
}

#[derive(Serialize)]
struct McpError {
    code: i32,
    message: &'static str,
    data: McpErrorData,
}

#[derive(Serialize)]
struct McpErrorEnvelope {
    jsonrpc: &'static str,
    id: JsonRpcId,
    error: McpError,
}

/// Builds the JSON body of a 402 JSON-RPC error response.
///
/// # Panics
///
/// Never panics: every field is already a concrete value by the time the
/// dispatcher calls this, so serialization cannot fail.
#[must_use]
pub fn build_error_envelope(id: JsonRpcId, data: McpErrorData) -> Vec<u8> {
    let envelope = McpErrorEnvelope {
        jsonrpc: "2.0",
        id,
        error: McpError {
            code: 402,
            message: "Payment required",
            data,
        },
    };
    serde_json::to_vec(&envelope).expect("mcp error envelope is always serializable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_id_and_code() {
        let body = build_error_envelope(
            serde_json::json!(7),
            McpErrorData {
                version: "1".into(),
                request_id: "req-1".into(),
                timestamp: "2026-01-01T00:00:00Z".into(),
                description: "d".into(),
                price: 0.5,
                terms_of_service_url: None,
                payment_methods: vec![],
            },
        );
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["error"]["code"], 402);
        assert_eq!(value["error"]["data"]["price"], 0.5);
    }
}
