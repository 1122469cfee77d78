//! The API and MCP JSON 402 body formatters.
//!
//! The web formatter lives in [`crate::paywall`]; this module covers the two
//! JSON-shaped error bodies.

use foldgate_core::metadata::RequestMetadata;
use foldgate_core::payment_method::PaymentMethod;
use foldgate_core::restriction::Restriction;
use foldgate_core::result::ResponseParts;
use foldgate_mcp::{McpErrorData, McpPaymentMethod, build_error_envelope};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPaymentMethod<'a> {
    network: &'a str,
    asset: &'a str,
    decimals: u32,
    pay_to: &'a str,
    chain: &'a str,
    asset_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody<'a> {
    error: &'static str,
    version: &'a str,
    request_id: String,
    timestamp: String,
    message: &'a str,
    price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    terms_of_service_url: Option<&'a str>,
    payment_methods: Vec<ApiPaymentMethod<'a>>,
}

/// Formats a `payment-error` for an [`Restriction::Api`] restriction: writes
/// the payment-required JSON body onto `response` and sets
/// `Content-Type: application/json`.
pub fn format_api_error(
    response: &mut ResponseParts,
    restriction: &Restriction,
    metadata: &RequestMetadata,
    payment_methods: &[PaymentMethod],
    tos_url: Option<&str>,
) {
    let body = ApiErrorBody {
        error: "payment_required",
        version: &metadata.version,
        request_id: metadata.request_id.to_string(),
        timestamp: metadata.timestamp.to_rfc3339(),
        message: restriction.description(),
        price: restriction.price(),
        terms_of_service_url: tos_url,
        payment_methods: payment_methods
            .iter()
            .map(|pm| ApiPaymentMethod {
                network: &pm.caip2_id,
                asset: &pm.contract_address,
                decimals: pm.decimals,
                pay_to: &pm.pay_to_wallet_address,
                chain: &pm.chain_display_name,
                asset_name: &pm.asset_display_name,
            })
            .collect(),
    };
    response.body = serde_json::to_vec(&body).unwrap_or_default();
    response.content_type = Some("application/json".to_string());
}

/// Rewrites a `payment-error` response's body as the JSON-RPC 402 envelope
/// and sets `Content-Type: application/json`.
pub fn format_mcp_error(
    response: &mut ResponseParts,
    restriction: &Restriction,
    metadata: &RequestMetadata,
    payment_methods: &[PaymentMethod],
    tos_url: Option<&str>,
    rpc_id: Value,
) {
    let data = McpErrorData {
        version: metadata.version.clone(),
        request_id: metadata.request_id.to_string(),
        timestamp: metadata.timestamp.to_rfc3339(),
        description: restriction.description().to_string(),
        price: restriction.price(),
        terms_of_service_url: tos_url.map(str::to_string),
        payment_methods: payment_methods
            .iter()
            .map(|pm| McpPaymentMethod {
                network: pm.caip2_id.clone(),
                asset: pm.contract_address.clone(),
                decimals: pm.decimals,
                pay_to: pm.pay_to_wallet_address.clone(),
                chain: pm.chain_display_name.clone(),
                asset_name: pm.asset_display_name.clone(),
            })
            .collect(),
    };
    response.body = build_error_envelope(rpc_id, data);
    response.content_type = Some("application/json".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_restriction() -> Restriction {
        Restriction::from_value(&serde_json::json!({
            "type": "api", "description": "d", "price": 0.5, "scheme": "exact", "path": "/x"
        }))
        .unwrap()
    }

    #[test]
    fn api_error_body_has_expected_shape() {
        let mut response = ResponseParts::empty(402);
        format_api_error(
            &mut response,
            &api_restriction(),
            &RequestMetadata::new("1.0"),
            &[],
            Some("https://example.com/tos"),
        );
        let value: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(value["error"], "payment_required");
        assert_eq!(value["price"], 0.5);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn mcp_error_envelope_carries_id() {
        let mut response = ResponseParts::empty(402);
        format_mcp_error(
            &mut response,
            &api_restriction(),
            &RequestMetadata::new("1.0"),
            &[],
            None,
            serde_json::json!(7),
        );
        let value: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["error"]["code"], 402);
    }
}
