//! `*/list` method payment enrichment.
//!
//! A `tools/list`/`resources/list`/`prompts/list` call always passes through
//! to the upstream app; this module only computes the optional
//! `Payment-Required` response header advertising the priced call-methods
//! behind it.

use foldgate_core::payment_method::PaymentMethod;
use foldgate_core::restriction::Restriction;
use foldgate_core::routes::price_to_amount;
use serde::Serialize;

/// Maps a `*/list` method to the call-method restrictions are declared against.
///
/// Returns `None` for any method that is not one of the three recognized
/// list methods.
#[must_use]
pub fn call_method_for_list(list_method: &str) -> Option<&'static str> {
    match list_method {
        "tools/list" => Some("tools/call"),
        "resources/list" => Some("resources/read"),
        "prompts/list" => Some("prompts/get"),
        _ => None,
    }
}

/// One accepted payment option for a list-enrichment requirement.
#[derive(Debug, Clone, Serialize)]
pub struct ListAccept {
    /// CAIP-2 network id.
    pub network: String,
    /// Chain display name, e.g. `"Base"`.
    #[serde(rename = "chainDisplayName")]
    pub chain_display_name: String,
    /// On-chain asset/token contract address.
    pub asset: String,
    /// Asset display name, e.g. `"USDC"`.
    #[serde(rename = "assetDisplayName")]
    pub asset_display_name: String,
    /// Price in the asset's smallest unit, see [`price_to_amount`].
    pub amount: String,
    /// Recipient wallet address.
    #[serde(rename = "payTo")]
    pub pay_to: String,
}

/// One priced call-method restriction surfaced in list enrichment.
#[derive(Debug, Clone, Serialize)]
pub struct ListRequirement {
    /// Tool/resource/prompt identifier.
    pub name: String,
    /// The call method this requirement guards, e.g. `"tools/call"`.
    pub method: String,
    /// Human-readable description.
    pub description: String,
    /// Price in USD.
    pub price: f64,
    /// x402 payment scheme.
    pub scheme: String,
    /// Accepted payment options, one per configured payment method.
    pub accepts: Vec<ListAccept>,
}

/// Collects every `Mcp` restriction matching `call_method` with `price > 0`;
/// only restrictions with `price > 0` are advertised, so free tools are
/// omitted entirely.
///
/// Returns an empty vec if there is nothing to advertise, in which case the
/// caller emits no header.
#[must_use]
pub fn collect_list_requirements(
    restrictions: &[Restriction],
    payment_methods: &[PaymentMethod],
    call_method: &str,
) -> Vec<ListRequirement> {
    restrictions
        .iter()
        .filter_map(|restriction| {
            let Restriction::Mcp { method, name, price, scheme, description } = restriction
            else {
                return None;
            };
            if method != call_method || *price <= 0.0 {
                return None;
            }
            let accepts = payment_methods
                .iter()
                .map(|pm| ListAccept {
                    network: pm.caip2_id.clone(),
                    chain_display_name: pm.chain_display_name.clone(),
                    asset: pm.contract_address.clone(),
                    asset_display_name: pm.asset_display_name.clone(),
                    amount: price_to_amount(*price, pm.decimals),
                    pay_to: pm.pay_to_wallet_address.clone(),
                })
                .collect();
            Some(ListRequirement {
                name: name.clone(),
                method: method.clone(),
                description: description.clone(),
                price: *price,
                scheme: scheme.clone(),
                accepts,
            })
        })
        .collect()
}

/// The `Payment-Required` list-enrichment header body.
#[derive(Debug, Clone, Serialize)]
pub struct ListPaymentHeader {
    /// The priced call-method restrictions behind this list.
    pub requirements: Vec<ListRequirement>,
    /// Terms-of-service link, if the host configures one.
    #[serde(rename = "termsOfServiceUrl", skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcp_restriction(method: &str, name: &str, price: f64) -> Restriction {
        Restriction::from_value(&serde_json::json!({
            "type": "mcp", "description": "d", "price": price, "scheme": "exact",
            "method": method, "name": name
        }))
        .unwrap()
    }

    fn payment_method() -> PaymentMethod {
        PaymentMethod::parse_list(
            r#"[{"caip2Id":"eip155:8453","decimals":6,"contractAddress":"0xabc",
                "payToWalletAddress":"0xdef","chainDisplayName":"Base","assetDisplayName":"USDC"}]"#,
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn maps_known_list_methods() {
        assert_eq!(call_method_for_list("tools/list"), Some("tools/call"));
        assert_eq!(call_method_for_list("resources/list"), Some("resources/read"));
        assert_eq!(call_method_for_list("prompts/list"), Some("prompts/get"));
        assert_eq!(call_method_for_list("other"), None);
    }

    #[test]
    fn collects_only_priced_matches() {
        let restrictions = vec![
            mcp_restriction("tools/call", "foo", 0.5),
            mcp_restriction("tools/call", "free", 0.0),
            mcp_restriction("resources/read", "bar", 1.0),
        ];
        let methods = vec![payment_method()];
        let reqs = collect_list_requirements(&restrictions, &methods, "tools/call");
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].name, "foo");
        assert_eq!(reqs[0].accepts[0].amount, "500000");
    }

    #[test]
    fn empty_when_nothing_priced() {
        let restrictions = vec![mcp_restriction("tools/call", "free", 0.0)];
        let reqs = collect_list_requirements(&restrictions, &[payment_method()], "tools/call");
        assert!(reqs.is_empty());
    }
}
