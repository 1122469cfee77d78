//! The browser-facing paywall HTML template.
//!
//! A pure string builder — no templating engine dependency. Escaping is the
//! caller's responsibility: payment method and restriction fields are
//! assumed operator-controlled.

use std::collections::BTreeMap;

use foldgate_core::payment_method::PaymentMethod;
use foldgate_core::restriction::Restriction;

/// Renders the `402: Payment Required` paywall page for a matched [`Restriction::Web`].
///
/// Payment methods are grouped by `caip2_id`; each group renders a chain
/// header, the group's first method's `pay_to` address, and one row per
/// token with `{asset_display_name, scheme (capitalized), price}`.
#[must_use]
pub fn render_paywall(restriction: &Restriction, payment_methods: &[PaymentMethod], url: &str, tos_url: Option<&str>) -> String {
    let (description, price, scheme) = (
        restriction.description(),
        restriction.price(),
        restriction.scheme(),
    );

    let mut groups: BTreeMap<&str, Vec<&PaymentMethod>> = BTreeMap::new();
    for method in payment_methods {
        groups.entry(method.caip2_id.as_str()).or_default().push(method);
    }

    let scheme_capitalized = capitalize(scheme);
    let mut cards = String::new();
    for (caip2_id, methods) in &groups {
        let pay_to = methods.first().map(|m| m.pay_to_wallet_address.as_str()).unwrap_or_default();
        let chain_name = methods.first().map(|m| m.chain_display_name.as_str()).unwrap_or(caip2_id);
        let mut rows = String::new();
        for method in methods {
            rows.push_str(&format!(
                "<div class=\"row\"><span class=\"asset\">{}</span><span class=\"scheme\">{}</span><span class=\"price\">${price}</span></div>",
                method.asset_display_name, scheme_capitalized,
            ));
        }
        cards.push_str(&format!(
            "<div class=\"card\"><h2>{chain_name}</h2><p class=\"pay-to\">{pay_to}</p>{rows}</div>",
        ));
    }

    let tos_html = tos_url
        .map(|link| format!("<p class=\"tos\"><a href=\"{link}\">Terms of Service</a></p>"))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html><html><head><title>402: Payment Required</title></head>\
<body><h1>402: Payment Required</h1><p class=\"description\">{description}</p>\
<p class=\"resource\">{url}</p>{cards}{tos_html}</body></html>",
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_restriction() -> Restriction {
        Restriction::from_value(&serde_json::json!({
            "type": "web", "description": "Premium article", "price": 1.0,
            "scheme": "exact", "path": "^/$"
        }))
        .unwrap()
    }

    fn methods() -> Vec<PaymentMethod> {
        PaymentMethod::parse_list(
            r#"[
                {"caip2Id":"eip155:8453","decimals":6,"contractAddress":"0xusdc",
                 "payToWalletAddress":"0xwallet","chainDisplayName":"Base","assetDisplayName":"USDC"},
                {"caip2Id":"eip155:8453","decimals":18,"contractAddress":"0xweth",
                 "payToWalletAddress":"0xother","chainDisplayName":"Base","assetDisplayName":"WETH"},
                {"caip2Id":"solana:mainnet","decimals":6,"contractAddress":"sousdc",
                 "payToWalletAddress":"sowallet","chainDisplayName":"Solana","assetDisplayName":"USDC"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn renders_one_card_per_network() {
        let html = render_paywall(&web_restriction(), &methods(), "https://example.com/", None);
        assert!(html.contains("402: Payment Required"));
        assert_eq!(html.matches("class=\"card\"").count(), 2);
        assert!(html.contains("$1"));
        assert!(html.contains("Exact"));
    }

    #[test]
    fn first_method_in_group_is_canonical_pay_to() {
        let html = render_paywall(&web_restriction(), &methods(), "https://example.com/", None);
        assert!(html.contains("0xwallet"));
    }

    #[test]
    fn omits_tos_link_when_absent() {
        let html = render_paywall(&web_restriction(), &methods(), "https://example.com/", None);
        assert!(!html.contains("Terms of Service"));
    }

    #[test]
    fn includes_tos_link_when_present() {
        let html = render_paywall(
            &web_restriction(),
            &methods(),
            "https://example.com/",
            Some("https://example.com/tos"),
        );
        assert!(html.contains("Terms of Service"));
    }
}
