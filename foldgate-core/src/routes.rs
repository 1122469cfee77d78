//! Route table construction: restrictions × payment methods → accepted payment options.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payment_method::PaymentMethod;
use crate::restriction::Restriction;

/// One payment option accepted for a route, derived from one [`PaymentMethod`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    /// x402 payment scheme, copied from the matched restriction.
    pub scheme: String,
    /// Price in the asset's smallest unit, see [`price_to_amount`].
    pub amount: String,
    /// CAIP-2 network identifier.
    pub network: String,
    /// Recipient wallet address.
    pub pay_to: String,
    /// Merged `payment_method.extra` and (if set) `termsOfServiceUrl`.
    pub extra: Value,
}

/// One resolved route: the payment options it accepts plus the restriction
/// that produced it.
///
/// The restriction is stored by value rather than as a dynamic back-reference
/// (the cyclic-reference design note): this is the "index next to the route"
/// resolution, just inlined instead of split across a second map, since a
/// `Restriction` is cheap to clone (a couple of `String`s and an `Rc`-backed
/// `Regex`).
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Payment options accepted for this route.
    pub accepts: Vec<PaymentOption>,
    /// Description surfaced in error bodies, copied from the restriction.
    pub description: String,
    /// MIME type of the protected resource.
    pub mime_type: String,
    /// The restriction that produced this route.
    pub restriction: Restriction,
}

/// An ordered `route_key -> RouteConfig` table.
///
/// Iteration order is insertion order, matching the "first hit wins" matching
/// rule of the HTTP resource server wrapper.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(String, RouteConfig)>,
}

impl RouteTable {
    /// Builds an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts a route, preserving existing entries' relative order.
    pub fn insert(&mut self, key: impl Into<String>, config: RouteConfig) {
        self.entries.push((key.into(), config));
    }

    /// Looks up a route by its exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RouteConfig> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteConfig)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Extends this table with another, preserving relative order (`self` first).
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Number of routes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Converts a USD price into a decimal-integer string of the asset's
/// smallest unit: `round(price_usd * 10^decimals)`.
///
/// Routed through [`Decimal`] rather than raw `f64` arithmetic (the same
/// money-math convention the facilitator stack uses for on-chain amounts)
/// so a price like `0.1` doesn't pick up binary-float rounding noise before
/// the final round-to-integer step. Result has no sign and no leading zeros
/// except a bare `"0"`.
#[must_use]
pub fn price_to_amount(price_usd: f64, decimals: u32) -> String {
    let price = Decimal::from_f64(price_usd).unwrap_or(Decimal::ZERO);
    let scale = Decimal::from_i64(10i64.pow(decimals.min(18))).unwrap_or(Decimal::ONE);
    let atomic = (price * scale).round();
    let atomic = atomic.max(Decimal::ZERO);
    atomic.to_i128().map_or_else(|| "0".to_string(), |value| value.to_string())
}

fn merge_extra(method: &PaymentMethod, tos_url: Option<&str>) -> Value {
    let mut extra = method.extra.clone().unwrap_or_else(|| serde_json::json!({}));
    if let Value::Object(map) = &mut extra
        && let Some(tos_url) = tos_url
    {
        map.insert(
            "termsOfServiceUrl".to_string(),
            Value::String(tos_url.to_string()),
        );
    }
    extra
}

fn payment_options(
    restriction: &Restriction,
    payment_methods: &[PaymentMethod],
    tos_url: Option<&str>,
) -> Vec<PaymentOption> {
    payment_methods
        .iter()
        .map(|method| PaymentOption {
            scheme: restriction.scheme().to_string(),
            amount: price_to_amount(restriction.price(), method.decimals),
            network: method.caip2_id.clone(),
            pay_to: method.pay_to_wallet_address.clone(),
            extra: merge_extra(method, tos_url),
        })
        .collect()
}

/// Builds the content (non-MCP) route table from restrictions and payment methods.
///
/// For each `Web`/`Api` restriction the key is `"{VERB} {path}"` when the
/// restriction is `Api` with an explicit `http_method`, else the bare path.
#[must_use]
pub fn build_routes_config(
    restrictions: &[Restriction],
    payment_methods: &[PaymentMethod],
    tos_url: Option<&str>,
) -> RouteTable {
    let mut table = RouteTable::new();
    for restriction in restrictions {
        let key = match restriction {
            Restriction::Web { path, .. } => path.as_str().to_string(),
            Restriction::Api {
                path, http_method, ..
            } => match http_method {
                Some(verb) => format!("{verb} {path}"),
                None => path.as_str().to_string(),
            },
            Restriction::Mcp { .. } => continue,
        };
        table.insert(
            key,
            RouteConfig {
                accepts: payment_options(restriction, payment_methods, tos_url),
                description: restriction.description().to_string(),
                mime_type: "application/json".to_string(),
                restriction: restriction.clone(),
            },
        );
    }
    table
}

/// Builds the MCP route table. Only `Mcp` restrictions contribute entries;
/// keys are `"{mcp_endpoint}/{method}:{name}"`.
#[must_use]
pub fn build_mcp_routes_config(
    restrictions: &[Restriction],
    payment_methods: &[PaymentMethod],
    tos_url: Option<&str>,
    mcp_endpoint: &str,
) -> RouteTable {
    let mut table = RouteTable::new();
    for restriction in restrictions {
        let Restriction::Mcp { method, name, .. } = restriction else {
            continue;
        };
        table.insert(
            build_mcp_route_key(mcp_endpoint, method, name),
            RouteConfig {
                accepts: payment_options(restriction, payment_methods, tos_url),
                description: restriction.description().to_string(),
                mime_type: "application/json".to_string(),
                restriction: restriction.clone(),
            },
        );
    }
    table
}

/// Builds the canonical MCP route key for a method/identifier pair mounted
/// at `mcp_endpoint`.
#[must_use]
pub fn build_mcp_route_key(mcp_endpoint: &str, method: &str, name: &str) -> String {
    format!("{mcp_endpoint}/{method}:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_to_amount_rounds() {
        assert_eq!(price_to_amount(1.50, 6), "1500000");
        assert_eq!(price_to_amount(0.0, 6), "0");
        assert_eq!(price_to_amount(0.5, 2), "50");
    }

    #[test]
    fn mcp_route_key_format() {
        assert_eq!(build_mcp_route_key("/mcp", "tools/call", "x"), "/mcp/tools/call:x");
    }

    #[test]
    fn api_route_key_with_method() {
        let restriction = Restriction::from_value(&serde_json::json!({
            "type": "api", "description": "d", "price": 0.01, "scheme": "exact",
            "path": "/api/x", "httpMethod": "get"
        }))
        .unwrap();
        let table = build_routes_config(&[restriction], &[], None);
        assert!(table.get("GET /api/x").is_some());
    }

    #[test]
    fn api_route_key_without_method_is_bare_path() {
        let restriction = Restriction::from_value(&serde_json::json!({
            "type": "api", "description": "d", "price": 0.01, "scheme": "exact",
            "path": "/api/x"
        }))
        .unwrap();
        let table = build_routes_config(&[restriction], &[], None);
        assert!(table.get("/api/x").is_some());
    }
}
