//! Accepted on-chain payment methods.

use serde::{Deserialize, Serialize};

/// One accepted payment method for one network/asset pair.
///
/// Multiple methods per network are permitted; the first one encountered for
/// a given `caip2_id` is treated as canonical for paywall display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// CAIP-2 chain identifier, e.g. `"eip155:8453"`.
    pub caip2_id: String,
    /// Number of decimals for the asset (e.g. 6 for USDC).
    pub decimals: u32,
    /// On-chain asset/token contract address.
    pub contract_address: String,
    /// Wallet address payments for this method settle to.
    pub pay_to_wallet_address: String,
    /// Display name of the chain (e.g. `"Base"`).
    pub chain_display_name: String,
    /// Display name of the asset (e.g. `"USDC"`).
    pub asset_display_name: String,
    /// Scheme-specific extra fields merged into payment options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl PaymentMethod {
    /// Parses a whole `payment-methods` KV array.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the array does not match the schema.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
