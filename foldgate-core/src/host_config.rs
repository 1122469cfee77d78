//! Host-level configuration: protection mode, MCP endpoint, terms of service.

use serde::{Deserialize, Serialize};

/// Which requests get checked for a bot match before payment enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiProtectionMode {
    /// Only requests whose `User-Agent` matches a configured [`crate::Bot`] are checked.
    Bots,
    /// Every request is checked, bot match or not.
    All,
}

impl Default for ApiProtectionMode {
    fn default() -> Self {
        Self::Bots
    }
}

/// Deserialized `host-config` KV entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// The host this configuration applies to.
    pub host: String,
    /// Whether bot-only or all traffic is checked. Defaults to `"bots"` when absent.
    #[serde(default)]
    pub api_protection_mode: ApiProtectionMode,
    /// Path at which the MCP JSON-RPC sub-pipeline is mounted. `None` disables MCP routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_endpoint: Option<String>,
    /// Link surfaced in paywall/API error bodies, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
}

impl HostConfig {
    /// Returns `true` if `path` is exactly the configured MCP endpoint.
    #[must_use]
    pub fn is_mcp_path(&self, path: &str) -> bool {
        self.mcp_endpoint.as_deref() == Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_protection_mode_to_bots() {
        let cfg: HostConfig = serde_json::from_str(r#"{"host":"example.com"}"#).unwrap();
        assert_eq!(cfg.api_protection_mode, ApiProtectionMode::Bots);
        assert!(cfg.mcp_endpoint.is_none());
    }

    #[test]
    fn parses_full_config() {
        let cfg: HostConfig = serde_json::from_str(
            r#"{"host":"example.com","apiProtectionMode":"all","mcpEndpoint":"/mcp","termsOfServiceUrl":"https://example.com/tos"}"#,
        )
        .unwrap();
        assert_eq!(cfg.api_protection_mode, ApiProtectionMode::All);
        assert!(cfg.is_mcp_path("/mcp"));
        assert!(!cfg.is_mcp_path("/mcp2"));
    }
}
