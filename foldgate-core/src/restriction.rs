//! The tagged web/api/mcp restriction variants.
//!
//! A closed sum type: the three shapes share `{description, price, scheme}`
//! and are matched exhaustively by formatters downstream, never dispatched
//! through an open class hierarchy.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An operator-defined rule describing which requests require payment, at
/// what price (USD), under what x402 scheme.
#[derive(Debug, Clone)]
pub enum Restriction {
    /// Gates a browser-facing path. Only ever enforced against matched bots.
    Web {
        /// Human-readable description surfaced in error bodies.
        description: String,
        /// Price in USD.
        price: f64,
        /// x402 payment scheme (e.g. `"exact"`).
        scheme: String,
        /// Compiled, case-insensitive path pattern.
        path: Regex,
    },
    /// Gates an API path, optionally scoped to one HTTP verb.
    Api {
        /// Human-readable description surfaced in error bodies.
        description: String,
        /// Price in USD.
        price: f64,
        /// x402 payment scheme (e.g. `"exact"`).
        scheme: String,
        /// Compiled, case-insensitive path pattern.
        path: Regex,
        /// HTTP verb this restriction is scoped to, if any.
        http_method: Option<String>,
    },
    /// Gates one MCP tool/resource/prompt call.
    Mcp {
        /// Human-readable description surfaced in error bodies.
        description: String,
        /// Price in USD.
        price: f64,
        /// x402 payment scheme (e.g. `"exact"`).
        scheme: String,
        /// JSON-RPC call method, e.g. `"tools/call"`.
        method: String,
        /// Tool/resource/prompt identifier.
        name: String,
    },
}

impl Restriction {
    /// Human-readable description shared by every variant.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Web { description, .. } | Self::Api { description, .. } | Self::Mcp { description, .. } => {
                description
            }
        }
    }

    /// Price in USD, shared by every variant.
    #[must_use]
    pub const fn price(&self) -> f64 {
        match self {
            Self::Web { price, .. } | Self::Api { price, .. } | Self::Mcp { price, .. } => *price,
        }
    }

    /// x402 payment scheme, shared by every variant.
    #[must_use]
    pub fn scheme(&self) -> &str {
        match self {
            Self::Web { scheme, .. } | Self::Api { scheme, .. } | Self::Mcp { scheme, .. } => scheme,
        }
    }

    /// Returns `true` for the [`Restriction::Web`] variant.
    #[must_use]
    pub const fn is_web(&self) -> bool {
        matches!(self, Self::Web { .. })
    }

    /// Returns `true` for the [`Restriction::Mcp`] variant.
    #[must_use]
    pub const fn is_mcp(&self) -> bool {
        matches!(self, Self::Mcp { .. })
    }
}

/// Error returned when a `restrictions` KV entry fails to parse.
#[derive(Debug, thiserror::Error)]
pub enum RestrictionParseError {
    /// The `type` discriminator was present but not one of `web`/`api`/`mcp`.
    #[error("unknown restriction type {0:?}")]
    UnknownType(String),
    /// The `path` field did not compile as a regular expression.
    #[error("invalid path regex {path:?}: {source}")]
    InvalidPath {
        /// The offending pattern.
        path: String,
        /// The underlying regex compile error.
        #[source]
        source: regex::Error,
    },
    /// Underlying JSON structure did not match any restriction shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum RestrictionWire {
    #[serde(rename_all = "camelCase")]
    Web {
        description: String,
        price: f64,
        scheme: String,
        path: String,
    },
    #[serde(rename_all = "camelCase")]
    Api {
        description: String,
        price: f64,
        scheme: String,
        path: String,
        #[serde(default)]
        http_method: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Mcp {
        description: String,
        price: f64,
        scheme: String,
        method: String,
        name: String,
    },
}

impl Restriction {
    /// Parses one restriction object from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`RestrictionParseError`] for an unknown `type` tag, a path
    /// that does not compile as a regex, or a structurally invalid object.
    /// An unknown tag fails loudly rather than being silently skipped.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, RestrictionParseError> {
        let Some(tag) = value.get("type").and_then(serde_json::Value::as_str) else {
            return Err(RestrictionParseError::UnknownType("<missing>".into()));
        };
        let tag = tag.to_string();
        let wire: RestrictionWire = serde_json::from_value(value.clone()).map_err(|source| {
            if matches!(tag.as_str(), "web" | "api" | "mcp") {
                RestrictionParseError::Json(source)
            } else {
                RestrictionParseError::UnknownType(tag.clone())
            }
        })?;
        match wire {
            RestrictionWire::Web {
                description,
                price,
                scheme,
                path,
            } => Ok(Self::Web {
                description,
                price,
                scheme,
                path: compile_path(path)?,
            }),
            RestrictionWire::Api {
                description,
                price,
                scheme,
                path,
                http_method,
            } => Ok(Self::Api {
                description,
                price,
                scheme,
                path: compile_path(path)?,
                http_method: http_method.map(|m| m.to_uppercase()),
            }),
            RestrictionWire::Mcp {
                description,
                price,
                scheme,
                method,
                name,
            } => Ok(Self::Mcp {
                description,
                price,
                scheme,
                method,
                name,
            }),
        }
    }

    /// Parses a whole `restrictions` KV array.
    ///
    /// # Errors
    ///
    /// Fails on the first element that does not parse; an unknown
    /// restriction type fails loudly rather than being skipped.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, RestrictionParseError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        values.iter().map(Self::from_value).collect()
    }
}

fn compile_path(pattern: String) -> Result<Regex, RestrictionParseError> {
    Regex::new(&format!("(?i){pattern}")).map_err(|source| RestrictionParseError::InvalidPath {
        path: pattern,
        source,
    })
}

// `Regex` does not implement `Serialize`/`Deserialize`, but downstream
// consumers occasionally need to round-trip a restriction list through JSON
// for test fixtures; provide a best-effort impl keyed off the pattern string.
impl Serialize for Restriction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Web {
                description,
                price,
                scheme,
                path,
            } => {
                map.serialize_entry("type", "web")?;
                map.serialize_entry("description", description)?;
                map.serialize_entry("price", price)?;
                map.serialize_entry("scheme", scheme)?;
                map.serialize_entry("path", path.as_str())?;
            }
            Self::Api {
                description,
                price,
                scheme,
                path,
                http_method,
            } => {
                map.serialize_entry("type", "api")?;
                map.serialize_entry("description", description)?;
                map.serialize_entry("price", price)?;
                map.serialize_entry("scheme", scheme)?;
                map.serialize_entry("path", path.as_str())?;
                map.serialize_entry("httpMethod", http_method)?;
            }
            Self::Mcp {
                description,
                price,
                scheme,
                method,
                name,
            } => {
                map.serialize_entry("type", "mcp")?;
                map.serialize_entry("description", description)?;
                map.serialize_entry("price", price)?;
                map.serialize_entry("scheme", scheme)?;
                map.serialize_entry("method", method)?;
                map.serialize_entry("name", name)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Restriction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_variant() {
        let web = Restriction::from_value(&serde_json::json!({
            "type": "web", "description": "d", "price": 1.0, "scheme": "exact", "path": "^/$"
        }))
        .unwrap();
        assert!(web.is_web());

        let api = Restriction::from_value(&serde_json::json!({
            "type": "api", "description": "d", "price": 0.01, "scheme": "exact",
            "path": "/api/x", "httpMethod": "get"
        }))
        .unwrap();
        assert!(matches!(
            &api,
            Restriction::Api { http_method: Some(m), .. } if m == "GET"
        ));

        let mcp = Restriction::from_value(&serde_json::json!({
            "type": "mcp", "description": "d", "price": 0.5, "scheme": "exact",
            "method": "tools/call", "name": "foo"
        }))
        .unwrap();
        assert!(mcp.is_mcp());
    }

    #[test]
    fn unknown_type_fails_loudly() {
        let err = Restriction::from_value(&serde_json::json!({"type": "ftp"})).unwrap_err();
        assert!(matches!(err, RestrictionParseError::UnknownType(t) if t == "ftp"));
    }

    #[test]
    fn invalid_regex_fails() {
        let err = Restriction::from_value(&serde_json::json!({
            "type": "web", "description": "d", "price": 1.0, "scheme": "exact", "path": "("
        }))
        .unwrap_err();
        assert!(matches!(err, RestrictionParseError::InvalidPath { .. }));
    }
}
