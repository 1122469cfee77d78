//! The facilitator verify/settle trait and its wire-level request/response types.
//!
//! The wire shapes here intentionally mirror the x402 protocol types used by
//! this crate family's HTTP transport layer (tagged success/failure enums
//! with a custom `serde` impl rather than an `Option`-heavy struct), so that a
//! concrete `FacilitatorClient` built on top of `reqwest` can serialize and
//! deserialize them directly against a remote facilitator.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Boxed, `Send` future — the standard dyn-compatible async return type used
/// at every trait boundary that must remain object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request body sent to a facilitator's `/verify` endpoint.
///
/// Kept as an opaque JSON value (rather than a fully modeled struct) because
/// the exact payload shape is scheme-specific and this crate does not
/// interpret it — it only forwards it to the facilitator and interprets the
/// facilitator's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest(pub serde_json::Value);

/// Request body sent to a facilitator's `/settle` endpoint.
///
/// Structurally identical to [`VerifyRequest`] on the wire but kept as a
/// distinct type so a verified request cannot accidentally be settled
/// without going through [`From<VerifyRequest>`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleRequest(pub serde_json::Value);

impl From<VerifyRequest> for SettleRequest {
    fn from(request: VerifyRequest) -> Self {
        Self(request.0)
    }
}

/// Result of verifying a payment payload against payment requirements.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum VerifyResponse {
    /// The payload matches the requirements and passes all checks.
    Valid {
        /// Address of the payer.
        payer: String,
    },
    /// The payload was well-formed but failed verification.
    Invalid {
        /// Machine-readable reason.
        reason: String,
        /// Optional human-readable detail.
        message: Option<String>,
        /// Payer address, if identifiable.
        payer: Option<String>,
    },
}

impl VerifyResponse {
    /// Returns `true` if verification succeeded.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponseWire {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invalid_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invalid_message: Option<String>,
}

impl Serialize for VerifyResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = match self {
            Self::Valid { payer } => VerifyResponseWire {
                is_valid: true,
                payer: Some(payer.clone()),
                invalid_reason: None,
                invalid_message: None,
            },
            Self::Invalid {
                reason,
                message,
                payer,
            } => VerifyResponseWire {
                is_valid: false,
                payer: payer.clone(),
                invalid_reason: Some(reason.clone()),
                invalid_message: message.clone(),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VerifyResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = VerifyResponseWire::deserialize(deserializer)?;
        if wire.is_valid {
            let payer = wire
                .payer
                .ok_or_else(|| serde::de::Error::missing_field("payer"))?;
            Ok(Self::Valid { payer })
        } else {
            let reason = wire
                .invalid_reason
                .ok_or_else(|| serde::de::Error::missing_field("invalidReason"))?;
            Ok(Self::Invalid {
                reason,
                message: wire.invalid_message,
                payer: wire.payer,
            })
        }
    }
}

/// Result of settling a verified payment on-chain.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SettleResponse {
    /// Settlement succeeded.
    Success {
        /// Address that paid.
        payer: String,
        /// On-chain transaction hash.
        transaction: String,
        /// Network the settlement occurred on (CAIP-2 id or network name).
        network: String,
    },
    /// Settlement failed.
    Error {
        /// Machine-readable reason.
        reason: String,
        /// Optional human-readable detail.
        message: Option<String>,
        /// Network the settlement was attempted on.
        network: String,
    },
}

impl SettleResponse {
    /// Returns `true` if settlement succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettleResponseWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction: Option<String>,
    network: String,
}

impl Serialize for SettleResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = match self {
            Self::Success {
                payer,
                transaction,
                network,
            } => SettleResponseWire {
                success: true,
                error_reason: None,
                error_message: None,
                payer: Some(payer.clone()),
                transaction: Some(transaction.clone()),
                network: network.clone(),
            },
            Self::Error {
                reason,
                message,
                network,
            } => SettleResponseWire {
                success: false,
                error_reason: Some(reason.clone()),
                error_message: message.clone(),
                payer: None,
                transaction: None,
                network: network.clone(),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SettleResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = SettleResponseWire::deserialize(deserializer)?;
        if wire.success {
            let payer = wire
                .payer
                .ok_or_else(|| serde::de::Error::missing_field("payer"))?;
            let transaction = wire
                .transaction
                .ok_or_else(|| serde::de::Error::missing_field("transaction"))?;
            Ok(Self::Success {
                payer,
                transaction,
                network: wire.network,
            })
        } else {
            let reason = wire
                .error_reason
                .ok_or_else(|| serde::de::Error::missing_field("errorReason"))?;
            Ok(Self::Error {
                reason,
                message: wire.error_message,
                network: wire.network,
            })
        }
    }
}

/// Dyn-compatible facilitator client: verifies and settles payments, and
/// reports its supported schemes/networks.
///
/// All methods are async because they call out to a remote facilitator
/// service over HTTP.
pub trait Facilitator: Send + Sync {
    /// Verifies a payment payload against payment requirements.
    fn verify<'a>(&'a self, request: &'a VerifyRequest) -> BoxFuture<'a, VerifyResponse>;

    /// Settles a previously verified payment on-chain.
    fn settle<'a>(&'a self, request: &'a SettleRequest) -> BoxFuture<'a, SettleResponse>;

    /// Returns the raw `/supported` response body, if the facilitator exposes one.
    fn supported<'a>(&'a self) -> BoxFuture<'a, Option<serde_json::Value>>;
}

impl<T: Facilitator + ?Sized> Facilitator for std::sync::Arc<T> {
    fn verify<'a>(&'a self, request: &'a VerifyRequest) -> BoxFuture<'a, VerifyResponse> {
        (**self).verify(request)
    }
    fn settle<'a>(&'a self, request: &'a SettleRequest) -> BoxFuture<'a, SettleResponse> {
        (**self).settle(request)
    }
    fn supported<'a>(&'a self) -> BoxFuture<'a, Option<serde_json::Value>> {
        (**self).supported()
    }
}
