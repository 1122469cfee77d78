//! The outcome type threaded through the whole request-decision pipeline.

use crate::facilitator::{SettleRequest, VerifyRequest};
use crate::metadata::RequestMetadata;
use crate::restriction::Restriction;

/// An HTTP response body/status/headers triple, pre-construction of the
/// framework-specific response object.
#[derive(Debug, Clone, Default)]
pub struct ResponseParts {
    /// HTTP status code.
    pub status: u16,
    /// Response body, already serialized (JSON, HTML, or empty).
    pub body: Vec<u8>,
    /// Additional response headers beyond `Content-Type`, keyed by header name.
    pub headers: Vec<(String, String)>,
    /// `Content-Type` header value, if the body has one.
    pub content_type: Option<String>,
}

impl ResponseParts {
    /// Builds an empty response with the given status and no body.
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            headers: Vec::new(),
            content_type: None,
        }
    }

    /// Overwrites the status code, leaving body/headers untouched.
    ///
    /// Used for the `bot.force_200` override.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Appends a response header.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }
}

/// The outcome of running the request-decision pipeline on one request.
///
/// `headers` is carried uniformly on every variant, not just the ones that
/// already embed a [`ResponseParts`]: a caller building a response should
/// never need to match on the variant just to find where the extra headers
/// live.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ProcessRequestResult {
    /// No payment is required; the upstream application should handle the request.
    NoPaymentRequired {
        /// Metadata for this request.
        metadata: RequestMetadata,
        /// Extra response headers to attach to the pass-through response, if any.
        headers: Vec<(String, String)>,
    },
    /// Payment was required and missing, invalid, or the upstream wants to
    /// reject settlement; carries a ready-to-send 402 (or bot-overridden 200) response.
    PaymentError {
        /// Metadata for this request.
        metadata: RequestMetadata,
        /// The restriction that produced this error, if one was matched.
        restriction: Option<Restriction>,
        /// The response to send back to the caller.
        response: ResponseParts,
        /// Extra headers beyond those already in `response.headers`.
        headers: Vec<(String, String)>,
    },
    /// Payment was verified; the upstream application should execute the
    /// request, and settlement should be attempted afterward.
    PaymentVerified {
        /// Metadata for this request.
        metadata: RequestMetadata,
        /// The restriction that was satisfied.
        restriction: Restriction,
        /// The verified payment payload, to be passed to settlement.
        payment_payload: VerifyRequest,
        /// The payment requirements the payload was verified against.
        payment_requirements: SettleRequest,
        /// Extra response headers to attach once the upstream request executes.
        headers: Vec<(String, String)>,
    },
    /// The always-on health check endpoint was hit; no config was consulted.
    HealthCheck {
        /// Metadata for this request.
        metadata: RequestMetadata,
        /// The health check response body/headers.
        response: ResponseParts,
        /// Extra headers beyond those already in `response.headers`.
        headers: Vec<(String, String)>,
    },
}

impl ProcessRequestResult {
    /// Returns the metadata carried by this result.
    #[must_use]
    pub const fn metadata(&self) -> &RequestMetadata {
        match self {
            Self::NoPaymentRequired { metadata, .. }
            | Self::PaymentError { metadata, .. }
            | Self::PaymentVerified { metadata, .. }
            | Self::HealthCheck { metadata, .. } => metadata,
        }
    }

    /// Returns `true` for the [`ProcessRequestResult::PaymentError`] variant.
    #[must_use]
    pub const fn is_payment_error(&self) -> bool {
        matches!(self, Self::PaymentError { .. })
    }
}

/// Result of [`process_settlement`](../foldgate_http/dispatcher/fn.process_settlement.html).
#[derive(Debug, Clone)]
pub struct ProcessSettleResult {
    /// Whether settlement succeeded.
    pub success: bool,
    /// Machine-readable reason when `success` is `false`.
    pub error_reason: Option<String>,
    /// The `PAYMENT-RESPONSE` header value on success.
    pub payment_response_header: Option<String>,
}

impl ProcessSettleResult {
    /// Builds a failure result with the given reason.
    #[must_use]
    pub fn failure(error_reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error_reason: Some(error_reason.into()),
            payment_response_header: None,
        }
    }

    /// Builds a success result carrying the `PAYMENT-RESPONSE` header value.
    #[must_use]
    pub fn success(payment_response_header: Option<String>) -> Self {
        Self {
            success: true,
            error_reason: None,
            payment_response_header,
        }
    }
}
