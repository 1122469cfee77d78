//! Per-request metadata stamped onto every result and telemetry event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable metadata created once at the start of a request and carried
/// unchanged through every downstream result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    /// Protocol/core version string, echoed in error bodies and the health check.
    pub version: String,
    /// A fresh UUIDv4 generated for this request.
    pub request_id: Uuid,
    /// Request start time, ISO-8601 UTC.
    pub timestamp: DateTime<Utc>,
}

impl RequestMetadata {
    /// Builds fresh metadata for an incoming request.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }
}
