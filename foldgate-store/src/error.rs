//! Transport error types for the store and bootstrap clients.

/// Error returned while bootstrapping Redis credentials from the platform.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The HTTP call itself failed (DNS, TLS, timeout, ...).
    #[error("bootstrap request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint responded with a non-2xx status; this is fatal, there is
    /// no retry or fallback credential source.
    #[error("bootstrap endpoint returned status {status}: {body}")]
    NonSuccess {
        /// The response status code.
        status: u16,
        /// The response body, truncated for logging.
        body: String,
    },

    /// The response body did not match the expected `{data: {...}}` envelope.
    #[error("malformed bootstrap response: {0}")]
    Malformed(#[from] serde_json::Error),
}
