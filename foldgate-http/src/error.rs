//! Shared error types for the dispatcher, facilitator client, and worker bootstrap.

/// Error surfaced from the top-level dispatcher boundary.
///
/// The dispatcher is fail-open: `process_request` itself never returns this
/// to a framework adapter (every branch resolves to a
/// `ProcessRequestResult`), but internal helpers use it to short-circuit
/// before the outer catch site converts it to a pass-through.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The cached configuration layer reported a store failure or a
    /// malformed payload. The caller should report and fall through to
    /// `no-payment-required`.
    #[error("config error: {0}")]
    Config(#[from] foldgate_core::ConfigError),
}

/// Error returned by [`crate::facilitator_client::HttpFacilitatorClient`]'s
/// internal transport calls.
///
/// Never escapes to a caller of [`foldgate_core::Facilitator`]: both
/// `verify` and `settle` catch this at the boundary and convert it into an
/// `Invalid`/`Error` wire response, so a facilitator outage never bubbles up
/// as an error.
#[derive(Debug, thiserror::Error)]
pub enum FacilitatorClientError {
    /// The HTTP call itself failed.
    #[error("facilitator request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The facilitator responded but the body didn't match the expected shape.
    #[error("malformed facilitator response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error returned by [`crate::worker::FoldgateWorker::from_options`].
#[derive(Debug, thiserror::Error)]
pub enum WorkerInitError {
    /// Bootstrapping Redis credentials from the platform failed; worker
    /// construction cannot proceed without a config store.
    #[error("worker bootstrap failed: {0}")]
    Bootstrap(#[from] foldgate_store::BootstrapError),
}
