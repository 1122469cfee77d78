#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! The request-decision dispatcher, HTTP resource server wrapper, and axum
//! adapter for the foldgate x402 payment-gating middleware.
//!
//! `foldgate-core` defines the data model and cached configuration views;
//! `foldgate-store` supplies the concrete KV store; `foldgate-mcp` supplies
//! the JSON-RPC sub-pipeline's wire shapes. This crate wires all three
//! together into the actual middleware: [`dispatcher::process_request`] and
//! [`dispatcher::process_settlement`] are the two entry points a framework
//! adapter calls.
//!
//! # Modules
//!
//! - [`request_adapter`] - the `RequestAdapter` capability consumed by the pipeline
//! - [`axum_adapter`] - a concrete `RequestAdapter` over `axum`/`http` types
//! - [`managers`] - the five `CachedView<T>` instances (host config, restrictions, ...)
//! - [`facilitator_client`] - the HTTP facilitator client
//! - [`resource_server`] - route matching, 402 construction
//! - [`http_server_manager`] - the TTL-cached `ResourceServer` build
//! - [`paywall`] - the HTML paywall renderer
//! - [`formatters`] - the API/MCP JSON error formatters
//! - [`telemetry`] - fire-and-forget event/error POSTs
//! - [`dispatcher`] - `process_request` / `process_settlement` state machine
//! - [`worker`] - process-singleton worker construction and bootstrap
//! - [`error`] - shared error types

pub mod axum_adapter;
pub mod dispatcher;
pub mod error;
pub mod facilitator_client;
pub mod formatters;
pub mod http_server_manager;
pub mod managers;
pub mod paywall;
pub mod request_adapter;
pub mod resource_server;
pub mod telemetry;
pub mod worker;

pub use dispatcher::{process_request, process_settlement};
pub use error::DispatchError;
pub use request_adapter::RequestAdapter;
pub use worker::{FoldgateOptions, FoldgateWorker};
