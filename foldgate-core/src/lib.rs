#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the foldgate x402 payment-gating middleware.
//!
//! This crate is transport-agnostic: it defines the request-decision data
//! model, the generic TTL-cached configuration view over a remote key-value
//! store, and the route table that maps operator-defined restrictions onto
//! x402 payment options. HTTP wiring, the MCP sub-pipeline, and the concrete
//! config store live in sibling crates.
//!
//! # Modules
//!
//! - [`cached_view`] - generic TTL-cached deserializer over a [`config_store::ConfigStore`]
//! - [`config_store`] - the abstract remote key-value store interface
//! - [`metadata`] - per-request metadata stamped onto every result
//! - [`host_config`] - host-level configuration (protection mode, MCP endpoint)
//! - [`restriction`] - the tagged web/api/mcp restriction variants
//! - [`payment_method`] - accepted on-chain payment methods
//! - [`bot`] - user-agent allow/deny matching
//! - [`facilitator`] - the facilitator verify/settle trait and wire types
//! - [`routes`] - route table construction and price conversion
//! - [`result`] - the `ProcessRequestResult` outcome type
//! - [`error`] - shared error types

pub mod bot;
pub mod cached_view;
pub mod config_store;
pub mod error;
pub mod facilitator;
pub mod host_config;
pub mod metadata;
pub mod payment_method;
pub mod restriction;
pub mod result;
pub mod routes;

pub use bot::Bot;
pub use cached_view::CachedView;
pub use config_store::ConfigStore;
pub use error::{ConfigError, StoreError};
pub use facilitator::{Facilitator, SettleRequest, SettleResponse, VerifyRequest, VerifyResponse};
pub use host_config::{ApiProtectionMode, HostConfig};
pub use metadata::RequestMetadata;
pub use payment_method::PaymentMethod;
pub use restriction::Restriction;
pub use result::ProcessRequestResult;
pub use routes::{PaymentOption, RouteConfig, RouteTable, price_to_amount};

/// Default TTL, in milliseconds, for every [`cached_view::CachedView`] instance:
/// a 30s freshness window shared by every config key fetched from the store.
pub const CACHE_TTL_MS: u64 = 30_000;

/// Path of the always-on health check endpoint, consulted before any config lookup.
pub const HEALTH_PATH: &str = "/.well-known/foldset";
