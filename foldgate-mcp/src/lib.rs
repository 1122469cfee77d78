#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! The MCP (JSON-RPC) sub-pipeline: request parsing, list-method payment
//! enrichment, and 402 error envelope construction.
//!
//! This crate is pure data-shape plumbing — it knows how to recognize a
//! JSON-RPC request, map a `*/list` method to its paid `*/call`/`*/read`/`*/get`
//! counterpart, and build the 402 error bodies. It does not itself decide
//! whether payment is required or call out to a facilitator; that is
//! `foldgate-http`'s dispatcher, which depends on this crate for the wire
//! shapes.
//!
//! # Modules
//!
//! - [`request`] - JSON-RPC request parsing (`jsonrpc`, `id`, `method`, `params`)
//! - [`list`] - `*/list` → `*/call` method mapping and requirement collection
//! - [`error_envelope`] - the `{jsonrpc, id, error: {code: 402, ...}}` body

pub mod error_envelope;
pub mod list;
pub mod request;

pub use error_envelope::{McpErrorData, McpPaymentMethod, build_error_envelope};
pub use list::{ListAccept, ListRequirement, call_method_for_list, collect_list_requirements};
pub use request::{JsonRpcId, McpRequest};

pub use foldgate_core::routes::build_mcp_route_key as build_route_key;
