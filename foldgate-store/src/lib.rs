#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! The concrete remote config store consumed by [`foldgate_core::CachedView`].
//!
//! `foldgate-core` only knows the [`foldgate_core::ConfigStore`] trait; this
//! crate supplies the one implementation a worker actually talks to: a REST
//! client against Upstash's Redis-compatible REST API, plus the bootstrap
//! call that mints the credentials for that client from the platform's
//! config-issuance endpoint.
//!
//! # Modules
//!
//! - [`rest_store`] - tenant-prefixed [`foldgate_core::ConfigStore`] over Upstash's REST API
//! - [`bootstrap`] - fetches Redis credentials from `{API_BASE_URL}/v1/config/redis`
//! - [`error`] - transport error types

pub mod bootstrap;
pub mod error;
pub mod rest_store;

pub use bootstrap::{RedisCredentials, bootstrap_credentials};
pub use error::BootstrapError;
pub use rest_store::UpstashConfigStore;
