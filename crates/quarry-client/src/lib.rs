//! # quarry-client
//!
//! HTTP implementation of [`quarry_fts::SearchClient`].
//!
//! This crate provides the production transport for Quarry:
//! - [`HttpSearchClient`]: posts encoded requests to a cluster's search
//!   service and decodes the responses
//! - [`ClientConfig`]: endpoint, credentials, and timeouts, loadable from
//!   TOML and overridable from the environment
//!
//! ```rust,ignore
//! use quarry_client::{ClientConfig, HttpSearchClient};
//! use quarry_fts::{SearchClient, SearchRequest, query::MatchQuery};
//!
//! let mut config = ClientConfig::load("quarry.toml")?;
//! config.apply_env();
//! let client = HttpSearchClient::new(config)?;
//!
//! let request = SearchRequest::builder("travel-sample-index-unstored", MatchQuery::new("route"))
//!     .build()?;
//! let result = client.execute(&request).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;

pub use client::HttpSearchClient;
pub use config::ClientConfig;
