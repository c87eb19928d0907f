//! Search client trait and the in-memory client.
//!
//! This module defines the `SearchClient` trait through which a request
//! reaches a search service, plus `StaticSearchClient`, which answers from
//! canned engine responses.
//!
//! # Clients
//!
//! - `HttpSearchClient` (in `quarry-client`): talks to a live cluster
//! - `StaticSearchClient`: canned responses per index, for tests and demos
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_fts::{SearchClient, SearchRequest, query::MatchQuery};
//!
//! async fn first_hit(client: &dyn SearchClient) -> quarry_core::Result<Option<String>> {
//!     let request = SearchRequest::builder("travel-sample-index-unstored", MatchQuery::new("route"))
//!         .limit(1)
//!         .build()?;
//!     let result = client.execute(&request).await?;
//!     Ok(result.rows.first().map(|row| row.id.clone()))
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use quarry_core::{Error, Result};
use serde_json::Value;

use crate::request::SearchRequest;
use crate::result::SearchResult;
use crate::wire;

/// Abstract search client.
///
/// Implementations own the transport: connection pooling, credentials,
/// wire encoding, and any retry policy. Errors they raise
/// ([`Error::Connection`], [`Error::Auth`], [`Error::IndexNotFound`],
/// [`Error::QueryExecution`]) reach the caller unchanged.
///
/// # Async
///
/// `execute` is async so callers can fan several searches out on one
/// runtime. Dropping the future cancels the call.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Execute a request and decode the response.
    ///
    /// Rows come back in the engine's relevance order.
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResult>;

    /// Get the client name for diagnostics.
    fn name(&self) -> &str;

    /// Check if the client is ready to handle queries.
    fn is_ready(&self) -> bool {
        true
    }
}

/// A failure scripted into a [`StaticSearchClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Fail as if the service were unreachable.
    Connection(String),
    /// Fail as if the credentials were rejected.
    Auth(String),
    /// Fail as if the engine rejected the query.
    QueryExecution(String),
}

impl ScriptedFailure {
    fn to_error(&self) -> Error {
        match self {
            ScriptedFailure::Connection(msg) => Error::connection(msg.clone()),
            ScriptedFailure::Auth(msg) => Error::auth(msg.clone()),
            ScriptedFailure::QueryExecution(msg) => Error::query_execution(msg.clone()),
        }
    }
}

/// In-memory search client serving canned engine responses.
///
/// Each request is encoded to the wire format, recorded, and answered with
/// the response registered for its index (decoded like a live response).
/// Unknown indexes fail with [`Error::IndexNotFound`].
#[derive(Default)]
pub struct StaticSearchClient {
    responses: HashMap<String, Value>,
    failures: HashMap<String, ScriptedFailure>,
    sent: Mutex<Vec<Value>>,
}

impl StaticSearchClient {
    /// Create a client that knows no indexes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests against `index` with `response` (engine JSON).
    pub fn with_index(mut self, index: impl Into<String>, response: Value) -> Self {
        self.responses.insert(index.into(), response);
        self
    }

    /// Fail every request against `index`.
    pub fn with_failure(mut self, index: impl Into<String>, failure: ScriptedFailure) -> Self {
        self.failures.insert(index.into(), failure);
        self
    }

    /// Request bodies sent so far, oldest first.
    pub fn sent(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SearchClient for StaticSearchClient {
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResult> {
        let body = wire::encode_request(request);
        log::debug!(
            "StaticSearchClient: index='{}', query={}, limit={}",
            request.index_name(),
            request.query().kind(),
            request.limit()
        );
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(body);

        if let Some(failure) = self.failures.get(request.index_name()) {
            return Err(failure.to_error());
        }
        let response = self
            .responses
            .get(request.index_name())
            .ok_or_else(|| Error::index_not_found(request.index_name()))?;

        SearchResult::decode(response, request)
    }

    fn name(&self) -> &str {
        "static"
    }
}

impl std::fmt::Debug for StaticSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSearchClient")
            .field("indexes", &self.responses.keys().collect::<Vec<_>>())
            .field("failures", &self.failures.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
