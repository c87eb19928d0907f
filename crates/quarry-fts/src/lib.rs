//! Typed full-text search for Quarry.
//!
//! This crate models the client side of a full-text search engine: a
//! closed query AST, an immutable request builder, the engine's JSON wire
//! format, a decoded result model, and the `SearchClient` trait behind which
//! the transport lives. It never tokenizes, scores, or indexes anything
//! itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      quarry-fts                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  QueryNode (match, phrase, term, docid, compound, range…)   │
//! │  SearchRequest / SearchRequestBuilder (limit, facets, …)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  wire::encode_request → engine JSON                         │
//! │  SearchResult::decode ← engine JSON (rows, facets, metrics) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchClient trait                                         │
//! │  ├── StaticSearchClient (canned responses)                  │
//! │  └── HttpSearchClient (quarry-client crate)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_fts::{FacetSpec, SearchClient, SearchRequest, query::MatchQuery};
//!
//! let request = SearchRequest::builder(
//!     "travel-sample-index-stored",
//!     MatchQuery::new("La Rue Saint Denis!!").field("reviews.content"),
//! )
//! .limit(10)
//! .highlight()
//! .facet("Countries Referenced", FacetSpec::term("country", 5))
//! .build()?;
//!
//! let result = client.execute(&request).await?;
//! for row in &result {
//!     println!("{} ({:.3})", row.id, row.score);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod query;
pub mod request;
pub mod result;
pub mod wire;

#[cfg(test)]
mod proptests;

// Re-exports
pub use backend::{ScriptedFailure, SearchClient, StaticSearchClient};
pub use query::QueryNode;
pub use request::{FacetSpec, HighlightStyle, SearchRequest, SearchRequestBuilder};
pub use result::{FacetResult, SearchMetrics, SearchResult, SearchRow, TermCount};
