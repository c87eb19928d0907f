//! Search requests.
//!
//! A [`SearchRequest`] binds a query to an index together with paging,
//! highlighting, and facet options. Requests are built with
//! [`SearchRequestBuilder`] and cannot be changed afterwards; every call
//! builds its own request, so nothing is shared between concurrent callers.
//!
//! ```rust
//! use quarry_fts::query::MatchQuery;
//! use quarry_fts::request::{FacetSpec, SearchRequest};
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
//! assert_eq!(request.limit(), 10);
//! # Ok::<(), quarry_core::Error>(())
//! ```
//!
//! Setting the same option twice keeps the last value.

use std::collections::BTreeMap;
use std::time::Duration;

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::query::QueryNode;

/// Page size used when no limit is set.
pub const DEFAULT_LIMIT: usize = 10;

/// Term-frequency facet over a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Field whose values are counted.
    pub field: String,
    /// Maximum number of distinct values to return (must be > 0).
    pub size: usize,
}

impl FacetSpec {
    /// Count the `size` most frequent values of `field`.
    pub fn term(field: impl Into<String>, size: usize) -> Self {
        Self {
            field: field.into(),
            size,
        }
    }
}

/// Markup used to highlight matched terms in fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStyle {
    /// The engine's configured default (`<mark>` tags on stock installs).
    #[default]
    Default,
    /// HTML `<mark>` tags.
    Html,
    /// ANSI terminal escapes.
    Ansi,
}

impl HighlightStyle {
    /// Wire name, or `None` for the engine default.
    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            HighlightStyle::Default => None,
            HighlightStyle::Html => Some("html"),
            HighlightStyle::Ansi => Some("ansi"),
        }
    }
}

/// Highlighting options. Present on a request only when highlighting was
/// asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlight {
    /// Fragment markup.
    pub style: HighlightStyle,
    /// Fields to highlight; empty means every matched field.
    pub fields: Vec<String>,
}

/// An immutable search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    index_name: String,
    query: QueryNode,
    limit: usize,
    skip: usize,
    highlight: Option<Highlight>,
    facets: BTreeMap<String, FacetSpec>,
    fields: Vec<String>,
    sort: Vec<String>,
    explain: bool,
    server_timeout: Option<Duration>,
}

impl SearchRequest {
    /// Start building a request for `query` against `index_name`.
    pub fn builder(
        index_name: impl Into<String>,
        query: impl Into<QueryNode>,
    ) -> SearchRequestBuilder {
        SearchRequestBuilder {
            index_name: index_name.into(),
            query: query.into(),
            limit: None,
            skip: None,
            highlight: None,
            facets: BTreeMap::new(),
            fields: Vec::new(),
            sort: Vec::new(),
            explain: false,
            server_timeout: None,
        }
    }

    /// Index the request targets.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// The query to run.
    pub fn query(&self) -> &QueryNode {
        &self.query
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of leading rows to skip.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Whether matched fields are returned as highlighted fragments.
    pub fn is_highlighted(&self) -> bool {
        self.highlight.is_some()
    }

    /// Highlight settings, when highlighting was requested.
    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Requested facets by name.
    pub fn facets(&self) -> &BTreeMap<String, FacetSpec> {
        &self.facets
    }

    /// Stored fields requested in each row.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Sort keys in priority order.
    pub fn sort(&self) -> &[String] {
        &self.sort
    }

    /// Whether score explanations were requested.
    pub fn explain(&self) -> bool {
        self.explain
    }

    /// Engine-side execution deadline.
    pub fn server_timeout(&self) -> Option<Duration> {
        self.server_timeout
    }
}

/// Builder for [`SearchRequest`].
///
/// Modifiers never fail; [`build`](Self::build) validates everything at
/// once.
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    index_name: String,
    query: QueryNode,
    limit: Option<i64>,
    skip: Option<i64>,
    highlight: Option<Highlight>,
    facets: BTreeMap<String, FacetSpec>,
    fields: Vec<String>,
    sort: Vec<String>,
    explain: bool,
    server_timeout: Option<Duration>,
}

impl SearchRequestBuilder {
    /// Maximum number of rows. Negative values are rejected by `build`.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Offset into the ranked rows. Negative values are rejected by `build`.
    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Return highlighted fragments for matched fields.
    pub fn highlight(mut self) -> Self {
        self.highlight.get_or_insert_with(Highlight::default);
        self
    }

    /// Highlight with a specific markup style. Implies [`highlight`](Self::highlight).
    pub fn highlight_style(mut self, style: HighlightStyle) -> Self {
        self.highlight.get_or_insert_with(Highlight::default).style = style;
        self
    }

    /// Highlight only these fields. Implies [`highlight`](Self::highlight).
    pub fn highlight_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight.get_or_insert_with(Highlight::default).fields =
            fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add a facet. A second facet with the same name replaces the first.
    pub fn facet(mut self, name: impl Into<String>, spec: FacetSpec) -> Self {
        self.facets.insert(name.into(), spec);
        self
    }

    /// Stored fields to include in each row (`"*"` for all).
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sort keys in engine syntax, e.g. `"-_score"` or `"name"`.
    pub fn sort<I, S>(mut self, sort: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    /// Ask the engine for a score explanation on every row.
    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Deadline the engine applies to query execution.
    pub fn server_timeout(mut self, timeout: Duration) -> Self {
        self.server_timeout = Some(timeout);
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the index name is empty, the limit
    /// or skip is negative, or a facet has size zero or an empty field.
    pub fn build(self) -> Result<SearchRequest> {
        if self.index_name.trim().is_empty() {
            return Err(Error::invalid_query("index name must not be empty"));
        }
        let limit = match self.limit {
            Some(n) => non_negative("limit", n)?,
            None => DEFAULT_LIMIT,
        };
        let skip = match self.skip {
            Some(n) => non_negative("skip", n)?,
            None => 0,
        };
        for (name, spec) in &self.facets {
            if spec.size == 0 {
                return Err(Error::invalid_query(format!(
                    "facet '{name}' must have a size greater than zero"
                )));
            }
            if spec.field.is_empty() {
                return Err(Error::invalid_query(format!(
                    "facet '{name}' requires a field"
                )));
            }
        }

        Ok(SearchRequest {
            index_name: self.index_name,
            query: self.query,
            limit,
            skip,
            highlight: self.highlight,
            facets: self.facets,
            fields: self.fields,
            sort: self.sort,
            explain: self.explain,
            server_timeout: self.server_timeout,
        })
    }
}

fn non_negative(what: &str, n: i64) -> Result<usize> {
    usize::try_from(n)
        .map_err(|_| Error::invalid_query(format!("{what} must not be negative, got {n}")))
}

// ============================================================================
// Tests
// ============================================================================
