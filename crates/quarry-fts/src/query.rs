//! Query AST.
//!
//! [`QueryNode`] is a closed sum type over the query kinds the search engine
//! understands. Each kind has its own struct carrying its parameters;
//! optional parameters are set with consuming builder methods, and kinds
//! with structural constraints validate them in a fallible constructor.
//!
//! ```rust
//! use quarry_fts::query::{ConjunctionQuery, MatchQuery, QueryNode};
//!
//! let query: QueryNode = ConjunctionQuery::new(vec![
//!     MatchQuery::new("La Rue Saint Denis!!").field("reviews.content").into(),
//!     MatchQuery::new("boutique").field("description").into(),
//! ])?
//! .into();
//! # Ok::<(), quarry_core::Error>(())
//! ```
//!
//! Nothing here touches the network or checks that a field exists in an
//! index; that is the engine's job.

use quarry_core::{Error, Result};

/// A full-text search query.
///
/// Equality is structural and keeps the query kind: a `Match` on `"sushi"`
/// is not equal to a `Term` on `"sushi"`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Analyzed free-text match.
    Match(MatchQuery),
    /// Analyzed phrase match.
    MatchPhrase(MatchPhraseQuery),
    /// Unanalyzed exact or fuzzy token match.
    Term(TermQuery),
    /// Unanalyzed sequence of consecutive terms.
    Phrase(PhraseQuery),
    /// Restricts matches to a set of document identifiers.
    DocId(DocIdQuery),
    /// Logical AND of clauses.
    Conjunction(ConjunctionQuery),
    /// Logical OR of clauses with a minimum-match threshold.
    Disjunction(DisjunctionQuery),
    /// Engine-parsed `field:value` expression.
    QueryString(QueryStringQuery),
    /// Glob pattern (`*`, `?`) over unanalyzed content.
    Wildcard(WildcardQuery),
    /// Numeric bounds on a field.
    NumericRange(NumericRangeQuery),
    /// Regular expression over unanalyzed content.
    Regexp(RegexpQuery),
    /// Unanalyzed prefix match.
    Prefix(PrefixQuery),
    /// Must / should / must-not combination.
    Boolean(BooleanQuery),
    /// Matches every document.
    MatchAll,
    /// Matches no document.
    MatchNone,
    /// Another query with its score multiplied by a boost factor.
    Boosted(BoostedQuery),
}

impl QueryNode {
    /// Multiply this query's score by `boost`.
    ///
    /// Boosting an already boosted query replaces the factor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] unless `boost` is finite and positive.
    pub fn boosted(self, boost: f64) -> Result<QueryNode> {
        if !boost.is_finite() || boost <= 0.0 {
            return Err(Error::invalid_query(format!(
                "boost must be a positive finite number, got {boost}"
            )));
        }
        let inner = match self {
            QueryNode::Boosted(b) => b.inner,
            other => Box::new(other),
        };
        Ok(QueryNode::Boosted(BoostedQuery { inner, boost }))
    }

    /// Short name of the query kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryNode::Match(_) => "match",
            QueryNode::MatchPhrase(_) => "match_phrase",
            QueryNode::Term(_) => "term",
            QueryNode::Phrase(_) => "phrase",
            QueryNode::DocId(_) => "docid",
            QueryNode::Conjunction(_) => "conjunction",
            QueryNode::Disjunction(_) => "disjunction",
            QueryNode::QueryString(_) => "query_string",
            QueryNode::Wildcard(_) => "wildcard",
            QueryNode::NumericRange(_) => "numeric_range",
            QueryNode::Regexp(_) => "regexp",
            QueryNode::Prefix(_) => "prefix",
            QueryNode::Boolean(_) => "boolean",
            QueryNode::MatchAll => "match_all",
            QueryNode::MatchNone => "match_none",
            QueryNode::Boosted(b) => b.inner.kind(),
        }
    }
}

// ============================================================================
// Analyzed queries
// ============================================================================

/// Analyzed free-text match against one field or the default fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    text: String,
    field: Option<String>,
    analyzer: Option<String>,
    fuzziness: Option<u8>,
    prefix_length: Option<u32>,
}

impl MatchQuery {
    /// Create a match query for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            field: None,
            analyzer: None,
            fuzziness: None,
            prefix_length: None,
        }
    }

    /// Restrict the match to one field (dotted paths address nested fields).
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Analyze the text with a named analyzer instead of the field's default.
    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Maximum edit distance tolerated per token.
    pub fn fuzziness(mut self, fuzziness: u8) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    /// Number of leading characters that must match exactly when fuzzy.
    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    /// The text to match.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Analyzer overriding the field's default, if any.
    pub fn analyzer_name(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }

    /// Configured edit distance, if any.
    pub fn fuzziness_value(&self) -> Option<u8> {
        self.fuzziness
    }

    /// Configured exact-prefix length, if any.
    pub fn prefix_length_value(&self) -> Option<u32> {
        self.prefix_length
    }
}

/// Analyzed phrase match: the phrase's tokens must appear consecutively.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhraseQuery {
    phrase: String,
    field: Option<String>,
    analyzer: Option<String>,
}

impl MatchPhraseQuery {
    /// Create a phrase match for `phrase`.
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            field: None,
            analyzer: None,
        }
    }

    /// Restrict the query to one field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Analyze the phrase with a named analyzer.
    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// The phrase to match.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Analyzer overriding the field's default, if any.
    pub fn analyzer_name(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }
}

/// Opaque `field:value` expression parsed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStringQuery {
    expression: String,
}

impl QueryStringQuery {
    /// Wrap a query-string expression such as `country:France +type:hotel`.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// The raw expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

// ============================================================================
// Unanalyzed queries
// ============================================================================

/// Exact (or fuzzy) match on an already-tokenized term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    term: String,
    field: Option<String>,
    fuzziness: Option<u8>,
    prefix_length: Option<u32>,
}

impl TermQuery {
    /// Create a term query for `term`.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            field: None,
            fuzziness: None,
            prefix_length: None,
        }
    }

    /// Restrict the query to one field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Maximum edit distance; `0` asks for exact matches only.
    pub fn fuzziness(mut self, fuzziness: u8) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    /// Number of leading characters that must match exactly when fuzzy.
    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    /// The term to match.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Configured edit distance, if any.
    pub fn fuzziness_value(&self) -> Option<u8> {
        self.fuzziness
    }

    /// Configured exact-prefix length, if any.
    pub fn prefix_length_value(&self) -> Option<u32> {
        self.prefix_length
    }
}

/// Terms that must appear consecutively, in order, with no analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseQuery {
    terms: Vec<String>,
    field: Option<String>,
}

impl PhraseQuery {
    /// Create a phrase query from an ordered list of terms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if `terms` is empty.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(Error::invalid_query("phrase query requires at least one term"));
        }
        Ok(Self { terms, field: None })
    }

    /// Restrict the query to one field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Terms in phrase order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

/// Glob-style pattern match.
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardQuery {
    pattern: String,
    field: Option<String>,
}

impl WildcardQuery {
    /// Create a query for `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            field: None,
        }
    }

    /// Restrict the query to one field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The pattern as sent to the engine.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

/// Regular-expression match. The pattern is compiled by the engine, so a
/// malformed expression surfaces as a query-execution error.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexpQuery {
    pattern: String,
    field: Option<String>,
}

impl RegexpQuery {
    /// Create a query for `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            field: None,
        }
    }

    /// Restrict the query to one field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The pattern as sent to the engine.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

/// Prefix match.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixQuery {
    prefix: String,
    field: Option<String>,
}

impl PrefixQuery {
    /// Create a prefix query for `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            field: None,
        }
    }

    /// Restrict the query to one field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The prefix to match.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Field the query is restricted to, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

/// Matches documents whose identifier is in a set.
#[derive(Debug, Clone, PartialEq)]
pub struct DocIdQuery {
    ids: Vec<String>,
}

impl DocIdQuery {
    /// Create a document-id query.
    ///
    /// Duplicate ids are dropped; the first occurrence keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if no id is given.
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(Error::invalid_query("docid query requires at least one document id"));
        }
        Ok(Self { ids: unique })
    }

    /// Document ids, without duplicates.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

// ============================================================================
// Numeric range
// ============================================================================

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// Bound value.
    pub value: f64,
    /// Whether the value itself is in range.
    pub inclusive: bool,
}

/// Numeric bounds on a field. At least one bound is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRangeQuery {
    field: String,
    min: Option<Bound>,
    max: Option<Bound>,
}

impl NumericRangeQuery {
    /// Start building a range over `field`.
    pub fn builder(field: impl Into<String>) -> NumericRangeQueryBuilder {
        NumericRangeQueryBuilder {
            field: field.into(),
            min: None,
            max: None,
        }
    }

    /// Field the range applies to.
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// Lower bound, if any.
    pub fn min(&self) -> Option<Bound> {
        self.min
    }

    /// Upper bound, if any.
    pub fn max(&self) -> Option<Bound> {
        self.max
    }
}

/// Builder for [`NumericRangeQuery`].
///
/// By default the lower bound is inclusive and the upper bound exclusive.
#[derive(Debug, Clone)]
pub struct NumericRangeQueryBuilder {
    field: String,
    min: Option<Bound>,
    max: Option<Bound>,
}

impl NumericRangeQueryBuilder {
    /// Inclusive lower bound.
    pub fn min(self, value: f64) -> Self {
        self.min_bound(value, true)
    }

    /// Exclusive upper bound.
    pub fn max(self, value: f64) -> Self {
        self.max_bound(value, false)
    }

    /// Lower bound with explicit inclusivity.
    pub fn min_bound(mut self, value: f64, inclusive: bool) -> Self {
        self.min = Some(Bound { value, inclusive });
        self
    }

    /// Upper bound with explicit inclusivity.
    pub fn max_bound(mut self, value: f64, inclusive: bool) -> Self {
        self.max = Some(Bound { value, inclusive });
        self
    }

    /// Validate the range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the field is empty, no bound was
    /// supplied, a bound is not finite, or `min > max`.
    pub fn build(self) -> Result<NumericRangeQuery> {
        if self.field.is_empty() {
            return Err(Error::invalid_query("numeric range requires a field"));
        }
        if self.min.is_none() && self.max.is_none() {
            return Err(Error::invalid_query(format!(
                "numeric range on '{}' requires at least one of min or max",
                self.field
            )));
        }
        for bound in self.min.iter().chain(self.max.iter()) {
            if !bound.value.is_finite() {
                return Err(Error::invalid_query(format!(
                    "numeric range on '{}' has a non-finite bound",
                    self.field
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min.value > max.value
        {
            return Err(Error::invalid_query(format!(
                "numeric range on '{}' has min {} greater than max {}",
                self.field, min.value, max.value
            )));
        }
        Ok(NumericRangeQuery {
            field: self.field,
            min: self.min,
            max: self.max,
        })
    }
}

// ============================================================================
// Compound queries
// ============================================================================

/// Logical AND: every clause must match.
#[derive(Debug, Clone, PartialEq)]
pub struct ConjunctionQuery {
    clauses: Vec<QueryNode>,
}

impl ConjunctionQuery {
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if `clauses` is empty.
    pub fn new(clauses: Vec<QueryNode>) -> Result<Self> {
        if clauses.is_empty() {
            return Err(Error::invalid_query("conjunction requires at least one clause"));
        }
        Ok(Self { clauses })
    }

    /// Clauses in the order they were given.
    pub fn clauses(&self) -> &[QueryNode] {
        &self.clauses
    }
}

/// Logical OR: at least `min` clauses must match.
#[derive(Debug, Clone, PartialEq)]
pub struct DisjunctionQuery {
    clauses: Vec<QueryNode>,
    min: usize,
}

impl DisjunctionQuery {
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] unless `1 <= min <= clauses.len()`.
    pub fn new(clauses: Vec<QueryNode>, min: usize) -> Result<Self> {
        if min == 0 || min > clauses.len() {
            return Err(Error::invalid_query(format!(
                "disjunction min must be between 1 and {} (clause count), got {min}",
                clauses.len()
            )));
        }
        Ok(Self { clauses, min })
    }

    /// Disjunction matching any single clause.
    pub fn any(clauses: Vec<QueryNode>) -> Result<Self> {
        Self::new(clauses, 1)
    }

    /// Clauses in the order they were given.
    pub fn clauses(&self) -> &[QueryNode] {
        &self.clauses
    }

    /// Minimum number of clauses that must match.
    pub fn min(&self) -> usize {
        self.min
    }
}

/// Must / should / must-not combination.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanQuery {
    must: Option<ConjunctionQuery>,
    should: Option<DisjunctionQuery>,
    must_not: Option<DisjunctionQuery>,
}

impl BooleanQuery {
    /// Start building a boolean query.
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::default()
    }

    /// Clauses that all have to match.
    pub fn must(&self) -> Option<&ConjunctionQuery> {
        self.must.as_ref()
    }

    /// Optional clauses that raise the score.
    pub fn should(&self) -> Option<&DisjunctionQuery> {
        self.should.as_ref()
    }

    /// Clauses that exclude a document.
    pub fn must_not(&self) -> Option<&DisjunctionQuery> {
        self.must_not.as_ref()
    }
}

/// Builder for [`BooleanQuery`].
#[derive(Debug, Clone, Default)]
pub struct BooleanQueryBuilder {
    must: Option<ConjunctionQuery>,
    should: Option<DisjunctionQuery>,
    must_not: Option<DisjunctionQuery>,
}

impl BooleanQueryBuilder {
    /// Clauses that all have to match.
    pub fn must(mut self, must: ConjunctionQuery) -> Self {
        self.must = Some(must);
        self
    }

    /// Clauses of which at least the disjunction's `min` have to match.
    pub fn should(mut self, should: DisjunctionQuery) -> Self {
        self.should = Some(should);
        self
    }

    /// Documents matching any of these clauses are excluded.
    pub fn must_not(mut self, must_not: DisjunctionQuery) -> Self {
        self.must_not = Some(must_not);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if no part was set.
    pub fn build(self) -> Result<BooleanQuery> {
        if self.must.is_none() && self.should.is_none() && self.must_not.is_none() {
            return Err(Error::invalid_query(
                "boolean query requires at least one of must, should, or must_not",
            ));
        }
        Ok(BooleanQuery {
            must: self.must,
            should: self.should,
            must_not: self.must_not,
        })
    }
}

/// A query with a score multiplier. Built with [`QueryNode::boosted`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedQuery {
    inner: Box<QueryNode>,
    boost: f64,
}

impl BoostedQuery {
    /// The boosted query.
    pub fn inner(&self) -> &QueryNode {
        &self.inner
    }

    /// Score multiplier, always positive and finite.
    pub fn boost(&self) -> f64 {
        self.boost
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! into_query_node {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for QueryNode {
                fn from(query: $ty) -> Self {
                    QueryNode::$variant(query)
                }
            }
        )*
    };
}

into_query_node! {
    MatchQuery => Match,
    MatchPhraseQuery => MatchPhrase,
    TermQuery => Term,
    PhraseQuery => Phrase,
    DocIdQuery => DocId,
    ConjunctionQuery => Conjunction,
    DisjunctionQuery => Disjunction,
    QueryStringQuery => QueryString,
    WildcardQuery => Wildcard,
    NumericRangeQuery => NumericRange,
    RegexpQuery => Regexp,
    PrefixQuery => Prefix,
    BooleanQuery => Boolean,
}

// ============================================================================
// Tests
// ============================================================================
