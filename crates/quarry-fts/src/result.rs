//! Search results and response decoding.
//!
//! [`SearchResult::decode`] turns the engine's JSON response into typed
//! rows and facets. Row decoding is strict: a row without a usable
//! document id fails the whole call with an error naming the row. Facet
//! decoding is lenient: a facet kind Quarry does not model (numeric or date
//! ranges, or anything a newer engine adds) is skipped with a warning.

use std::collections::BTreeMap;
use std::time::Duration;

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::SearchRequest;

/// A single ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRow {
    /// Document identifier.
    pub id: String,

    /// Relevance score (higher is better).
    pub score: f64,

    /// Index partition that produced the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Stored field values, keyed by field path. Empty unless the index
    /// stores the fields; whether unhighlighted stored fields come back is
    /// engine-dependent.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,

    /// Highlighted snippets, keyed by field path, exactly as the engine
    /// returned them. Empty unless highlighting was requested.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fragments: BTreeMap<String, Vec<String>>,

    /// Score explanation, when the request asked for one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Value>,
}

/// One value of a term facet with its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    /// The term as indexed.
    pub value: String,
    /// Number of matching documents carrying the term.
    pub count: u64,
}

/// Aggregated term frequencies for one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResult {
    /// Field the facet counted.
    pub field: String,
    /// Number of field values counted.
    pub total: u64,
    /// Matching documents without a value for the field.
    pub missing: u64,
    /// Values counted but not listed in `terms`.
    pub other: u64,
    /// Most frequent values, count descending.
    pub terms: Vec<TermCount>,
}

/// Query execution statistics reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchMetrics {
    /// Total matching documents (may exceed the number of rows).
    pub total_hits: u64,
    /// Highest row score, `0.0` when nothing matched.
    pub max_score: f64,
    /// Server-side execution time.
    pub took: Duration,
}

/// A decoded search response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Rows in the order the engine ranked them.
    pub rows: Vec<SearchRow>,
    /// Facets by the name they were requested under.
    pub facets: BTreeMap<String, FacetResult>,
    /// Hit count and timing.
    pub metrics: SearchMetrics,
}

impl SearchResult {
    /// Decode an engine response for `request`.
    ///
    /// The request supplies the facet sizes used to truncate term lists.
    ///
    /// # Errors
    ///
    /// - [`Error::Decode`] if the response is not an object, has no row
    ///   list, or a row is malformed (the error names the row index).
    /// - [`Error::QueryExecution`] if the engine reports failed partitions.
    pub fn decode(response: &Value, request: &SearchRequest) -> Result<SearchResult> {
        let obj = response
            .as_object()
            .ok_or_else(|| Error::decode("response is not a JSON object"))?;

        check_status(obj)?;

        let rows = match obj.get("hits").or_else(|| obj.get("rows")) {
            Some(Value::Array(hits)) => hits
                .iter()
                .enumerate()
                .map(|(i, hit)| decode_row(i, hit))
                .collect::<Result<Vec<_>>>()?,
            Some(Value::Null) => Vec::new(),
            Some(_) => return Err(Error::decode("'hits' is not an array")),
            None => return Err(Error::decode("response has no 'hits'")),
        };

        let facets = match obj.get("facets") {
            Some(Value::Object(facets)) => decode_facets(facets, request),
            _ => BTreeMap::new(),
        };

        let metrics = SearchMetrics {
            total_hits: obj
                .get("total_hits")
                .and_then(Value::as_u64)
                .unwrap_or(rows.len() as u64),
            max_score: obj.get("max_score").and_then(Value::as_f64).unwrap_or(0.0),
            took: Duration::from_nanos(obj.get("took").and_then(Value::as_u64).unwrap_or(0)),
        };

        log::debug!(
            "Decoded {} rows, {} facets ({} total hits) for index '{}'",
            rows.len(),
            facets.len(),
            metrics.total_hits,
            request.index_name()
        );

        Ok(SearchResult {
            rows,
            facets,
            metrics,
        })
    }

    /// True when the engine returned no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identifiers of the returned rows, in rank order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.id.as_str())
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a SearchRow;
    type IntoIter = std::slice::Iter<'a, SearchRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Fail if the engine reports that some partitions errored. A result
/// missing those partitions' rows is not returned.
fn check_status(obj: &Map<String, Value>) -> Result<()> {
    let Some(status) = obj.get("status").and_then(Value::as_object) else {
        return Ok(());
    };
    let failed = status.get("failed").and_then(Value::as_u64).unwrap_or(0);
    if failed == 0 {
        return Ok(());
    }

    let messages: Vec<String> = match status.get("errors") {
        Some(Value::Object(errors)) => errors
            .iter()
            .map(|(partition, err)| format!("{partition}: {}", value_text(err)))
            .collect(),
        Some(Value::Array(errors)) => errors.iter().map(value_text).collect(),
        _ => Vec::new(),
    };
    let detail = if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    };
    Err(Error::query_execution(format!(
        "{failed} index partition(s) failed{detail}"
    )))
}

fn decode_row(i: usize, hit: &Value) -> Result<SearchRow> {
    let obj = hit
        .as_object()
        .ok_or_else(|| Error::decode_row(i, "row is not a JSON object"))?;

    let id = match obj.get("id").or_else(|| obj.get("documentId")) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::String(_)) => return Err(Error::decode_row(i, "document id is empty")),
        Some(other) => {
            return Err(Error::decode_row(
                i,
                format!("document id is not a string: {other}"),
            ));
        }
        None => return Err(Error::decode_row(i, "missing document id")),
    };

    let score = match obj.get("score") {
        None | Some(Value::Null) => 0.0,
        Some(v) => v
            .as_f64()
            .ok_or_else(|| Error::decode_row(i, format!("score is not a number: {v}")))?,
    };

    let index = obj.get("index").and_then(Value::as_str).map(str::to_string);

    let fields = match obj.get("fields") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(fields)) => fields.clone(),
        Some(_) => return Err(Error::decode_row(i, "'fields' is not an object")),
    };

    let fragments = match obj.get("fragments") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(fragments)) => decode_fragments(i, fragments)?,
        Some(_) => return Err(Error::decode_row(i, "'fragments' is not an object")),
    };

    let explanation = obj.get("explanation").filter(|v| !v.is_null()).cloned();

    Ok(SearchRow {
        id,
        score,
        index,
        fields,
        fragments,
        explanation,
    })
}

fn decode_fragments(
    i: usize,
    fragments: &Map<String, Value>,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut out = BTreeMap::new();
    for (field, snippets) in fragments {
        let snippets = snippets.as_array().ok_or_else(|| {
            Error::decode_row(i, format!("fragments for '{field}' are not an array"))
        })?;
        let snippets = snippets
            .iter()
            .map(|s| {
                s.as_str().map(str::to_string).ok_or_else(|| {
                    Error::decode_row(i, format!("fragment for '{field}' is not a string"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        out.insert(field.clone(), snippets);
    }
    Ok(out)
}

fn decode_facets(
    facets: &Map<String, Value>,
    request: &SearchRequest,
) -> BTreeMap<String, FacetResult> {
    let mut out = BTreeMap::new();
    for (name, facet) in facets {
        let size = request.facets().get(name).map(|spec| spec.size);
        match decode_term_facet(facet, size) {
            Ok(Some(result)) => {
                out.insert(name.clone(), result);
            }
            Ok(None) => {
                log::warn!("Skipping facet '{name}': unsupported facet kind");
            }
            Err(reason) => {
                log::warn!("Skipping facet '{name}': {reason}");
            }
        }
    }
    out
}

/// `Ok(None)` means the facet is of a kind other than a term facet.
///
/// The engine omits `terms` when a term facet counted nothing, so a
/// requested facet without range keys decodes as an empty term list.
fn decode_term_facet(
    facet: &Value,
    size: Option<usize>,
) -> std::result::Result<Option<FacetResult>, String> {
    let obj = facet.as_object().ok_or("facet is not an object")?;

    let terms: &[Value] = match obj.get("terms") {
        Some(Value::Array(terms)) => terms.as_slice(),
        Some(Value::Null) if !is_range_facet(obj) => &[],
        Some(_) if !is_range_facet(obj) => return Err("'terms' is not an array".into()),
        None if size.is_some() && !is_range_facet(obj) => &[],
        _ => return Ok(None),
    };

    let mut counts = Vec::with_capacity(terms.len());
    for term in terms {
        let value = term
            .get("term")
            .or_else(|| term.get("value"))
            .and_then(Value::as_str)
            .ok_or("term entry has no string value")?;
        let count = term
            .get("count")
            .and_then(Value::as_u64)
            .ok_or("term entry has no count")?;
        counts.push(TermCount {
            value: value.to_string(),
            count,
        });
    }

    // Stable: ties keep the engine's order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(size) = size {
        counts.truncate(size);
    }

    let count_field = |key: &str| obj.get(key).and_then(Value::as_u64).unwrap_or(0);
    Ok(Some(FacetResult {
        field: obj
            .get("field")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        total: count_field("total"),
        missing: count_field("missing"),
        other: count_field("other"),
        terms: counts,
    }))
}

fn is_range_facet(obj: &Map<String, Value>) -> bool {
    obj.contains_key("numeric_ranges") || obj.contains_key("date_ranges")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
