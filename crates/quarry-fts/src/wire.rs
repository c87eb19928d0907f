//! Request encoding in the search engine's JSON format.
//!
//! Client implementations call [`encode_request`] to produce the body they
//! send; the query tree is matched exhaustively so a new query kind cannot
//! be added without deciding how it is encoded.

use serde_json::{Map, Value, json};

use crate::query::{
    BooleanQuery, ConjunctionQuery, DisjunctionQuery, NumericRangeQuery, QueryNode,
};
use crate::request::SearchRequest;

/// Encode a full request body.
pub fn encode_request(request: &SearchRequest) -> Value {
    let mut body = Map::new();
    body.insert("query".into(), encode_query(request.query()));
    body.insert("size".into(), json!(request.limit()));
    body.insert("from".into(), json!(request.skip()));
    body.insert("explain".into(), json!(request.explain()));

    if let Some(highlight) = request.highlight() {
        let mut hl = Map::new();
        if let Some(style) = highlight.style.as_wire() {
            hl.insert("style".into(), json!(style));
        }
        if !highlight.fields.is_empty() {
            hl.insert("fields".into(), json!(highlight.fields));
        }
        body.insert("highlight".into(), Value::Object(hl));
    }

    if !request.fields().is_empty() {
        body.insert("fields".into(), json!(request.fields()));
    }

    if !request.sort().is_empty() {
        body.insert("sort".into(), json!(request.sort()));
    }

    if !request.facets().is_empty() {
        let facets: Map<String, Value> = request
            .facets()
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    json!({ "field": spec.field, "size": spec.size }),
                )
            })
            .collect();
        body.insert("facets".into(), Value::Object(facets));
    }

    if let Some(timeout) = request.server_timeout() {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        body.insert("ctl".into(), json!({ "timeout": millis }));
    }

    Value::Object(body)
}

/// Encode a single query node.
pub fn encode_query(query: &QueryNode) -> Value {
    let mut obj = Map::new();
    match query {
        QueryNode::Match(q) => {
            obj.insert("match".into(), json!(q.text()));
            put_opt(&mut obj, "field", q.field_name());
            put_opt(&mut obj, "analyzer", q.analyzer_name());
            put_opt(&mut obj, "fuzziness", q.fuzziness_value());
            put_opt(&mut obj, "prefix_length", q.prefix_length_value());
        }
        QueryNode::MatchPhrase(q) => {
            obj.insert("match_phrase".into(), json!(q.phrase()));
            put_opt(&mut obj, "field", q.field_name());
            put_opt(&mut obj, "analyzer", q.analyzer_name());
        }
        QueryNode::Term(q) => {
            obj.insert("term".into(), json!(q.term()));
            put_opt(&mut obj, "field", q.field_name());
            put_opt(&mut obj, "fuzziness", q.fuzziness_value());
            put_opt(&mut obj, "prefix_length", q.prefix_length_value());
        }
        QueryNode::Phrase(q) => {
            obj.insert("terms".into(), json!(q.terms()));
            put_opt(&mut obj, "field", q.field_name());
        }
        QueryNode::DocId(q) => {
            obj.insert("ids".into(), json!(q.ids()));
        }
        QueryNode::Conjunction(q) => encode_conjunction(&mut obj, q),
        QueryNode::Disjunction(q) => encode_disjunction(&mut obj, q),
        QueryNode::QueryString(q) => {
            obj.insert("query".into(), json!(q.expression()));
        }
        QueryNode::Wildcard(q) => {
            obj.insert("wildcard".into(), json!(q.pattern()));
            put_opt(&mut obj, "field", q.field_name());
        }
        QueryNode::NumericRange(q) => encode_numeric_range(&mut obj, q),
        QueryNode::Regexp(q) => {
            obj.insert("regexp".into(), json!(q.pattern()));
            put_opt(&mut obj, "field", q.field_name());
        }
        QueryNode::Prefix(q) => {
            obj.insert("prefix".into(), json!(q.prefix()));
            put_opt(&mut obj, "field", q.field_name());
        }
        QueryNode::Boolean(q) => encode_boolean(&mut obj, q),
        QueryNode::MatchAll => {
            obj.insert("match_all".into(), json!({}));
        }
        QueryNode::MatchNone => {
            obj.insert("match_none".into(), json!({}));
        }
        QueryNode::Boosted(b) => {
            let mut inner = encode_query(b.inner());
            if let Value::Object(map) = &mut inner {
                map.insert("boost".into(), json!(b.boost()));
            }
            return inner;
        }
    }
    Value::Object(obj)
}

fn encode_conjunction(obj: &mut Map<String, Value>, q: &ConjunctionQuery) {
    let clauses: Vec<Value> = q.clauses().iter().map(encode_query).collect();
    obj.insert("conjuncts".into(), Value::Array(clauses));
}

fn encode_disjunction(obj: &mut Map<String, Value>, q: &DisjunctionQuery) {
    let clauses: Vec<Value> = q.clauses().iter().map(encode_query).collect();
    obj.insert("disjuncts".into(), Value::Array(clauses));
    obj.insert("min".into(), json!(q.min()));
}

fn encode_numeric_range(obj: &mut Map<String, Value>, q: &NumericRangeQuery) {
    if let Some(min) = q.min() {
        obj.insert("min".into(), json!(min.value));
        obj.insert("inclusive_min".into(), json!(min.inclusive));
    }
    if let Some(max) = q.max() {
        obj.insert("max".into(), json!(max.value));
        obj.insert("inclusive_max".into(), json!(max.inclusive));
    }
    obj.insert("field".into(), json!(q.field_name()));
}

fn encode_boolean(obj: &mut Map<String, Value>, q: &BooleanQuery) {
    if let Some(must) = q.must() {
        let mut part = Map::new();
        encode_conjunction(&mut part, must);
        obj.insert("must".into(), Value::Object(part));
    }
    if let Some(should) = q.should() {
        let mut part = Map::new();
        encode_disjunction(&mut part, should);
        obj.insert("should".into(), Value::Object(part));
    }
    if let Some(must_not) = q.must_not() {
        let mut part = Map::new();
        encode_disjunction(&mut part, must_not);
        obj.insert("must_not".into(), Value::Object(part));
    }
}

fn put_opt<T: serde::Serialize>(obj: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        obj.insert(key.into(), json!(value));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::query::{
        BooleanQuery, DocIdQuery, MatchPhraseQuery, MatchQuery, PhraseQuery, PrefixQuery,
        QueryStringQuery, RegexpQuery, TermQuery, WildcardQuery,
    };
    use crate::request::{FacetSpec, HighlightStyle};

    #[test]
    fn test_encode_match() {
        let query = MatchQuery::new("La Rue Saint Denis!!")
            .field("reviews.content")
            .analyzer("standard")
            .into();
        assert_eq!(
            encode_query(&query),
            json!({
                "match": "La Rue Saint Denis!!",
                "field": "reviews.content",
                "analyzer": "standard"
            })
        );
    }

    #[test]
    fn test_encode_term_with_fuzziness_zero() {
        let query = TermQuery::new("sushi").field("reviews.content").fuzziness(0).into();
        assert_eq!(
            encode_query(&query),
            json!({ "term": "sushi", "field": "reviews.content", "fuzziness": 0 })
        );
    }

    #[test]
    fn test_encode_phrase_kinds() {
        let analyzed = MatchPhraseQuery::new("Eiffel Tower").field("description").into();
        assert_eq!(
            encode_query(&analyzed),
            json!({ "match_phrase": "Eiffel Tower", "field": "description" })
        );

        let raw = PhraseQuery::new(["dorm", "rooms"]).unwrap().field("description").into();
        assert_eq!(
            encode_query(&raw),
            json!({ "terms": ["dorm", "rooms"], "field": "description" })
        );
    }

    #[test]
    fn test_encode_doc_ids() {
        let query = DocIdQuery::new(["hotel_26223", "hotel_28960"]).unwrap().into();
        assert_eq!(
            encode_query(&query),
            json!({ "ids": ["hotel_26223", "hotel_28960"] })
        );
    }

    #[test]
    fn test_encode_compound() {
        let conj: QueryNode = ConjunctionQuery::new(vec![
            MatchQuery::new("La Rue Saint Denis!!").field("reviews.content").into(),
            MatchQuery::new("boutique").field("description").into(),
        ])
        .unwrap()
        .into();
        assert_eq!(
            encode_query(&conj),
            json!({
                "conjuncts": [
                    { "match": "La Rue Saint Denis!!", "field": "reviews.content" },
                    { "match": "boutique", "field": "description" }
                ]
            })
        );

        let disj: QueryNode = DisjunctionQuery::new(
            vec![
                WildcardQuery::new("bouti*ue").field("description").into(),
                PrefixQuery::new("swan").into(),
            ],
            1,
        )
        .unwrap()
        .into();
        assert_eq!(
            encode_query(&disj),
            json!({
                "disjuncts": [
                    { "wildcard": "bouti*ue", "field": "description" },
                    { "prefix": "swan" }
                ],
                "min": 1
            })
        );
    }

    #[test]
    fn test_encode_numeric_range() {
        let query = NumericRangeQuery::builder("id")
            .min(10100.0)
            .max(10200.0)
            .build()
            .unwrap()
            .into();
        assert_eq!(
            encode_query(&query),
            json!({
                "min": 10100.0,
                "inclusive_min": true,
                "max": 10200.0,
                "inclusive_max": false,
                "field": "id"
            })
        );
    }

    #[test]
    fn test_encode_boolean() {
        let query = BooleanQuery::builder()
            .must(ConjunctionQuery::new(vec![QueryStringQuery::new("type:hotel").into()]).unwrap())
            .must_not(DisjunctionQuery::any(vec![RegexpQuery::new("hostel.*").into()]).unwrap())
            .build()
            .unwrap()
            .into();
        assert_eq!(
            encode_query(&query),
            json!({
                "must": { "conjuncts": [ { "query": "type:hotel" } ] },
                "must_not": { "disjuncts": [ { "regexp": "hostel.*" } ], "min": 1 }
            })
        );
    }

    #[test]
    fn test_encode_boost_merges_into_query() {
        let query = QueryNode::from(MatchQuery::new("swanky")).boosted(1.5).unwrap();
        assert_eq!(encode_query(&query), json!({ "match": "swanky", "boost": 1.5 }));
        assert_eq!(encode_query(&QueryNode::MatchAll), json!({ "match_all": {} }));
        assert_eq!(encode_query(&QueryNode::MatchNone), json!({ "match_none": {} }));
    }

    #[test]
    fn test_encode_minimal_request() {
        let request = SearchRequest::builder("travel-sample-index-unstored", MatchQuery::new("route"))
            .build()
            .unwrap();
        assert_eq!(
            encode_request(&request),
            json!({
                "query": { "match": "route" },
                "size": 10,
                "from": 0,
                "explain": false
            })
        );
    }

    #[test]
    fn test_encode_full_request() {
        let request = SearchRequest::builder("travel-sample-index-stored", MatchQuery::new("MDG"))
            .limit(10)
            .skip(5)
            .highlight_style(HighlightStyle::Html)
            .fields(["*"])
            .sort(["-_score"])
            .facet("Countries Referenced", FacetSpec::term("country", 5))
            .facet("Cities Referenced", FacetSpec::term("city", 5))
            .server_timeout(Duration::from_millis(2500))
            .build()
            .unwrap();

        let body = encode_request(&request);
        assert_eq!(body["size"], json!(10));
        assert_eq!(body["from"], json!(5));
        assert_eq!(body["highlight"], json!({ "style": "html" }));
        assert_eq!(body["fields"], json!(["*"]));
        assert_eq!(body["sort"], json!(["-_score"]));
        assert_eq!(
            body["facets"],
            json!({
                "Cities Referenced": { "field": "city", "size": 5 },
                "Countries Referenced": { "field": "country", "size": 5 }
            })
        );
        assert_eq!(body["ctl"], json!({ "timeout": 2500 }));
    }

    #[test]
    fn test_plain_highlight_encodes_empty_object() {
        let request = SearchRequest::builder("idx", MatchQuery::new("x"))
            .highlight()
            .build()
            .unwrap();
        assert_eq!(encode_request(&request)["highlight"], json!({}));
    }
}
