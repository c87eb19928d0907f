//! End-to-end searches against the travel-sample fixtures.

use quarry_core::Error;
use quarry_fts::query::{
    ConjunctionQuery, DocIdQuery, MatchPhraseQuery, MatchQuery, NumericRangeQuery, PhraseQuery,
    QueryNode, QueryStringQuery, RegexpQuery, TermQuery, WildcardQuery,
};
use quarry_fts::{FacetSpec, ScriptedFailure, SearchClient, SearchRequest};
use serde_json::json;

use crate::common::{HOTEL_DESCRIPTION, STORED, UNSTORED, travel_sample_client};

#[tokio::test]
async fn test_match_on_unstored_index_returns_ids_only() {
    let client = travel_sample_client();
    let request = SearchRequest::builder(UNSTORED, MatchQuery::new("route"))
        .limit(10)
        .build()
        .unwrap();

    let result = client.execute(&request).await.unwrap();

    assert_eq!(result.ids().collect::<Vec<_>>(), ["hotel_26223", "hotel_28960"]);
    assert!(result.rows.iter().all(|row| row.fields.is_empty()));
    assert!(result.rows.iter().all(|row| row.fragments.is_empty()));
    assert_eq!(result.metrics.total_hits, 2);
}

#[tokio::test]
async fn test_highlighted_match_with_facets() {
    let client = travel_sample_client();
    let request = SearchRequest::builder(
        STORED,
        MatchQuery::new("La Rue Saint Denis!!")
            .field("reviews.content")
            .analyzer("standard"),
    )
    .limit(10)
    .highlight()
    .facet("Countries Referenced", FacetSpec::term("country", 2))
    .facet("Cities Referenced", FacetSpec::term("city", 5))
    .facet("Price Bands", FacetSpec::term("price", 5))
    .build()
    .unwrap();

    let result = client.execute(&request).await.expect("search should succeed");

    let top = &result.rows[0];
    assert_eq!(top.id, "hotel_10025");
    assert_eq!(
        top.fragments["description"],
        ["a <mark>boutique</mark> hotel near the Eiffel Tower"]
    );

    // The numeric-range facet is skipped; the term facets are sorted and truncated.
    assert_eq!(result.facets.len(), 2);
    let countries = &result.facets["Countries Referenced"];
    let values: Vec<_> = countries.terms.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["France", "United States"]);
    assert_eq!(result.facets["Cities Referenced"].missing, 1);

    let sent = client.sent();
    assert_eq!(
        sent[0]["query"],
        json!({
            "match": "La Rue Saint Denis!!",
            "field": "reviews.content",
            "analyzer": "standard"
        })
    );
    assert_eq!(sent[0]["highlight"], json!({}));
    assert_eq!(
        sent[0]["facets"]["Countries Referenced"],
        json!({ "field": "country", "size": 2 })
    );
}

#[tokio::test]
async fn test_every_query_kind_round_trips_through_client() {
    let client = travel_sample_client();
    let queries: Vec<(&str, QueryNode)> = vec![
        (UNSTORED, DocIdQuery::new(["hotel_26223", "hotel_28960"]).unwrap().into()),
        (STORED, TermQuery::new("sushi").field("reviews.content").fuzziness(0).into()),
        (STORED, TermQuery::new("sushi").field("reviews.content").fuzziness(2).into()),
        (STORED, MatchPhraseQuery::new("Eiffel Tower").field("description").into()),
        (STORED, PhraseQuery::new(["dorm", "rooms"]).unwrap().field("description").into()),
        (HOTEL_DESCRIPTION, MatchQuery::new("swanky").analyzer("myUnicodeAnalyzer").into()),
        (
            STORED,
            ConjunctionQuery::new(vec![
                MatchQuery::new("La Rue Saint Denis!!").field("reviews.content").into(),
                MatchQuery::new("boutique").field("description").into(),
            ])
            .unwrap()
            .into(),
        ),
        (UNSTORED, QueryStringQuery::new("description: Imperial").into()),
        (STORED, WildcardQuery::new("bouti*ue").field("description").into()),
        (
            UNSTORED,
            NumericRangeQuery::builder("id").min(10100.0).max(10200.0).build().unwrap().into(),
        ),
        (STORED, RegexpQuery::new("[a-z]").field("description").into()),
    ];

    for (index, query) in queries {
        let request = SearchRequest::builder(index, query).limit(100).build().unwrap();
        let result = client.execute(&request).await.unwrap();
        assert!(!result.is_empty(), "no rows for {}", request.query().kind());
    }
    assert_eq!(client.sent().len(), 11);
}

#[tokio::test]
async fn test_transport_errors_are_not_translated() {
    let client = travel_sample_client()
        .with_failure(STORED, ScriptedFailure::QueryExecution("unknown analyzer".into()));

    let request = SearchRequest::builder(STORED, MatchQuery::new("x").analyzer("nope"))
        .build()
        .unwrap();
    let err = client.execute(&request).await.unwrap_err();
    let Error::QueryExecution { message } = err else {
        unreachable!("Expected QueryExecution error");
    };
    assert_eq!(message, "unknown analyzer");

    let request = SearchRequest::builder("no-such-index", MatchQuery::new("x"))
        .build()
        .unwrap();
    let err = client.execute(&request).await.unwrap_err();
    assert!(matches!(err, Error::IndexNotFound { .. }));
}
