//! Shared fixtures: canned engine responses for the travel-sample indexes.

use quarry_fts::StaticSearchClient;
use serde_json::{Value, json};

pub const UNSTORED: &str = "travel-sample-index-unstored";
pub const STORED: &str = "travel-sample-index-stored";
pub const HOTEL_DESCRIPTION: &str = "travel-sample-index-hotel-description";

/// Rows carry only ids and scores: dynamic fields are not stored.
pub fn unstored_response() -> Value {
    json!({
        "status": { "total": 6, "failed": 0, "successful": 6 },
        "hits": [
            { "index": "travel-sample-index-unstored_1", "id": "hotel_26223", "score": 1.0 },
            { "index": "travel-sample-index-unstored_4", "id": "hotel_28960", "score": 0.8 }
        ],
        "total_hits": 2,
        "max_score": 1.0,
        "took": 2_345_678
    })
}

/// Rows carry stored fields and highlighted fragments, plus facets.
pub fn stored_response() -> Value {
    json!({
        "status": { "total": 6, "failed": 0, "successful": 6 },
        "hits": [
            {
                "index": "travel-sample-index-stored_2",
                "id": "hotel_10025",
                "score": 1.42,
                "fields": {
                    "description": "a boutique hotel near the Eiffel Tower",
                    "reviews.content": ["La Rue Saint Denis is lovely"]
                },
                "fragments": {
                    "description": ["a <mark>boutique</mark> hotel near the Eiffel Tower"],
                    "reviews.content": ["<mark>La</mark> <mark>Rue</mark> <mark>Saint</mark> <mark>Denis</mark> is lovely"]
                }
            },
            {
                "index": "travel-sample-index-stored_5",
                "id": "hotel_21723",
                "score": 0.97,
                "fields": { "description": "boutique rooms" },
                "fragments": { "description": ["<mark>boutique</mark> rooms"] }
            }
        ],
        "total_hits": 2,
        "max_score": 1.42,
        "took": 4_000_000,
        "facets": {
            "Countries Referenced": {
                "field": "country",
                "total": 15,
                "missing": 0,
                "other": 0,
                "terms": [
                    { "term": "United States", "count": 2 },
                    { "term": "France", "count": 12 },
                    { "term": "United Kingdom", "count": 1 }
                ]
            },
            "Cities Referenced": {
                "field": "city",
                "total": 14,
                "missing": 1,
                "other": 2,
                "terms": [ { "term": "Paris", "count": 12 } ]
            },
            "Price Bands": {
                "field": "price",
                "total": 3,
                "numeric_ranges": [ { "name": "cheap", "min": 0, "max": 100, "count": 3 } ]
            }
        }
    })
}

/// The description-only index stores content but returns ids only.
pub fn hotel_description_response() -> Value {
    json!({
        "hits": [ { "id": "hotel_1364", "score": 2.1 } ],
        "total_hits": 1
    })
}

/// A client serving all three travel-sample indexes.
pub fn travel_sample_client() -> StaticSearchClient {
    StaticSearchClient::new()
        .with_index(UNSTORED, unstored_response())
        .with_index(STORED, stored_response())
        .with_index(HOTEL_DESCRIPTION, hotel_description_response())
}
