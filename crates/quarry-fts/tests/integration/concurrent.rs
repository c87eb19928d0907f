//! Requests and results shared across tasks.

use std::sync::Arc;

use quarry_fts::query::{MatchQuery, TermQuery};
use quarry_fts::{SearchClient, SearchRequest};

use crate::common::{STORED, UNSTORED, travel_sample_client};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_searches_share_one_client() {
    let client = Arc::new(travel_sample_client());

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            let (index, limit) = if i % 2 == 0 { (UNSTORED, 5) } else { (STORED, 10) };
            let request = SearchRequest::builder(index, TermQuery::new(format!("term{i}")))
                .limit(limit)
                .build()
                .unwrap();
            let result = client.execute(&request).await.unwrap();
            (request, result)
        }));
    }

    for handle in handles {
        let (request, result) = handle.await.unwrap();
        assert!(!result.is_empty());
        // Each request kept its own settings.
        let expected = if request.index_name() == UNSTORED { 5 } else { 10 };
        assert_eq!(request.limit(), expected);
    }
    assert_eq!(client.sent().len(), 16);
}

#[tokio::test]
async fn test_result_outlives_request_and_is_shareable() {
    let client = travel_sample_client();
    let result = {
        let request = SearchRequest::builder(STORED, MatchQuery::new("boutique"))
            .highlight()
            .build()
            .unwrap();
        client.execute(&request).await.unwrap()
    };

    let shared = Arc::new(result);
    let reader = Arc::clone(&shared);
    let ids = tokio::spawn(async move { reader.ids().map(str::to_string).collect::<Vec<_>>() })
        .await
        .unwrap();
    assert_eq!(ids, ["hotel_10025", "hotel_21723"]);
}
