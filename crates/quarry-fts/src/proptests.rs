//! Property-based tests for queries and requests.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use quarry_core::Error;

    use crate::query::{DisjunctionQuery, MatchQuery, NumericRangeQuery, QueryNode, TermQuery};
    use crate::request::{FacetSpec, SearchRequest};

    fn leaf() -> impl Strategy<Value = QueryNode> {
        prop_oneof![
            "\\PC{1,12}".prop_map(|t| QueryNode::from(MatchQuery::new(t))),
            "[a-z]{1,12}".prop_map(|t| QueryNode::from(TermQuery::new(t))),
            Just(QueryNode::MatchAll),
        ]
    }

    proptest! {
        #[test]
        fn test_builder_round_trip(
            index in "[a-z][a-z0-9-]{0,24}",
            query in leaf(),
            limit in 0i64..10_000,
            highlight in any::<bool>(),
            facets in prop::collection::btree_map("[A-Za-z ]{1,16}", ("[a-z.]{1,12}", 1usize..50), 0..4),
        ) {
            let mut builder = SearchRequest::builder(index.clone(), query.clone()).limit(limit);
            if highlight {
                builder = builder.highlight();
            }
            for (name, (field, size)) in &facets {
                builder = builder.facet(name.clone(), FacetSpec::term(field.clone(), *size));
            }
            let request = builder.build().unwrap();

            prop_assert_eq!(request.index_name(), index.as_str());
            prop_assert_eq!(request.query(), &query);
            prop_assert_eq!(request.limit() as i64, limit);
            prop_assert_eq!(request.is_highlighted(), highlight);
            prop_assert_eq!(request.facets().len(), facets.len());
            for (name, (field, size)) in &facets {
                prop_assert_eq!(&request.facets()[name], &FacetSpec::term(field.clone(), *size));
            }
        }

        #[test]
        fn test_negative_limit_always_rejected(limit in i64::MIN..0) {
            let result = SearchRequest::builder("idx", QueryNode::MatchAll).limit(limit).build();
            let rejected = matches!(result, Err(Error::InvalidQuery { .. }));
            prop_assert!(rejected, "limit {} was accepted", limit);
        }

        #[test]
        fn test_disjunction_min_validated(clauses in prop::collection::vec(leaf(), 0..6), min in 0usize..8) {
            let len = clauses.len();
            let result = DisjunctionQuery::new(clauses, min);
            prop_assert_eq!(result.is_ok(), min >= 1 && min <= len);
        }

        #[test]
        fn test_numeric_range_ordering(a in -1e9f64..1e9, b in -1e9f64..1e9) {
            let result = NumericRangeQuery::builder("price").min(a).max(b).build();
            prop_assert_eq!(result.is_ok(), a <= b);
        }
    }
}
