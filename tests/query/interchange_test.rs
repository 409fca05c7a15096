#[cfg(test)]
mod tests {
    use quiver::{Feature, Filter, Join, Query, QueryError, SourceGroup, StorageConnector};
    use serde_json::json;
    use std::sync::Arc;

    fn source(name: &str, features: &[&str]) -> Arc<SourceGroup> {
        let mut group = SourceGroup::new("fs_featurestore", name, 1);
        for feature in features {
            group = group.with_feature(*feature);
        }
        Arc::new(group)
    }

    fn external_source(name: &str, features: &[&str]) -> Arc<SourceGroup> {
        let mut group = SourceGroup::new("fs_featurestore", name, 1)
            .with_connector(StorageConnector::new("snowflake_conn", "SNOWFLAKE"));
        for feature in features {
            group = group.with_feature(*feature);
        }
        Arc::new(group)
    }

    #[test]
    fn test_document_uses_camel_case_keys() {
        let a = source("a", &["id", "amount"]);
        let b = source("b", &["id", "rate"]);

        let mut query = a.select_all().unwrap();
        query
            .join(
                Join::new(b.select(&["rate"]).unwrap())
                    .with_left_on(vec!["id"])
                    .with_right_on(vec!["id"])
                    .with_prefix("b_"),
            )
            .unwrap()
            .filter(Feature::new("amount").gt(100))
            .unwrap()
            .as_of(Some("2020-10-20".into()), None)
            .unwrap();

        let value = query.to_interchange().unwrap();

        assert_eq!(value["storeName"], "fs_featurestore");
        assert_eq!(value["endTime"], 1603152000000i64);
        assert_eq!(value["source"]["storeName"], "fs_featurestore");

        let join = &value["joins"][0];
        assert_eq!(join["leftOn"][0], "id");
        assert_eq!(join["rightOn"][0], "id");
        assert_eq!(join["type"], "INNER");
        assert_eq!(join["prefix"], "b_");

        assert_eq!(value["filter"]["type"], "predicate");
        assert_eq!(value["filter"]["operator"], "GREATER_THAN");
    }

    #[test]
    fn test_snake_case_document_accepted() {
        let value = json!({
            "store_name": "fs_featurestore",
            "store_id": 67,
            "source": {
                "store_name": "fs_featurestore",
                "name": "a",
                "version": 1,
                "features": [{"name": "id"}, {"name": "amount", "data_type": "bigint"}]
            },
            "features": [{"name": "id"}, {"name": "amount", "data_type": "bigint"}],
            "joins": [{
                "query": {
                    "store_name": "fs_featurestore",
                    "source": {
                        "store_name": "fs_featurestore",
                        "name": "b",
                        "version": 1,
                        "features": [{"name": "id"}, {"name": "rate"}]
                    },
                    "features": [{"name": "rate"}]
                },
                "left_on": ["id"],
                "right_on": ["id"],
                "type": "LEFT",
                "prefix": "b_"
            }],
            "start_time": 1603065600000i64,
            "end_time": 1603152000000i64
        });

        let query = Query::from_interchange(value).unwrap();

        assert_eq!(query.store_id(), Some(67));
        assert_eq!(query.start_time(), Some(1603065600000));
        assert_eq!(query.end_time(), Some(1603152000000));
        assert_eq!(
            query.resolve_feature("amount").unwrap().feature.data_type.as_deref(),
            Some("bigint")
        );
        assert_eq!(query.resolve_feature("b_rate").unwrap().source.name, "b");
        assert_eq!(query.joins()[0].join_type, quiver::JoinType::Left);
    }

    #[test]
    fn test_round_trip_preserves_external_marker() {
        let native = source("a", &["id", "amount"]);
        let external = external_source("ext", &["id", "rating"]);

        let mut query = native.select_all().unwrap();
        query
            .join(Join::new(external.select(&["rating"]).unwrap()).with_on(vec!["id"]))
            .unwrap();

        let value = query.to_interchange().unwrap();
        assert_eq!(
            value["joins"][0]["query"]["source"]["storageConnector"]["type"],
            "SNOWFLAKE"
        );
        // Native sources carry no connector key at all.
        assert!(value["source"].get("storageConnector").is_none());

        let restored = Query::from_interchange(value).unwrap();
        let owner = restored.resolve_feature("rating").unwrap().source.clone();
        assert!(owner.is_external());
        assert!(!restored.source().is_external());
    }

    #[test]
    fn test_round_trip_keeps_own_filter_chains() {
        let a = source("a", &["id", "amount"]);
        let b = source("b", &["id", "rate"]);

        let mut sub = b.select(&["rate"]).unwrap();
        sub.filter(Feature::new("rate").gt(0)).unwrap();

        let mut query = a.select_all().unwrap();
        query
            .join(Join::new(sub).with_on(vec!["id"]))
            .unwrap()
            .filter(Feature::new("amount").lte(500))
            .unwrap();

        let restored = Query::from_interchange(query.to_interchange().unwrap()).unwrap();

        // The merged view spans both chains after reconstruction.
        let merged = restored.filters().unwrap();
        let names: Vec<&str> = merged
            .predicate_features()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"amount"));
        assert!(names.contains(&"rate"));
    }

    #[test]
    fn test_unknown_filter_tag_is_named_in_error() {
        let value = json!({
            "storeName": "fs",
            "source": {
                "storeName": "fs", "name": "a", "version": 1,
                "features": [{"name": "id"}]
            },
            "features": [{"name": "id"}],
            "joins": [{
                "query": {
                    "storeName": "fs",
                    "source": {
                        "storeName": "fs", "name": "b", "version": 1,
                        "features": [{"name": "id"}, {"name": "rate"}]
                    },
                    "features": [{"name": "rate"}],
                    "filter": {"type": "between", "feature": {"name": "rate"}}
                },
                "on": ["id"]
            }]
        });

        let err = Query::from_interchange(value).unwrap_err();
        assert!(matches!(err, QueryError::FilterType(tag) if tag == "between"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let value = json!({
            "storeName": "fs_featurestore",
            "source": {
                "storeName": "fs_featurestore",
                "name": "a",
                "version": 1,
                "features": [{"name": "id"}],
                "onlineTopicName": "a_1_onlinefs"
            },
            "features": [{"name": "id"}],
            "hiveEngine": false,
            "queryCacheKey": "abc"
        });

        let query = Query::from_interchange(value).unwrap();
        assert_eq!(query.features().len(), 1);
    }

    #[test]
    fn test_partial_document_with_duplicates() {
        let value = json!({
            "store_name": "fs",
            "source": {
                "store_name": "fs", "name": "a", "version": 1,
                "features": [{"name": "id"}, {"name": "score"}]
            },
            "features": [{"name": "id"}, {"name": "score"}],
            "joins": [{
                "query": {
                    "store_name": "fs",
                    "source": {
                        "store_name": "fs", "name": "b", "version": 1,
                        "features": [{"name": "id"}, {"name": "score"}]
                    },
                    "features": [{"name": "score"}]
                },
                "on": ["id"]
            }]
        });

        let strict = Query::from_interchange(value.clone());
        assert!(matches!(
            strict.unwrap_err(),
            QueryError::DuplicateFeature(name) if name == "score"
        ));

        let partial = Query::partial_from_interchange(value).unwrap();
        assert_eq!(partial.features().len(), 3);
        assert!(matches!(
            partial.resolve_feature("score").unwrap_err(),
            QueryError::AmbiguousFeature(_)
        ));
        // Unambiguous names still resolve.
        assert!(partial.resolve_feature("id").is_ok());
    }

    #[test]
    fn test_to_json_round_trips_through_text() {
        let a = source("a", &["id"]);
        let query = a.select_all().unwrap();

        let text = query.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let restored = Query::from_interchange(value).unwrap();

        assert_eq!(restored.store_name(), "fs_featurestore");
        assert_eq!(restored.features().len(), 1);
    }

    #[test]
    fn test_filter_serial_form_is_tagged() {
        let filter = Feature::new("amount").gt(10).and(Feature::new("id").is_in(vec![1, 2]));
        let value = serde_json::to_value(&filter).unwrap();

        assert_eq!(value["type"], "and");
        assert_eq!(value["left"]["type"], "predicate");
        assert_eq!(value["right"]["operator"], "IN");

        let parsed: Filter = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.predicate_features().len(), 2);
    }
}
