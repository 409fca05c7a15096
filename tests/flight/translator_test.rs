#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use quiver::flight::protocol::MaterializationRequest;
    use quiver::flight::{
        training_dataset_path, ActionTransport, FlightResult, FlightTranslator,
    };
    use quiver::{Feature, Join, Query, SourceGroup};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn source(name: &str, features: &[&str]) -> Arc<SourceGroup> {
        let mut group = SourceGroup::new("fs_featurestore", name, 1);
        for feature in features {
            group = group.with_feature(*feature);
        }
        Arc::new(group)
    }

    fn joined_query() -> Query {
        let a = source("a", &["id", "amount"]);
        let b = source("b", &["id", "rate"]);

        let mut query = a.select_all().unwrap();
        query
            .join(
                Join::new(b.select(&["rate"]).unwrap())
                    .with_on(vec!["id"])
                    .with_prefix("b_"),
            )
            .unwrap()
            .filter(Feature::new("amount").gt(100))
            .unwrap();
        query
    }

    #[test]
    fn test_rewrite_for_server_dialect() {
        let translator = FlightTranslator::new();
        let rewritten = translator.rewrite(
            "fs_featurestore",
            "SELECT `fg1`.`id` FROM `fs_featurestore`.`fg1_1` `fg1`",
        );
        assert_snapshot!(rewritten, @r#"SELECT "fg1"."id" FROM "fs.fg1_1" "fg1""#);
    }

    #[test]
    fn test_rewrite_touches_every_occurrence() {
        let translator = FlightTranslator::new();
        let rewritten = translator.rewrite(
            "fs_featurestore",
            "SELECT * FROM `fs_featurestore`.`a_1` `a` JOIN `fs_featurestore`.`b_1` `b` ON `a`.`id` = `b`.`id`",
        );
        assert_snapshot!(
            rewritten,
            @r#"SELECT * FROM "fs.a_1" "a" JOIN "fs.b_1" "b" ON "a"."id" = "b"."id""#
        );
    }

    #[test]
    fn test_table_map_spans_nested_joins() {
        let a = source("a", &["id", "x"]);
        let b = source("b", &["id", "y"]);
        let c = source("c", &["id", "z"]);

        let mut inner = b.select(&["y"]).unwrap();
        inner
            .join(
                Join::new(c.select(&["z"]).unwrap())
                    .with_on(vec!["id"])
                    .with_prefix("c_"),
            )
            .unwrap();

        let mut query = a.select_all().unwrap();
        query
            .join(Join::new(inner).with_on(vec!["id"]).with_prefix("b_"))
            .unwrap();

        let tables = FlightTranslator::new().table_map(&query);
        assert_eq!(tables.len(), 3);
        assert_eq!(tables["a_1"], "fs.a_1");
        assert_eq!(tables["b_1"], "fs.b_1");
        assert_eq!(tables["c_1"], "fs.c_1");
    }

    #[test]
    fn test_materialization_payload_shape() {
        let query = joined_query();
        let translator = FlightTranslator::new();
        let request = translator.materialization_request(
            "churn",
            2,
            &query,
            1,
            "SELECT `a`.`amount` FROM `fs_featurestore`.`a_1` `a`",
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "churn");
        assert_eq!(value["version"], 2);
        assert_eq!(value["datasetVersion"], 1);
        assert_eq!(value["storeName"], "fs");
        assert_eq!(
            value["query"]["queryString"],
            r#"SELECT "a"."amount" FROM "fs.a_1" "a""#
        );
        assert_eq!(value["query"]["tables"]["a_1"], "fs.a_1");
        assert_eq!(value["query"]["tables"]["b_1"], "fs.b_1");
        assert_eq!(value["query"]["filters"]["type"], "predicate");
    }

    struct RecordingTransport {
        calls: Mutex<Vec<(String, Vec<u8>)>>,
        reply: Vec<u8>,
    }

    impl RecordingTransport {
        fn new(reply: &[u8]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: reply.to_vec(),
            }
        }
    }

    #[async_trait::async_trait]
    impl ActionTransport for RecordingTransport {
        async fn do_action(&self, action: &str, body: Vec<u8>) -> FlightResult<Vec<u8>> {
            self.calls.lock().await.push((action.to_string(), body));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_create_training_dataset_submits_payload() {
        let query = joined_query();
        let translator = FlightTranslator::new();
        let request = translator.materialization_request(
            "churn",
            2,
            &query,
            1,
            "SELECT `a`.`amount` FROM `fs_featurestore`.`a_1` `a`",
        );

        let transport = RecordingTransport::new(b"dataset created");
        let reply = translator
            .create_training_dataset(&transport, &request)
            .await
            .unwrap();
        assert_eq!(reply, b"dataset created");

        let calls = transport.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "create-training-dataset");

        let submitted: MaterializationRequest = serde_json::from_slice(&calls[0].1).unwrap();
        assert_eq!(submitted.name, "churn");
        assert_eq!(submitted.version, 2);
        assert_eq!(submitted.dataset_version, 1);
        assert_eq!(submitted.store_name, "fs");
        assert!(submitted.query.filters.is_some());
    }

    #[test]
    fn test_training_dataset_path() {
        assert_eq!(
            training_dataset_path("fs_featurestore", "churn", 3),
            "/Projects/fs/fs_Training_Datasets/churn_3.parquet"
        );
        // Already-short names pass through unchanged.
        assert_eq!(
            training_dataset_path("fs", "churn", 3),
            "/Projects/fs/fs_Training_Datasets/churn_3.parquet"
        );
    }
}
