//! Translation of a query tree into a materialization request.
//!
//! The flight server executes queries in its own engine, which qualifies
//! tables as `"store.name_version"` with double-quoted identifiers and no
//! store suffix. The translator rewrites a constructed execution string
//! into that dialect, collects every participating source into a table
//! mapping, and packages both with the merged filter tree as the payload
//! of the `create-training-dataset` action.

use std::collections::BTreeMap;

use super::client::ActionTransport;
use super::error::{FlightError, FlightResult};
use super::protocol::{actions, MaterializationRequest, TranslatedQuery};
use crate::query::Query;

/// Store-name suffix the server-side dialect drops.
const STORE_SUFFIX: &str = "_featurestore";

/// Strip the store suffix from a feature store name.
pub fn strip_store_suffix(name: &str) -> &str {
    name.strip_suffix(STORE_SUFFIX).unwrap_or(name)
}

/// Canonical storage path of a materialized dataset.
pub fn training_dataset_path(store_name: &str, name: &str, version: i32) -> String {
    let store = strip_store_suffix(store_name);
    format!(
        "/Projects/{}/{}_Training_Datasets/{}_{}.parquet",
        store, store, name, version
    )
}

/// Translates query trees into flight server payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlightTranslator;

impl FlightTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite a constructed execution string for the server dialect.
    ///
    /// The store-qualified spelling `` `store`.`table` `` collapses into a
    /// single `"short.table"` identifier, and backtick quoting becomes
    /// double quotes throughout.
    pub fn rewrite(&self, store_name: &str, query_string: &str) -> String {
        let qualified = format!("`{}`.`", store_name);
        let replacement = format!("`{}.", strip_store_suffix(store_name));
        query_string
            .replace(&qualified, &replacement)
            .replace('`', "\"")
    }

    /// Map every participating source's identity key to its
    /// dialect-qualified table name, the whole tree included.
    pub fn table_map(&self, query: &Query) -> BTreeMap<String, String> {
        query
            .source_groups()
            .iter()
            .map(|source| {
                let qualified = format!(
                    "{}.{}",
                    strip_store_suffix(&source.store_name),
                    source.identity_key()
                );
                (source.identity_key(), qualified)
            })
            .collect()
    }

    /// The query part of a materialization payload.
    pub fn translated_query(&self, query: &Query, query_string: &str) -> TranslatedQuery {
        TranslatedQuery {
            query_string: self.rewrite(&query.source().store_name, query_string),
            tables: self.table_map(query),
            filters: query.filters().cloned(),
        }
    }

    /// Assemble the payload of a `create-training-dataset` action.
    pub fn materialization_request(
        &self,
        name: &str,
        version: i32,
        query: &Query,
        dataset_version: i32,
        query_string: &str,
    ) -> MaterializationRequest {
        MaterializationRequest {
            name: name.to_string(),
            version,
            dataset_version,
            store_name: strip_store_suffix(&query.source().store_name).to_string(),
            query: self.translated_query(query, query_string),
        }
    }

    /// Submit a materialization request, returning the raw response bytes.
    pub async fn create_training_dataset(
        &self,
        transport: &dyn ActionTransport,
        request: &MaterializationRequest,
    ) -> FlightResult<Vec<u8>> {
        let body = serde_json::to_vec(request).map_err(FlightError::Encode)?;
        transport
            .do_action(actions::CREATE_TRAINING_DATASET, body)
            .await
    }
}
