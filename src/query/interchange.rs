//! Wire form of a query tree.
//!
//! A [`Query`] serializes to a JSON document with camelCase keys; the same
//! document deserializes back into an equivalent query. Incoming documents
//! may use snake_case keys instead (every key is camelized before parsing),
//! and unknown keys are ignored. Each node records its own attached filter
//! chain, never the merged conjunction, so the document round-trips without
//! duplicating filters into parent nodes.

use inflector::Inflector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::feature::Feature;
use crate::filter::Filter;
use crate::query::join::{Join, JoinType};
use crate::query::Query;
use crate::source::SourceGroup;

/// One query node on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    #[serde(default)]
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i32>,
    pub source: SourceGroup,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

/// One join edge on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRecord {
    pub query: QueryRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub left_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub right_on: Vec<String>,
    #[serde(rename = "type", default)]
    pub join_type: JoinType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl QueryRecord {
    fn from_query(query: &Query) -> Self {
        Self {
            store_name: query.store_name.clone(),
            store_id: query.store_id,
            source: (*query.source).clone(),
            features: query.features.clone(),
            joins: query.joins.iter().map(JoinRecord::from_join).collect(),
            filter: query.filter.clone(),
            start_time: query.start_time,
            end_time: query.end_time,
        }
    }

    fn into_query(self, strict: bool) -> QueryResult<Query> {
        let joins = self
            .joins
            .into_iter()
            .map(|j| j.into_join(strict))
            .collect::<QueryResult<Vec<_>>>()?;
        Query::from_parts(
            self.store_name,
            self.store_id,
            Arc::new(self.source),
            self.features,
            joins,
            self.filter,
            self.start_time,
            self.end_time,
            strict,
        )
    }
}

impl JoinRecord {
    fn from_join(join: &Join) -> Self {
        Self {
            query: QueryRecord::from_query(&join.query),
            on: join.on.clone(),
            left_on: join.left_on.clone(),
            right_on: join.right_on.clone(),
            join_type: join.join_type,
            prefix: join.prefix.clone(),
        }
    }

    fn into_join(self, strict: bool) -> QueryResult<Join> {
        let mut join = Join::new(self.query.into_query(strict)?)
            .with_join_type(self.join_type);
        join.on = self.on;
        join.left_on = self.left_on;
        join.right_on = self.right_on;
        join.prefix = self.prefix;
        join.normalize_keys();
        Ok(join)
    }
}

/// Camelize every object key, recursively. Values are left alone.
fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_camel_case(), camelize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

/// Reject unknown filter type tags before serde gets to them, so the
/// caller sees `FilterType("between")` instead of a generic parse error.
fn check_filter_tags(record: &Value) -> QueryResult<()> {
    let Some(object) = record.as_object() else {
        return Ok(());
    };
    if let Some(filter) = object.get("filter") {
        check_filter_node(filter)?;
    }
    if let Some(joins) = object.get("joins").and_then(Value::as_array) {
        for join in joins {
            if let Some(query) = join.get("query") {
                check_filter_tags(query)?;
            }
        }
    }
    Ok(())
}

fn check_filter_node(filter: &Value) -> QueryResult<()> {
    if filter.is_null() {
        return Ok(());
    }
    match filter.get("type").and_then(Value::as_str) {
        Some("and") | Some("or") => {
            for side in ["left", "right"] {
                if let Some(child) = filter.get(side) {
                    check_filter_node(child)?;
                }
            }
            Ok(())
        }
        Some("predicate") => Ok(()),
        Some(tag) => Err(QueryError::FilterType(tag.to_string())),
        // Missing tag falls through to serde, which reports the shape error.
        None => Ok(()),
    }
}

impl Query {
    /// The wire record for this node and everything below it.
    pub fn to_record(&self) -> QueryRecord {
        QueryRecord::from_query(self)
    }

    /// Serialize to an interchange document.
    pub fn to_interchange(&self) -> QueryResult<Value> {
        Ok(serde_json::to_value(self.to_record())?)
    }

    /// Serialize to an interchange document as a JSON string.
    pub fn to_json(&self) -> QueryResult<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    /// Rebuild a query from an interchange document.
    ///
    /// Snake_case keys are accepted, unknown keys ignored. The tree passes
    /// through the same index construction as directly built queries, so a
    /// document describing a colliding projection is rejected.
    pub fn from_interchange(value: Value) -> QueryResult<Query> {
        let value = camelize_keys(value);
        check_filter_tags(&value)?;
        let record: QueryRecord = serde_json::from_value(value)?;
        record.into_query(true)
    }

    /// Rebuild a query from a document that may not satisfy projection
    /// uniqueness, e.g. one assembled by an external planner. Name
    /// collisions are indexed under their shared name instead of rejected;
    /// resolution of such a name then reports it as ambiguous.
    pub fn partial_from_interchange(value: Value) -> QueryResult<Query> {
        let value = camelize_keys(value);
        check_filter_tags(&value)?;
        let record: QueryRecord = serde_json::from_value(value)?;
        record.into_query(false)
    }
}
