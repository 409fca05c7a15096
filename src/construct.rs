//! Delegated query-string construction.
//!
//! A query tree does not render SQL locally; a planner service does that.
//! [`QueryConstructor`] is the seam for whatever carries the request, and
//! [`ConstructedQuery`] is the planner's answer: one string per execution
//! target, picked with [`ConstructedQuery::execution_string`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QueryResult;
use crate::query::Query;

/// Planner response carrying the rendered query strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructedQuery {
    /// Batch execution string.
    #[serde(default)]
    pub query: String,
    /// Online (low-latency store) execution string.
    #[serde(default)]
    pub query_online: String,
    /// Point-in-time correct variant of the batch string, present when the
    /// planner produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_query: Option<String>,
}

impl ConstructedQuery {
    /// Pick the string for a target: the online string when `online`,
    /// otherwise the point-in-time string when present, else the batch one.
    pub fn execution_string(&self, online: bool) -> &str {
        if online {
            &self.query_online
        } else {
            self.pit_query.as_deref().unwrap_or(&self.query)
        }
    }
}

/// Anything that can turn a query tree into execution strings.
#[async_trait]
pub trait QueryConstructor: Send + Sync {
    /// Construct the execution strings for `query`.
    async fn construct_query(&self, query: &Query) -> QueryResult<ConstructedQuery>;
}

impl Query {
    /// Construct this query remotely and return the string for a target.
    pub async fn execution_string(
        &self,
        constructor: &dyn QueryConstructor,
        online: bool,
    ) -> QueryResult<String> {
        let constructed = constructor.construct_query(self).await?;
        Ok(constructed.execution_string(online).to_owned())
    }
}
