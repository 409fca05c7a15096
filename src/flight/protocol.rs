//! Protocol types for flight server communication.
//!
//! The server speaks newline-delimited JSON: one [`ActionRequest`] per
//! line in, one [`ActionResponse`] per line out, correlated by id. Action
//! bodies are opaque bytes carried base64-encoded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::Filter;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Action request envelope sent to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Unique request ID for correlation.
    pub id: String,
    /// Action name (e.g., "create-training-dataset").
    pub action: String,
    /// Base64-encoded action body.
    pub body: String,
}

/// Action response envelope received from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the action succeeded.
    pub success: bool,
    /// Base64-encoded result body (present if success = true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Error information (present if success = false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Materialization Payload
// ============================================================================

/// Query part of a materialization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedQuery {
    /// Execution string with identifiers rewritten for the server dialect.
    pub query_string: String,
    /// Source identity key to dialect-qualified table name.
    pub tables: BTreeMap<String, String>,
    /// Conjunction of every filter in the query tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filter>,
}

/// Payload of the `create-training-dataset` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializationRequest {
    /// Dataset name.
    pub name: String,
    /// Dataset source (feature view) version.
    pub version: i32,
    /// Version of the materialized dataset itself.
    pub dataset_version: i32,
    /// Short feature store name, without the store suffix.
    pub store_name: String,
    /// The query to materialize.
    pub query: TranslatedQuery,
}

/// Well-known action names.
pub mod actions {
    pub const HEALTHCHECK: &str = "healthcheck";
    pub const CREATE_TRAINING_DATASET: &str = "create-training-dataset";
}
