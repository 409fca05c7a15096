//! Source groups - versioned tabular sources that queries read from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::feature::Feature;
use crate::query::Query;

/// A versioned tabular source of features.
///
/// Source groups are owned by the catalog layer and shared into queries as
/// `Arc<SourceGroup>`; the query layer never mutates them. A source backed
/// by a storage connector is "external" - the marker survives
/// serialization so a reconstructed query keeps the distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceGroup {
    /// Feature store the source belongs to.
    pub store_name: String,

    /// Catalog identifier, if the source was read from a catalog record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    /// Source name.
    pub name: String,

    /// Source version.
    pub version: i32,

    /// Full ordered feature list of the source.
    #[serde(default)]
    pub features: Vec<Feature>,

    /// Present when the source is backed by an external storage connector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_connector: Option<StorageConnector>,
}

/// Marker describing the external system behind an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConnector {
    /// Connector name.
    pub name: String,

    /// Connector kind (e.g. "JDBC", "S3", "SNOWFLAKE").
    #[serde(rename = "type")]
    pub connector_type: String,
}

impl StorageConnector {
    /// Create a connector marker.
    pub fn new(name: impl Into<String>, connector_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connector_type: connector_type.into(),
        }
    }
}

impl SourceGroup {
    /// Create a source group.
    pub fn new(store_name: impl Into<String>, name: impl Into<String>, version: i32) -> Self {
        Self {
            store_name: store_name.into(),
            id: None,
            name: name.into(),
            version,
            features: vec![],
            storage_connector: None,
        }
    }

    /// Set the catalog identifier.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    /// Add an untyped feature.
    pub fn with_feature(mut self, name: impl Into<String>) -> Self {
        self.features.push(Feature::new(name));
        self
    }

    /// Add a typed feature.
    pub fn with_typed_feature(
        mut self,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        self.features.push(Feature::new(name).with_data_type(data_type));
        self
    }

    /// Mark the source as external.
    pub fn with_connector(mut self, connector: StorageConnector) -> Self {
        self.storage_connector = Some(connector);
        self
    }

    /// Whether the source is backed by an external storage connector.
    pub fn is_external(&self) -> bool {
        self.storage_connector.is_some()
    }

    /// Stable identity key: `name_version`.
    pub fn identity_key(&self) -> String {
        format!("{}_{}", self.name, self.version)
    }

    /// Look up a feature of this source by name.
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Check if the source has a feature with the given name.
    pub fn has_feature(&self, name: &str) -> bool {
        self.feature(name).is_some()
    }

    // === Query entry points ===

    /// Build a query selecting every feature of this source.
    pub fn select_all(self: &Arc<Self>) -> QueryResult<Query> {
        Query::new(Arc::clone(self), self.features.clone())
    }

    /// Build a query selecting the named features.
    ///
    /// Fails with `FeatureNotFound` when a name is absent from the source.
    pub fn select(self: &Arc<Self>, names: &[&str]) -> QueryResult<Query> {
        let mut features = Vec::with_capacity(names.len());
        for name in names {
            let feature = self
                .feature(name)
                .cloned()
                .ok_or_else(|| QueryError::FeatureNotFound((*name).to_owned()))?;
            features.push(feature);
        }
        Query::new(Arc::clone(self), features)
    }

    /// Build a query selecting everything but the named features.
    pub fn select_except(self: &Arc<Self>, names: &[&str]) -> QueryResult<Query> {
        let features = self
            .features
            .iter()
            .filter(|f| !names.contains(&f.name.as_str()))
            .cloned()
            .collect();
        Query::new(Arc::clone(self), features)
    }
}
