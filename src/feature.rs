//! Feature references - named columns owned by a source group.

use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterOperator};

/// A named column reference.
///
/// The data type is optional because features are often named before the
/// catalog has resolved their schema. The owning source id is set when the
/// feature was read back from a catalog record and is used to place filter
/// predicates without a name lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Column name.
    pub name: String,

    /// Column type, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Identifier of the owning source group, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i32>,
}

impl Feature {
    /// Create a feature reference by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            source_id: None,
        }
    }

    /// Set the column type.
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Set the owning source group id.
    pub fn with_source_id(mut self, source_id: i32) -> Self {
        self.source_id = Some(source_id);
        self
    }

    // === Predicate builders ===

    /// feature = value
    pub fn eq(&self, value: impl Into<serde_json::Value>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::Equals, value)
    }

    /// feature <> value
    pub fn ne(&self, value: impl Into<serde_json::Value>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::NotEquals, value)
    }

    /// feature < value
    pub fn lt(&self, value: impl Into<serde_json::Value>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::LessThan, value)
    }

    /// feature <= value
    pub fn lte(&self, value: impl Into<serde_json::Value>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::LessThanOrEqual, value)
    }

    /// feature > value
    pub fn gt(&self, value: impl Into<serde_json::Value>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::GreaterThan, value)
    }

    /// feature >= value
    pub fn gte(&self, value: impl Into<serde_json::Value>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::GreaterThanOrEqual, value)
    }

    /// feature IN (values)
    pub fn is_in(&self, values: Vec<impl Into<serde_json::Value>>) -> Filter {
        let values: Vec<serde_json::Value> = values.into_iter().map(Into::into).collect();
        Filter::predicate(self.clone(), FilterOperator::In, values)
    }

    /// feature LIKE pattern
    pub fn like(&self, pattern: impl Into<String>) -> Filter {
        Filter::predicate(self.clone(), FilterOperator::Like, pattern.into())
    }
}

impl From<&str> for Feature {
    fn from(name: &str) -> Self {
        Feature::new(name)
    }
}

impl From<String> for Feature {
    fn from(name: String) -> Self {
        Feature::new(name)
    }
}
