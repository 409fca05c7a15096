//! Boolean filter expressions over feature predicates.
//!
//! Filters form a persistent expression tree: combining two filters with
//! `&` or `|` allocates a new node and leaves both operands untouched, so
//! a filter can be attached to several queries safely.

use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::feature::Feature;

// =============================================================================
// Filter tree
// =============================================================================

/// A boolean expression tree over column predicates.
///
/// Leaves compare a single feature against a literal; inner nodes combine
/// two subtrees with AND or OR. The serialized form tags each node with a
/// `type` field (`predicate`, `and`, `or`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Filter {
    /// feature OPERATOR value
    Predicate {
        feature: Feature,
        operator: FilterOperator,
        value: serde_json::Value,
    },

    /// left AND right
    And { left: Box<Filter>, right: Box<Filter> },

    /// left OR right
    Or { left: Box<Filter>, right: Box<Filter> },
}

/// Comparison operators available in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    Like,
}

impl Filter {
    /// Create a predicate leaf.
    pub fn predicate(
        feature: Feature,
        operator: FilterOperator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Filter::Predicate {
            feature,
            operator,
            value: value.into(),
        }
    }

    /// self AND other
    pub fn and(self, other: Filter) -> Self {
        Filter::And {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// self OR other
    pub fn or(self, other: Filter) -> Self {
        Filter::Or {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Conjoin two optional filters, adopting whichever side is present.
    pub fn conjoin(left: Option<Filter>, right: Option<Filter>) -> Option<Filter> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some(left), Some(right)) => Some(left.and(right)),
        }
    }

    /// Collect every feature referenced by a predicate in this tree.
    pub fn predicate_features(&self) -> Vec<&Feature> {
        let mut features = Vec::new();
        self.collect_features(&mut features);
        features
    }

    fn collect_features<'a>(&'a self, out: &mut Vec<&'a Feature>) {
        match self {
            Filter::Predicate { feature, .. } => out.push(feature),
            Filter::And { left, right } | Filter::Or { left, right } => {
                left.collect_features(out);
                right.collect_features(out);
            }
        }
    }
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        self.and(rhs)
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        self.or(rhs)
    }
}
