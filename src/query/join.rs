//! Join edges between query nodes.

use serde::{Deserialize, Serialize};

use crate::query::Query;

/// Join kind, emitted in uppercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

/// A join edge: an owned right-hand query plus how to reach it.
///
/// The edge owns its right-hand node, so once attached the nested tree can
/// no longer be mutated from outside; callers that want to reuse a
/// sub-query clone it before attaching. Key lists follow SQL conventions:
/// either a symmetric `on` list (same column names on both sides) or
/// explicit `left_on`/`right_on` pairs.
#[derive(Debug, Clone)]
pub struct Join {
    /// Right-hand side of the join.
    pub query: Query,
    /// Symmetric join keys (same name both sides).
    pub on: Vec<String>,
    /// Join keys on the left-hand side, paired with `right_on`.
    pub left_on: Vec<String>,
    /// Join keys on the right-hand side, paired with `left_on`.
    pub right_on: Vec<String>,
    /// Join kind.
    pub join_type: JoinType,
    /// Prefix applied to every feature name the right-hand side brings in.
    pub prefix: Option<String>,
}

impl Join {
    /// Create an inner join edge with no keys set.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            on: vec![],
            left_on: vec![],
            right_on: vec![],
            join_type: JoinType::default(),
            prefix: None,
        }
    }

    /// Set symmetric join keys.
    pub fn with_on(mut self, on: Vec<impl Into<String>>) -> Self {
        self.on = on.into_iter().map(Into::into).collect();
        self
    }

    /// Set left-hand join keys.
    pub fn with_left_on(mut self, left_on: Vec<impl Into<String>>) -> Self {
        self.left_on = left_on.into_iter().map(Into::into).collect();
        self
    }

    /// Set right-hand join keys.
    pub fn with_right_on(mut self, right_on: Vec<impl Into<String>>) -> Self {
        self.right_on = right_on.into_iter().map(Into::into).collect();
        self
    }

    /// Set the join kind.
    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Set the feature-name prefix for the right-hand side.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Copy a sole `on` list into empty `left_on`/`right_on` pairs.
    pub(crate) fn normalize_keys(&mut self) {
        if !self.on.is_empty() && self.left_on.is_empty() && self.right_on.is_empty() {
            self.left_on = self.on.clone();
            self.right_on = self.on.clone();
        }
    }
}
