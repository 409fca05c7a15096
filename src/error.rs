//! Error types for query composition and resolution.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while composing or resolving a query.
///
/// Mutating operations check their preconditions before committing, so a
/// query that returns one of these is left in its previous state.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A selected or appended feature name already resolves in the query.
    #[error("feature name {0} already exists in query")]
    DuplicateFeature(String),

    /// A join without a prefix introduced a colliding feature name.
    #[error("feature name {0} already exists in query, consider using a prefix")]
    UsePrefix(String),

    /// A join prefix still produced a colliding feature name.
    #[error("feature name {0} already exists in query, consider changing the prefix")]
    ChangePrefix(String),

    /// A bare feature name matches several prefixed entries.
    #[error("feature name {0} is ambiguous, consider using a prefix")]
    AmbiguousFeature(String),

    /// The feature name does not resolve anywhere in the query.
    #[error("feature name {0} not found in query")]
    FeatureNotFound(String),

    /// No participating source group owns the feature.
    #[error("feature {0} not found in any source group of this query")]
    SourceNotFound(String),

    /// A deserialized filter node carries an unknown type tag.
    #[error("filter node has unsupported type tag: {0}")]
    FilterType(String),

    /// A time-travel bound could not be normalized to a timestamp.
    #[error("cannot interpret event time: {0}")]
    InvalidEventTime(String),

    /// A query record failed to serialize or deserialize.
    #[error("malformed query record: {0}")]
    Interchange(#[from] serde_json::Error),

    /// The external query-construction service failed.
    #[error("query construction failed: {0}")]
    Constructor(String),
}

impl QueryError {
    /// Check if this error reports a feature-name collision.
    pub fn is_collision(&self) -> bool {
        matches!(
            self,
            Self::DuplicateFeature(_) | Self::UsePrefix(_) | Self::ChangePrefix(_)
        )
    }
}
