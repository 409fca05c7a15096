//! # Quiver
//!
//! Feature query composition and materialization client for versioned
//! feature stores.
//!
//! ## Architecture
//!
//! Quiver builds logical read queries over feature sources and hands them
//! to remote services for execution:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              SourceGroup (versioned feature source)     │
//! │  (select_all / select / select_except)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query builder]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Query tree (joins, filters, time travel)       │
//! │          + FeatureIndex (name resolution)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!            ┌─────────────┴─────────────┐
//!            ▼ [interchange]             ▼ [flight translator]
//! ┌─────────────────────────┐ ┌─────────────────────────────┐
//! │  JSON wire document     │ │  MaterializationRequest     │
//! │  (to/from interchange)  │ │  → ActionClient (NDJSON)    │
//! └─────────────────────────┘ └─────────────────────────────┘
//! ```

pub mod config;
pub mod construct;
pub mod error;
pub mod feature;
pub mod filter;
pub mod flight;
pub mod query;
pub mod source;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::construct::{ConstructedQuery, QueryConstructor};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::feature::Feature;
    pub use crate::filter::{Filter, FilterOperator};
    pub use crate::flight::{ActionTransport, FlightTranslator};
    pub use crate::query::{EventTime, Join, JoinType, Query};
    pub use crate::source::{SourceGroup, StorageConnector};
}

// Also export at crate root for convenience
pub use error::{QueryError, QueryResult};
pub use feature::Feature;
pub use filter::{Filter, FilterOperator};
pub use query::{EventTime, Join, JoinType, Query};
pub use source::{SourceGroup, StorageConnector};
