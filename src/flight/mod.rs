//! Flight server communication module.
//!
//! The flight server materializes queries server-side. This module holds
//! the translation from a composed [`Query`](crate::query::Query) into the
//! server's payload shape, and the transport that carries it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     quiver (Rust + Tokio)                  │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  FlightTranslator                                    │  │
//! │  │  - rewrites execution strings for the server dialect │  │
//! │  │  - collects the table map and merged filters         │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                           │                                │
//! │                           ▼                                │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  ActionClient (ActionTransport)                      │  │
//! │  │  - NDJSON envelopes over TCP                         │  │
//! │  │  - request IDs for concurrent request correlation    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └───────────────────────────│────────────────────────────────┘
//!                             │ by action name, opaque body
//!                             ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │              Flight server (materialization engine)        │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod error;
pub mod protocol;
mod translator;

pub use client::{ActionClient, ActionTransport};
pub use error::{FlightError, FlightResult};
pub use translator::{strip_store_suffix, training_dataset_path, FlightTranslator};
