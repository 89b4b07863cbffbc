#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Corpora Core Library
//!
//! Shared types, errors, the dataset registry and the [`SearchService`]
//! seam used by the load workflow and the HTTP client.
//!
//! # Modules
//!
//! - [`error`]: Error type, remediation hints and Result alias
//! - [`types`]: Wire types exchanged with the remote search service
//! - [`dataset`]: Static dataset descriptors and their registry
//! - [`service`]: The remote service trait plus an in-memory mock
//! - [`poll`]: Interval polling of the dataset lifecycle state

pub mod dataset;
pub mod error;
pub mod poll;
pub mod service;
pub mod types;

// Re-exports for convenience
pub use dataset::{DatasetDescriptor, DatasetRegistry, ExampleFilters};
pub use error::{Error, Result};
pub use poll::{PollOutcome, PollSpec, PollStep};
pub use service::{MockCall, MockSearchService, SearchService};
pub use types::{
    Boost, CombinedFilter, DocumentKey, FieldCategory, FilterId, FilterProxy, Phase, RangeFilter,
    ScoredRecord, SearchQuery, SearchResult, SearchableField, SystemState, SystemStatus,
    ValueFilter, Weight,
};
