#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Corpora Workflows Library
//!
//! The load workflow: drives one dataset from "does not exist" to
//! "searchable" on the remote service, one phase at a time.

pub mod filters;
pub mod load;
pub mod progress;
pub mod summary;

pub use filters::{FilterDemo, FilterStep};
pub use load::{LoadOptions, LoadWorkflow, PreparedLoad, prepare};
pub use progress::{NoopObserver, ProgressObserver};
pub use summary::{FieldCounts, LoadReport, LoadSummary, VerifiedRecord};

// Re-export core types
pub use corpora_core::{Error, Result};
