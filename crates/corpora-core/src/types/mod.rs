//! Wire and domain types shared by the client and the workflow.

mod fields;
mod filter;
mod phase;
mod proptests;
mod search;
mod state;

pub use fields::{FieldCategory, SearchableField, Weight};
pub use filter::{Boost, CombinedFilter, FilterId, FilterProxy, RangeFilter, ValueFilter};
pub use phase::Phase;
pub use search::{DocumentKey, ScoredRecord, SearchQuery, SearchResult};
pub use state::{SystemState, SystemStatus};
