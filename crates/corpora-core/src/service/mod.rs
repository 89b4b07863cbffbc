//! The remote search service seam.
//!
//! [`SearchService`] is everything the load workflow needs from the remote
//! side. The HTTP implementation lives in `corpora-client`; the in-memory
//! [`MockSearchService`] backs tests and dry runs.

mod mock;

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::types::{
    Boost, CombinedFilter, DocumentKey, FieldCategory, FilterProxy, RangeFilter, SearchQuery,
    SearchResult, SearchableField, SystemStatus, ValueFilter,
};

pub use mock::{MockCall, MockSearchService};

/// Endpoint names, relative to the service's `api/` prefix.
pub mod endpoint {
    /// `PUT CreateOrOpen/{name}`
    pub const CREATE_OR_OPEN: &str = "CreateOrOpen";
    /// `POST AnalyzeString/{name}`
    pub const ANALYZE_STRING: &str = "AnalyzeString";
    /// `GET GetAllFields/{name}`
    pub const GET_ALL_FIELDS: &str = "GetAllFields";
    /// `PUT CreateRangeFilter/{name}`
    pub const CREATE_RANGE_FILTER: &str = "CreateRangeFilter";
    /// `PUT CreateValueFilter/{name}`
    pub const CREATE_VALUE_FILTER: &str = "CreateValueFilter";
    /// `PUT CombineFilters/{name}`
    pub const COMBINE_FILTERS: &str = "CombineFilters";
    /// `PUT CreateBoost/{name}`
    pub const CREATE_BOOST: &str = "CreateBoost";
    /// `PUT LoadStream/{name}`
    pub const LOAD_STREAM: &str = "LoadStream";
    /// `GET IndexDataSet/{name}`
    pub const INDEX_DATA_SET: &str = "IndexDataSet";
    /// `GET GetStatus/{name}`
    pub const GET_STATUS: &str = "GetStatus";
    /// `GET GetNumberOfJsonRecordsInDb/{name}`
    pub const GET_RECORD_COUNT: &str = "GetNumberOfJsonRecordsInDb";
    /// `POST Search/{name}`
    pub const SEARCH: &str = "Search";
    /// `POST GetJson/{name}`
    pub const GET_JSON: &str = "GetJson";
    /// `POST login`
    pub const LOGIN: &str = "login";
}

/// Operations the remote search service exposes for one dataset.
///
/// Every method takes the dataset name and maps to exactly one HTTP request.
/// Implementations must surface transport failures as
/// [`Error::Request`](crate::Error::Request) and non-2xx answers as
/// [`Error::Status`](crate::Error::Status).
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Creates the dataset, or opens it if it already exists.
    async fn create_or_open(&self, dataset: &str) -> Result<()>;

    /// Sends raw text so the service can infer field shapes.
    ///
    /// Returns the analysis body; `null` means the service could not analyze it.
    async fn analyze(&self, dataset: &str, content: String) -> Result<serde_json::Value>;

    /// Lists the fields discovered by analysis.
    async fn all_fields(&self, dataset: &str) -> Result<Vec<String>>;

    /// Declares the searchable fields with their weights.
    async fn set_searchable_fields(&self, dataset: &str, fields: &[SearchableField])
    -> Result<()>;

    /// Declares the fields of a non-searchable category.
    async fn set_fields(
        &self,
        dataset: &str,
        category: FieldCategory,
        fields: &[String],
    ) -> Result<()>;

    /// Reads a category back; searchable entries render as `name (Weight)`.
    async fn fields(&self, dataset: &str, category: FieldCategory) -> Result<Vec<String>>;

    /// Defines a range filter.
    async fn create_range_filter(&self, dataset: &str, filter: &RangeFilter)
    -> Result<FilterProxy>;

    /// Defines a value filter.
    async fn create_value_filter(&self, dataset: &str, filter: &ValueFilter)
    -> Result<FilterProxy>;

    /// Combines two issued filters.
    async fn combine_filters(&self, dataset: &str, filter: &CombinedFilter) -> Result<FilterProxy>;

    /// Defines a boost over an issued filter.
    async fn create_boost(&self, dataset: &str, boost: &Boost) -> Result<Boost>;

    /// Streams the data file as the dataset payload.
    async fn load_file(&self, dataset: &str, path: &Path) -> Result<()>;

    /// Triggers index construction.
    async fn index(&self, dataset: &str) -> Result<()>;

    /// Fetches the current status snapshot.
    async fn status(&self, dataset: &str) -> Result<SystemStatus>;

    /// Number of JSON records the service holds.
    async fn record_count(&self, dataset: &str) -> Result<u64>;

    /// Runs a search.
    async fn search(&self, dataset: &str, query: &SearchQuery) -> Result<SearchResult>;

    /// Fetches the original JSON documents for the given keys.
    async fn documents(&self, dataset: &str, keys: &[DocumentKey]) -> Result<Vec<String>>;
}
