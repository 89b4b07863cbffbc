//! Scriptable in-memory [`SearchService`].

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{SearchService, endpoint};
use crate::error::{Error, Result};
use crate::types::{
    Boost, CombinedFilter, DocumentKey, FieldCategory, FilterId, FilterProxy, RangeFilter,
    ScoredRecord, SearchQuery, SearchResult, SearchableField, SystemState, SystemStatus,
    ValueFilter,
};

/// One request received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Endpoint name (see [`endpoint`])
    pub endpoint: &'static str,
    /// Dataset the request targeted
    pub dataset: String,
    /// JSON body, when the request carried one
    pub body: Option<serde_json::Value>,
}

/// In-memory search service that records every call.
///
/// Status snapshots come from a script: each `status` call pops the next
/// entry, `None` entries fail the fetch, and once the script is exhausted
/// the last scripted state repeats (`Ready` if nothing was scripted).
pub struct MockSearchService {
    calls: Mutex<Vec<MockCall>>,
    failing: HashSet<&'static str>,
    null_analysis: bool,
    states: Mutex<VecDeque<Option<SystemState>>>,
    last_state: Mutex<SystemState>,
    error_message: Option<String>,
    record_count: u64,
    discovered_fields: Vec<String>,
    search_result: SearchResult,
    stored_fields: Mutex<BTreeMap<FieldCategory, Vec<String>>>,
    next_filter_id: AtomicI64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockSearchService {
    /// Creates a mock where every call succeeds and the dataset is `Ready`.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: HashSet::new(),
            null_analysis: false,
            states: Mutex::new(VecDeque::new()),
            last_state: Mutex::new(SystemState::Ready),
            error_message: None,
            record_count: 2,
            discovered_fields: vec!["id".to_string(), "title".to_string()],
            search_result: SearchResult {
                records: vec![
                    ScoredRecord {
                        document_key: 1,
                        score: 2.5,
                    },
                    ScoredRecord {
                        document_key: 2,
                        score: 1.0,
                    },
                ],
                ..Default::default()
            },
            stored_fields: Mutex::new(BTreeMap::new()),
            next_filter_id: AtomicI64::new(1),
        }
    }

    /// Makes every request to `endpoint` answer HTTP 500.
    pub fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing.insert(endpoint);
        self
    }

    /// Makes `AnalyzeString` answer `null`.
    pub fn with_null_analysis(mut self) -> Self {
        self.null_analysis = true;
        self
    }

    /// Appends states to the status script.
    pub fn with_states<I>(self, states: I) -> Self
    where
        I: IntoIterator<Item = SystemState>,
    {
        lock(&self.states).extend(states.into_iter().map(Some));
        self
    }

    /// Appends a failing fetch to the status script.
    pub fn then_status_error(self) -> Self {
        lock(&self.states).push_back(None);
        self
    }

    /// Error message reported alongside `Error` states.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Record count reported by `GetNumberOfJsonRecordsInDb`.
    pub fn with_record_count(mut self, count: u64) -> Self {
        self.record_count = count;
        self
    }

    /// Fields reported by `GetAllFields`.
    pub fn with_discovered_fields(mut self, fields: Vec<String>) -> Self {
        self.discovered_fields = fields;
        self
    }

    /// Result returned by every search.
    pub fn with_search_result(mut self, result: SearchResult) -> Self {
        self.search_result = result;
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Endpoint names of every call received so far, in order.
    pub fn endpoints(&self) -> Vec<&'static str> {
        lock(&self.calls).iter().map(|c| c.endpoint).collect()
    }

    /// Number of calls received for `endpoint`.
    pub fn call_count(&self, endpoint: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    /// Body of the most recent call to `endpoint`.
    pub fn last_body(&self, endpoint: &str) -> Option<serde_json::Value> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|c| c.endpoint == endpoint)
            .and_then(|c| c.body.clone())
    }

    fn record(
        &self,
        endpoint: &'static str,
        dataset: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        lock(&self.calls).push(MockCall {
            endpoint,
            dataset: dataset.to_string(),
            body,
        });

        if self.failing.contains(endpoint) {
            return Err(Error::Status {
                endpoint: format!("{endpoint}/{dataset}"),
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }

    fn issue_proxy(&self, field_name: &str) -> FilterProxy {
        FilterProxy {
            id: FilterId::Number(self.next_filter_id.fetch_add(1, Ordering::SeqCst)),
            field_name: field_name.to_string(),
        }
    }
}

impl Default for MockSearchService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn create_or_open(&self, dataset: &str) -> Result<()> {
        self.record(endpoint::CREATE_OR_OPEN, dataset, None)
    }

    async fn analyze(&self, dataset: &str, content: String) -> Result<serde_json::Value> {
        self.record(
            endpoint::ANALYZE_STRING,
            dataset,
            Some(serde_json::json!({ "length": content.len() })),
        )?;
        if self.null_analysis {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::json!({ "fields": self.discovered_fields }))
    }

    async fn all_fields(&self, dataset: &str) -> Result<Vec<String>> {
        self.record(endpoint::GET_ALL_FIELDS, dataset, None)?;
        Ok(self.discovered_fields.clone())
    }

    async fn set_searchable_fields(
        &self,
        dataset: &str,
        fields: &[SearchableField],
    ) -> Result<()> {
        self.record(
            FieldCategory::Searchable.set_endpoint(),
            dataset,
            Some(serde_json::to_value(fields)?),
        )?;
        lock(&self.stored_fields).insert(
            FieldCategory::Searchable,
            fields.iter().map(ToString::to_string).collect(),
        );
        Ok(())
    }

    async fn set_fields(
        &self,
        dataset: &str,
        category: FieldCategory,
        fields: &[String],
    ) -> Result<()> {
        self.record(
            category.set_endpoint(),
            dataset,
            Some(serde_json::to_value(fields)?),
        )?;
        lock(&self.stored_fields).insert(category, fields.to_vec());
        Ok(())
    }

    async fn fields(&self, dataset: &str, category: FieldCategory) -> Result<Vec<String>> {
        self.record(category.get_endpoint(), dataset, None)?;
        Ok(lock(&self.stored_fields)
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_range_filter(
        &self,
        dataset: &str,
        filter: &RangeFilter,
    ) -> Result<FilterProxy> {
        self.record(
            endpoint::CREATE_RANGE_FILTER,
            dataset,
            Some(serde_json::to_value(filter)?),
        )?;
        Ok(self.issue_proxy(&filter.field_name))
    }

    async fn create_value_filter(
        &self,
        dataset: &str,
        filter: &ValueFilter,
    ) -> Result<FilterProxy> {
        self.record(
            endpoint::CREATE_VALUE_FILTER,
            dataset,
            Some(serde_json::to_value(filter)?),
        )?;
        Ok(self.issue_proxy(&filter.field_name))
    }

    async fn combine_filters(&self, dataset: &str, filter: &CombinedFilter) -> Result<FilterProxy> {
        self.record(
            endpoint::COMBINE_FILTERS,
            dataset,
            Some(serde_json::to_value(filter)?),
        )?;
        Ok(self.issue_proxy(&filter.filter1.field_name))
    }

    async fn create_boost(&self, dataset: &str, boost: &Boost) -> Result<Boost> {
        self.record(
            endpoint::CREATE_BOOST,
            dataset,
            Some(serde_json::to_value(boost)?),
        )?;
        Ok(boost.clone())
    }

    async fn load_file(&self, dataset: &str, path: &Path) -> Result<()> {
        let bytes = tokio::fs::metadata(path).await?.len();
        self.record(
            endpoint::LOAD_STREAM,
            dataset,
            Some(serde_json::json!({ "contentLength": bytes })),
        )
    }

    async fn index(&self, dataset: &str) -> Result<()> {
        self.record(endpoint::INDEX_DATA_SET, dataset, None)
    }

    async fn status(&self, dataset: &str) -> Result<SystemStatus> {
        self.record(endpoint::GET_STATUS, dataset, None)?;

        let next = lock(&self.states).pop_front();
        let state = match next {
            Some(Some(state)) => {
                *lock(&self.last_state) = state;
                state
            }
            Some(None) => {
                return Err(Error::request(
                    format!("{}/{dataset}", endpoint::GET_STATUS),
                    "mock status failure",
                ));
            }
            None => *lock(&self.last_state),
        };

        let mut status = SystemStatus::new(state).with_document_count(self.record_count);
        if state == SystemState::Error {
            status.error_message = self.error_message.clone();
        }
        Ok(status)
    }

    async fn record_count(&self, dataset: &str) -> Result<u64> {
        self.record(endpoint::GET_RECORD_COUNT, dataset, None)?;
        Ok(self.record_count)
    }

    async fn search(&self, dataset: &str, query: &SearchQuery) -> Result<SearchResult> {
        self.record(
            endpoint::SEARCH,
            dataset,
            Some(serde_json::to_value(query)?),
        )?;
        let mut result = self.search_result.clone();
        if let Some(max) = query.max_results {
            result.truncated = result.records.len() > max;
            result.records.truncate(max);
        }
        Ok(result)
    }

    async fn documents(&self, dataset: &str, keys: &[DocumentKey]) -> Result<Vec<String>> {
        self.record(
            endpoint::GET_JSON,
            dataset,
            Some(serde_json::to_value(keys)?),
        )?;
        Ok(keys.iter().map(|k| format!("{{\"id\":{k}}}")).collect())
    }
}
