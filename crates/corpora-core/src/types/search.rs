//! Search request and response types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Boost, FilterProxy};

/// Key the service assigns to each stored document.
pub type DocumentKey = u64;

/// A search request sent to `Search/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Query text
    pub text: String,

    /// Maximum number of records to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,

    /// Field to sort by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// Sort direction when `sort_by` is set
    #[serde(default)]
    pub sort_descending: bool,

    /// Filter to restrict results to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterProxy>,

    /// Boosts to apply when `enable_boost` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boosts: Vec<Boost>,

    /// Ask for facet counts
    #[serde(default)]
    pub enable_facets: bool,

    /// Apply `boosts`
    #[serde(default)]
    pub enable_boost: bool,

    /// Collapse duplicate documents
    #[serde(default)]
    pub remove_duplicates: bool,
}

impl SearchQuery {
    /// Creates a query for the given text with every feature off.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Caps the number of returned records.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Sorts results by a field.
    pub fn sorted_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.sort_by = Some(field.into());
        self.sort_descending = descending;
        self
    }

    /// Restricts results to an issued filter.
    pub fn with_filter(mut self, filter: FilterProxy) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Adds a boost and turns boosting on.
    pub fn with_boost(mut self, boost: Boost) -> Self {
        self.boosts.push(boost);
        self.enable_boost = true;
        self
    }

    /// Turns facet counting on.
    pub fn with_facets(mut self) -> Self {
        self.enable_facets = true;
        self
    }
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecord {
    /// Key to fetch the original document with
    pub document_key: DocumentKey,
    /// Relevance score
    pub score: f64,
}

/// Response of `Search/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Hits in rank order
    #[serde(default)]
    pub records: Vec<ScoredRecord>,

    /// Facet name to value to count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<String, BTreeMap<String, u64>>>,

    /// Whether the service cut the result list short
    #[serde(default)]
    pub truncated: bool,

    /// Total matches before truncation, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl SearchResult {
    /// Returns `true` if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of hits returned.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
