//! What a finished load run reports.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use corpora_core::{DatasetDescriptor, DocumentKey, FieldCategory};

use crate::filters::FilterDemo;

/// Number of declared fields per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCounts {
    /// Searchable fields
    pub searchable: usize,
    /// Filterable fields
    pub filterable: usize,
    /// Facetable fields
    pub facetable: usize,
    /// Sortable fields
    pub sortable: usize,
    /// Word-indexing fields
    pub word_indexing: usize,
}

impl FieldCounts {
    /// Counts the fields a descriptor declares.
    pub fn of(descriptor: &DatasetDescriptor) -> Self {
        Self {
            searchable: descriptor.field_count(FieldCategory::Searchable),
            filterable: descriptor.field_count(FieldCategory::Filterable),
            facetable: descriptor.field_count(FieldCategory::Facetable),
            sortable: descriptor.field_count(FieldCategory::Sortable),
            word_indexing: descriptor.field_count(FieldCategory::WordIndexing),
        }
    }

    /// Count for one category.
    pub fn get(&self, category: FieldCategory) -> usize {
        match category {
            FieldCategory::Searchable => self.searchable,
            FieldCategory::Filterable => self.filterable,
            FieldCategory::Facetable => self.facetable,
            FieldCategory::Sortable => self.sortable,
            FieldCategory::WordIndexing => self.word_indexing,
        }
    }
}

/// One verification hit with its original document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedRecord {
    /// Key assigned by the service
    pub document_key: DocumentKey,
    /// Relevance score
    pub score: f64,
    /// Raw JSON document; `None` when fetching it failed
    pub document: Option<String>,
}

/// Everything a successful run observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    /// Dataset name
    pub dataset: String,
    /// Size of the uploaded file in bytes
    pub file_bytes: u64,
    /// Fields discovered by analysis; `None` when the listing failed
    pub discovered_fields: Option<Vec<String>>,
    /// Declared field counts
    pub field_counts: FieldCounts,
    /// Fields read back per category after configuration
    pub field_readback: BTreeMap<FieldCategory, Vec<String>>,
    /// Outcome of the filter demonstration
    pub filter_demo: FilterDemo,
    /// Records the service holds after loading
    pub record_count: u64,
    /// Upload plus load wait
    pub load_duration: Duration,
    /// Index trigger plus index wait
    pub index_duration: Duration,
    /// Query used for verification
    pub test_query: String,
    /// Verification hits in rank order
    pub verification: Vec<VerifiedRecord>,
    /// Best-effort failures, in the order they happened
    pub warnings: Vec<String>,
}

impl LoadReport {
    /// The headline numbers of the run.
    pub fn summary(&self) -> LoadSummary<'_> {
        LoadSummary { report: self }
    }
}

/// Multi-line human-readable summary of a [`LoadReport`].
#[derive(Debug, Clone, Copy)]
pub struct LoadSummary<'a> {
    report: &'a LoadReport,
}

impl fmt::Display for LoadSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        writeln!(f, "Dataset:        {}", r.dataset)?;
        writeln!(f, "Records:        {}", r.record_count)?;
        let counts = FieldCategory::ALL
            .iter()
            .map(|c| format!("{c} {}", r.field_counts.get(*c)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Fields:         {counts}")?;
        writeln!(f, "Load time:      {:.2}s", r.load_duration.as_secs_f64())?;
        writeln!(f, "Index time:     {:.2}s", r.index_duration.as_secs_f64())?;
        writeln!(
            f,
            "Test query:     '{}' returned {} result(s)",
            r.test_query,
            r.verification.len()
        )?;
        write!(f, "Filter demo:    {}", r.filter_demo)?;
        if !r.warnings.is_empty() {
            write!(f, "\nWarnings:       {}", r.warnings.len())?;
        }
        Ok(())
    }
}
