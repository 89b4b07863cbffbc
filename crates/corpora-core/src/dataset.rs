//! Dataset descriptors and the registry they are resolved from.
//!
//! A [`DatasetDescriptor`] names the local JSON file of a dataset together
//! with its field classifications and the query used to verify it once it
//! is searchable. Descriptors are built once from a static table and never
//! mutated.

use serde::de::IgnoredAny;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{FieldCategory, RangeFilter, SearchableField, ValueFilter, Weight};

// ============================================================================
// DatasetDescriptor
// ============================================================================

/// Example filters a dataset can demonstrate after field configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleFilters {
    /// Range filter built first
    pub range: RangeFilter,
    /// Value filter built independently of the range filter
    pub value: ValueFilter,
    /// Strength of the boost wrapped around the combined filter
    pub boost_strength: Weight,
}

/// Immutable description of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    /// Dataset id, also the remote dataset name
    pub name: String,
    /// Path of the JSON document; relative paths resolve against the data directory
    pub file_path: PathBuf,
    /// Searchable fields, most relevant first
    pub searchable_fields: Vec<SearchableField>,
    /// Fields indexed at word level
    pub word_indexing_fields: Vec<String>,
    /// Fields usable in filters
    pub filterable_fields: Vec<String>,
    /// Fields with facet counts
    pub facetable_fields: Vec<String>,
    /// Fields results can be sorted by
    pub sortable_fields: Vec<String>,
    /// Query issued to verify the dataset
    pub test_query: String,
    /// Optional filter/boost demonstration
    pub example_filters: Option<ExampleFilters>,
}

impl DatasetDescriptor {
    /// Plain field names of a non-searchable category.
    ///
    /// For [`FieldCategory::Searchable`] this returns the names without weights.
    pub fn field_names(&self, category: FieldCategory) -> Vec<String> {
        match category {
            FieldCategory::Searchable => self
                .searchable_fields
                .iter()
                .map(|f| f.name.clone())
                .collect(),
            FieldCategory::Filterable => self.filterable_fields.clone(),
            FieldCategory::Facetable => self.facetable_fields.clone(),
            FieldCategory::Sortable => self.sortable_fields.clone(),
            FieldCategory::WordIndexing => self.word_indexing_fields.clone(),
        }
    }

    /// Number of fields declared for a category.
    pub fn field_count(&self, category: FieldCategory) -> usize {
        match category {
            FieldCategory::Searchable => self.searchable_fields.len(),
            FieldCategory::Filterable => self.filterable_fields.len(),
            FieldCategory::Facetable => self.facetable_fields.len(),
            FieldCategory::Sortable => self.sortable_fields.len(),
            FieldCategory::WordIndexing => self.word_indexing_fields.len(),
        }
    }

    /// First declared sortable field, used to order verification hits.
    pub fn primary_sort_field(&self) -> Option<&str> {
        self.sortable_fields.first().map(String::as_str)
    }

    /// Resolves the data file to an absolute path.
    pub fn resolve_file(&self, data_dir: &Path) -> PathBuf {
        let joined = if self.file_path.is_absolute() {
            self.file_path.clone()
        } else {
            data_dir.join(&self.file_path)
        };
        std::path::absolute(&joined).unwrap_or(joined)
    }
}

fn names(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_string()).collect()
}

fn tmdb() -> DatasetDescriptor {
    DatasetDescriptor {
        name: "tmdb".to_string(),
        file_path: PathBuf::from("tmdb.json"),
        searchable_fields: vec![
            SearchableField::new("title", Weight::High),
            SearchableField::new("original_title", Weight::Med),
            SearchableField::new("tagline", Weight::Med),
            SearchableField::new("overview", Weight::Low),
        ],
        word_indexing_fields: names(&["title", "overview"]),
        filterable_fields: names(&[
            "release_date",
            "vote_average",
            "popularity",
            "original_language",
            "genres",
        ]),
        facetable_fields: names(&["genres", "original_language"]),
        sortable_fields: names(&["popularity", "vote_average", "release_date"]),
        test_query: "titanic".to_string(),
        example_filters: None,
    }
}

fn pokedex() -> DatasetDescriptor {
    DatasetDescriptor {
        name: "pokedex".to_string(),
        file_path: PathBuf::from("pokedex.json"),
        searchable_fields: vec![
            SearchableField::new("name", Weight::High),
            SearchableField::new("type", Weight::Med),
            SearchableField::new("species", Weight::Med),
            SearchableField::new("description", Weight::Low),
        ],
        word_indexing_fields: names(&["name", "description"]),
        filterable_fields: names(&["type", "speed", "hp", "attack", "defense"]),
        facetable_fields: names(&["type"]),
        sortable_fields: names(&["speed", "hp"]),
        // Deliberately a partial term: exercises word-indexing matches.
        test_query: "raic".to_string(),
        example_filters: Some(ExampleFilters {
            range: RangeFilter::new("speed", 10.5, 50.0),
            value: ValueFilter::new("speed", 50),
            boost_strength: Weight::High,
        }),
    }
}

// ============================================================================
// DatasetRegistry
// ============================================================================

/// Case-insensitive lookup of dataset descriptors.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    datasets: Vec<DatasetDescriptor>,
}

impl DatasetRegistry {
    /// Registry with the built-in datasets.
    pub fn builtin() -> Self {
        Self::new(vec![tmdb(), pokedex()])
    }

    /// Registry over an explicit set of descriptors.
    pub fn new(datasets: Vec<DatasetDescriptor>) -> Self {
        Self { datasets }
    }

    /// Looks a dataset up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&DatasetDescriptor> {
        let name = name.trim();
        self.datasets
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Looks a dataset up, failing with the list of valid names.
    pub fn resolve(&self, name: &str) -> Result<&DatasetDescriptor> {
        self.get(name).ok_or_else(|| Error::DatasetNotFound {
            name: name.to_string(),
            available: self.names(),
        })
    }

    /// Registered dataset names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.name.clone()).collect()
    }

    /// Iterates the registered descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.iter()
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Data file checks
// ============================================================================

/// Checks that `path` exists, is non-empty and holds one JSON document.
///
/// Returns the file size in bytes. The document is parsed without being
/// materialized.
pub fn validate_data_file(path: &Path) -> Result<u64> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::data_file(path, "file not found"));
        }
        Err(e) => return Err(Error::data_file(path, e.to_string())),
    };

    if !metadata.is_file() {
        return Err(Error::data_file(path, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(Error::data_file(path, "file is empty"));
    }

    let file = File::open(path).map_err(|e| Error::data_file(path, e.to_string()))?;
    serde_json::from_reader::<_, IgnoredAny>(BufReader::new(file))
        .map_err(|e| Error::data_file(path, format!("not valid JSON: {e}")))?;

    tracing::debug!(path = %path.display(), bytes = metadata.len(), "Data file validated");

    Ok(metadata.len())
}
