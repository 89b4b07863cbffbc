//! Field classifications sent to the remote service.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Relevance weight of a searchable field, highest priority first.
///
/// Serialized as its integer code (`High` = 0, `Med` = 1, `Low` = 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weight {
    /// Strongest relevance contribution.
    High,
    /// Medium relevance contribution.
    Med,
    /// Weakest relevance contribution.
    Low,
}

impl Weight {
    /// Integer code the remote API expects.
    pub fn code(&self) -> u8 {
        match self {
            Weight::High => 0,
            Weight::Med => 1,
            Weight::Low => 2,
        }
    }

    /// Looks a weight up by its integer code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Weight::High),
            1 => Some(Weight::Med),
            2 => Some(Weight::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Weight::High => "High",
            Weight::Med => "Med",
            Weight::Low => "Low",
        };
        f.write_str(label)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Weight::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown weight code {code}")))
    }
}

/// A searchable field with its relevance weight.
///
/// The remote API deserializes these positionally, so the wire form is the
/// two-element array `[name, weightCode]` rather than an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "(String, Weight)", from = "(String, Weight)")]
pub struct SearchableField {
    /// Field name as discovered by the analyzer
    pub name: String,
    /// Relevance weight
    pub weight: Weight,
}

impl SearchableField {
    /// Creates a searchable field.
    pub fn new(name: impl Into<String>, weight: Weight) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

impl From<SearchableField> for (String, Weight) {
    fn from(field: SearchableField) -> Self {
        (field.name, field.weight)
    }
}

impl From<(String, Weight)> for SearchableField {
    fn from((name, weight): (String, Weight)) -> Self {
        Self { name, weight }
    }
}

impl fmt::Display for SearchableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.weight)
    }
}

/// One of the five field classifications, in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Full-text relevance fields (with weights).
    Searchable,
    /// Fields usable in filters.
    Filterable,
    /// Fields the service aggregates value counts for.
    Facetable,
    /// Fields results can be ordered by.
    Sortable,
    /// Fields indexed at word/prefix level for partial matches.
    WordIndexing,
}

impl FieldCategory {
    /// All categories in the order they must be configured.
    pub const ALL: [FieldCategory; 5] = [
        FieldCategory::Searchable,
        FieldCategory::Filterable,
        FieldCategory::Facetable,
        FieldCategory::Sortable,
        FieldCategory::WordIndexing,
    ];

    /// Name of the endpoint that sets this category.
    pub fn set_endpoint(&self) -> &'static str {
        match self {
            FieldCategory::Searchable => "SetSearchableFields",
            FieldCategory::Filterable => "SetFilterableFields",
            FieldCategory::Facetable => "SetFacetableFields",
            FieldCategory::Sortable => "SetSortableFields",
            FieldCategory::WordIndexing => "SetWordIndexingFields",
        }
    }

    /// Name of the endpoint that reads this category back.
    pub fn get_endpoint(&self) -> &'static str {
        match self {
            FieldCategory::Searchable => "GetSearchableFields",
            FieldCategory::Filterable => "GetFilterableFields",
            FieldCategory::Facetable => "GetFacetableFields",
            FieldCategory::Sortable => "GetSortableFields",
            FieldCategory::WordIndexing => "GetWordIndexingFields",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldCategory::Searchable => "searchable",
            FieldCategory::Filterable => "filterable",
            FieldCategory::Facetable => "facetable",
            FieldCategory::Sortable => "sortable",
            FieldCategory::WordIndexing => "word-indexing",
        };
        f.write_str(label)
    }
}
