//! Filter and boost definitions plus the server-issued references to them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Weight;

/// Opaque filter identifier issued by the service.
///
/// Services hand out either numeric or string ids; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterId {
    /// Numeric id.
    Number(i64),
    /// String id (GUID, slug, ...).
    Text(String),
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterId::Number(n) => write!(f, "{n}"),
            FilterId::Text(s) => f.write_str(s),
        }
    }
}

/// Server-issued reference to a previously defined filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterProxy {
    /// Opaque id
    pub id: FilterId,
    /// Field the filter applies to
    #[serde(default)]
    pub field_name: String,
}

impl FilterProxy {
    /// Fills in `field_name` when the service left it out.
    pub fn or_field(mut self, field_name: &str) -> Self {
        if self.field_name.is_empty() {
            self.field_name = field_name.to_string();
        }
        self
    }
}

/// Keeps documents whose field lies between two limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter {
    /// Field to filter on
    pub field_name: String,
    /// Inclusive lower bound
    pub lower_limit: f64,
    /// Inclusive upper bound
    pub upper_limit: f64,
}

impl RangeFilter {
    /// Creates a range filter.
    pub fn new(field_name: impl Into<String>, lower_limit: f64, upper_limit: f64) -> Self {
        Self {
            field_name: field_name.into(),
            lower_limit,
            upper_limit,
        }
    }
}

/// Keeps documents whose field equals a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFilter {
    /// Field to filter on
    pub field_name: String,
    /// Value to match
    pub value: serde_json::Value,
}

impl ValueFilter {
    /// Creates a value filter.
    pub fn new(field_name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
        }
    }
}

/// Two issued filters joined with AND or OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedFilter {
    /// Left operand
    pub filter1: FilterProxy,
    /// Right operand
    pub filter2: FilterProxy,
    /// `true` for AND, `false` for OR
    pub use_and: bool,
}

impl CombinedFilter {
    /// Joins two issued filters with AND.
    pub fn and(filter1: FilterProxy, filter2: FilterProxy) -> Self {
        Self {
            filter1,
            filter2,
            use_and: true,
        }
    }

    /// Joins two issued filters with OR.
    pub fn or(filter1: FilterProxy, filter2: FilterProxy) -> Self {
        Self {
            filter1,
            filter2,
            use_and: false,
        }
    }
}

/// Raises the score of documents matching a resolved filter.
///
/// Sent to `CreateBoost` and echoed back by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boost {
    /// Filter the boost applies to
    pub filter: FilterProxy,
    /// Boost strength, same scale as field weights
    pub strength: Weight,
}

impl Boost {
    /// Creates a boost.
    pub fn new(filter: FilterProxy, strength: Weight) -> Self {
        Self { filter, strength }
    }
}
