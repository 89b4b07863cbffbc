//! Dataset lifecycle state as reported by the remote service.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a dataset on the remote service.
///
/// The service walks a dataset through these states in declaration order;
/// `Error` and `Hibernated` can be entered from any of them. On the wire the
/// state appears either as its ordinal or as its name; both decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SystemState {
    /// Dataset exists but holds no data.
    Created,
    /// Data is being ingested.
    Loading,
    /// Data is ingested; no index yet.
    Loaded,
    /// Index construction is running.
    Indexing,
    /// Dataset is searchable.
    Ready,
    /// The service reported a failure.
    Error,
    /// Dataset has been unloaded from memory.
    Hibernated,
}

impl SystemState {
    /// All states in ordinal order.
    pub const ALL: [SystemState; 7] = [
        SystemState::Created,
        SystemState::Loading,
        SystemState::Loaded,
        SystemState::Indexing,
        SystemState::Ready,
        SystemState::Error,
        SystemState::Hibernated,
    ];

    /// Wire ordinal of this state.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Looks a state up by its wire ordinal.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Returns the variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemState::Created => "Created",
            SystemState::Loading => "Loading",
            SystemState::Loaded => "Loaded",
            SystemState::Indexing => "Indexing",
            SystemState::Ready => "Ready",
            SystemState::Error => "Error",
            SystemState::Hibernated => "Hibernated",
        }
    }

    /// Returns `true` if the dataset is searchable.
    pub fn is_ready(&self) -> bool {
        matches!(self, SystemState::Ready)
    }

    /// Returns `true` if the dataset cannot make progress on its own.
    pub fn is_failure(&self) -> bool {
        matches!(self, SystemState::Error | SystemState::Hibernated)
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown system state '{s}'"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StateRepr {
    Code(u8),
    Name(String),
}

impl<'de> Deserialize<'de> for SystemState {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StateRepr::deserialize(deserializer)? {
            StateRepr::Code(code) => SystemState::from_code(code)
                .ok_or_else(|| de::Error::custom(format!("unknown system state code {code}"))),
            StateRepr::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Snapshot returned by `GetStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    /// Current lifecycle state
    pub system_state: SystemState,

    /// Number of documents the service holds
    #[serde(default)]
    pub document_count: u64,

    /// Error message when `system_state` is `Error`
    #[serde(default)]
    pub error_message: Option<String>,

    /// Milliseconds spent loading, as measured by the service
    #[serde(default)]
    pub loading_time_ms: Option<u64>,

    /// Milliseconds spent indexing, as measured by the service
    #[serde(default)]
    pub indexing_time_ms: Option<u64>,
}

impl SystemStatus {
    /// Creates a bare snapshot in the given state.
    pub fn new(system_state: SystemState) -> Self {
        Self {
            system_state,
            document_count: 0,
            error_message: None,
            loading_time_ms: None,
            indexing_time_ms: None,
        }
    }

    /// Sets the document count.
    pub fn with_document_count(mut self, count: u64) -> Self {
        self.document_count = count;
        self
    }

    /// Sets the error message.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}
