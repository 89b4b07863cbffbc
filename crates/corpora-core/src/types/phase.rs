//! Load workflow phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A step of the load workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Create or open the dataset session.
    Open,
    /// Send the raw file so the service can infer field shapes.
    Analyze,
    /// Declare the five field classifications.
    ConfigureFields,
    /// Build the optional example filters and boost.
    Filters,
    /// Stream the data file.
    Load,
    /// Poll until loading settles.
    WaitForLoad,
    /// Trigger index construction.
    Index,
    /// Poll until the index is ready.
    WaitForIndex,
    /// Run the test query and fetch the hits.
    Verify,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 9] = [
        Phase::Open,
        Phase::Analyze,
        Phase::ConfigureFields,
        Phase::Filters,
        Phase::Load,
        Phase::WaitForLoad,
        Phase::Index,
        Phase::WaitForIndex,
        Phase::Verify,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Open => "Open",
            Phase::Analyze => "Analyze",
            Phase::ConfigureFields => "Configure fields",
            Phase::Filters => "Filters",
            Phase::Load => "Load",
            Phase::WaitForLoad => "Wait for load",
            Phase::Index => "Index",
            Phase::WaitForIndex => "Wait for index",
            Phase::Verify => "Verify",
        };
        f.write_str(label)
    }
}
