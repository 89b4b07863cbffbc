//! Best-effort filter and boost demonstration.
//!
//! The chain is range + value, then AND-combine, then boost. A failure at
//! any step skips the steps that depend on it and never fails the run.

use serde::Serialize;
use std::fmt;

use corpora_core::{Boost, CombinedFilter, ExampleFilters, FilterProxy, SearchService};

/// One step of the filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterStep {
    /// `CreateRangeFilter`
    RangeFilter,
    /// `CreateValueFilter`
    ValueFilter,
    /// `CombineFilters` with AND
    Combine,
    /// `CreateBoost`
    Boost,
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterStep::RangeFilter => "range filter",
            FilterStep::ValueFilter => "value filter",
            FilterStep::Combine => "combined filter",
            FilterStep::Boost => "boost",
        };
        f.write_str(label)
    }
}

/// Outcome of the filter demonstration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterDemo {
    /// The dataset declares no example filters.
    Skipped,
    /// At least one step failed; later steps were not attempted.
    Partial {
        /// Steps that succeeded
        completed: Vec<FilterStep>,
        /// Steps that failed, with the error text
        failed: Vec<(FilterStep, String)>,
    },
    /// Every step succeeded.
    Built {
        /// Proxy of the AND-combined filter
        combined: FilterProxy,
        /// Boost wrapped around it
        boost: Boost,
    },
}

impl FilterDemo {
    /// Returns `true` if the whole chain was built.
    pub fn is_built(&self) -> bool {
        matches!(self, FilterDemo::Built { .. })
    }
}

impl fmt::Display for FilterDemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterDemo::Skipped => f.write_str("skipped"),
            FilterDemo::Partial { completed, failed } => {
                write!(f, "partial ({} of 4 steps", completed.len())?;
                if let Some((step, _)) = failed.first() {
                    write!(f, ", {step} failed")?;
                }
                f.write_str(")")
            }
            FilterDemo::Built { combined, boost } => write!(
                f,
                "built (filter {} boosted {})",
                combined.id, boost.strength
            ),
        }
    }
}

/// Builds the example chain for `dataset`.
///
/// `on_failure` sees every failed step; the outcome records them as well.
pub async fn build_example_filters<F>(
    service: &dyn SearchService,
    dataset: &str,
    example: &ExampleFilters,
    mut on_failure: F,
) -> FilterDemo
where
    F: FnMut(FilterStep, &corpora_core::Error),
{
    let mut completed = Vec::new();
    let mut failed = Vec::new();
    let mut fail = |step: FilterStep, err: corpora_core::Error| {
        on_failure(step, &err);
        (step, err.to_string())
    };

    let range = match service.create_range_filter(dataset, &example.range).await {
        Ok(proxy) => {
            completed.push(FilterStep::RangeFilter);
            Some(proxy)
        }
        Err(e) => {
            failed.push(fail(FilterStep::RangeFilter, e));
            None
        }
    };

    let value = match service.create_value_filter(dataset, &example.value).await {
        Ok(proxy) => {
            completed.push(FilterStep::ValueFilter);
            Some(proxy)
        }
        Err(e) => {
            failed.push(fail(FilterStep::ValueFilter, e));
            None
        }
    };

    let (Some(range), Some(value)) = (range, value) else {
        return FilterDemo::Partial { completed, failed };
    };

    let combined = match service
        .combine_filters(dataset, &CombinedFilter::and(range, value))
        .await
    {
        Ok(proxy) => {
            completed.push(FilterStep::Combine);
            proxy
        }
        Err(e) => {
            failed.push(fail(FilterStep::Combine, e));
            return FilterDemo::Partial { completed, failed };
        }
    };

    match service
        .create_boost(
            dataset,
            &Boost::new(combined.clone(), example.boost_strength),
        )
        .await
    {
        Ok(boost) => FilterDemo::Built { combined, boost },
        Err(e) => {
            failed.push(fail(FilterStep::Boost, e));
            FilterDemo::Partial { completed, failed }
        }
    }
}
