//! Tests for error rendering, phase attribution and remediation hints.

use std::time::Duration;

use corpora_core::{Error, Phase, SystemState};
use corpora_workflows::{FilterDemo, FilterStep};

#[test]
fn test_timeout_reports_its_phase() {
    let err = Error::Timeout {
        phase: Phase::WaitForIndex,
        waited: Duration::from_secs(30),
        last_state: Some(SystemState::Indexing),
    };
    assert_eq!(err.phase(), Some(Phase::WaitForIndex));
    assert_eq!(
        err.to_string(),
        "Timed out after 30s waiting for Wait for index (last state: Indexing)"
    );
    assert!(err.hints()[0].contains("--index-timeout"));
}

#[test]
fn test_state_error_without_message() {
    let err = Error::StateError {
        phase: Phase::WaitForLoad,
        state: SystemState::Error,
        message: None,
    };
    assert_eq!(
        err.to_string(),
        "Dataset entered state Error during Wait for load"
    );
    assert!(!err.is_local());
}

#[test]
fn test_phase_wrapping_keeps_root() {
    let err = Error::EmptyResult {
        query: "raic".to_string(),
    }
    .in_phase(Phase::Verify);

    assert_eq!(err.phase(), Some(Phase::Verify));
    assert_eq!(
        err.to_string(),
        "Verify failed: Test query 'raic' returned no results"
    );
    match err.root() {
        Error::EmptyResult { query } => assert_eq!(query, "raic"),
        other => unreachable!("Expected EmptyResult, got {other:?}"),
    }
}

#[test]
fn test_local_errors() {
    assert!(Error::config("no base URL").is_local());
    assert!(Error::data_file("/tmp/x.json", "file is empty").is_local());
    assert!(
        Error::data_file("/tmp/x.json", "file is empty")
            .in_phase(Phase::Analyze)
            .is_local()
    );
    assert!(!Error::request("CreateOrOpen/x", "refused").is_local());
}

#[test]
fn test_open_hints_only_for_open_phase() {
    let open = Error::request("CreateOrOpen/tmdb", "connection refused").in_phase(Phase::Open);
    assert_eq!(open.hints().len(), 2);

    let load = Error::request("LoadStream/tmdb", "connection reset").in_phase(Phase::Load);
    assert_eq!(load.hints().len(), 1);
}

#[test]
fn test_unauthorized_status_hint() {
    let err = Error::Status {
        endpoint: "IndexDataSet/tmdb".to_string(),
        status: 403,
        body: String::new(),
    };
    assert!(err.hints()[0].contains("credentials"));

    let server_error = Error::Status {
        endpoint: "IndexDataSet/tmdb".to_string(),
        status: 503,
        body: String::new(),
    };
    assert!(server_error.hints().is_empty());
}

#[test]
fn test_partial_filter_demo_without_failures_renders() {
    let demo = FilterDemo::Partial {
        completed: vec![FilterStep::RangeFilter, FilterStep::ValueFilter],
        failed: Vec::new(),
    };
    assert_eq!(demo.to_string(), "partial (2 of 4 steps)");
    assert!(!demo.is_built());
}

#[test]
fn test_filter_step_labels() {
    assert_eq!(FilterStep::Combine.to_string(), "combined filter");
    assert_eq!(FilterStep::Boost.to_string(), "boost");
}

