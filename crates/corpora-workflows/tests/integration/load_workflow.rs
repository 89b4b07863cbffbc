//! Phase-level behavior of the load workflow: waits, aborts and warnings.

use std::time::Duration;

use corpora_core::service::endpoint;
use corpora_core::{
    DatasetRegistry, Error, FieldCategory, MockSearchService, Phase, SearchResult, SystemState,
};
use corpora_workflows::FilterDemo;

use crate::common::{Event, TestHarness};

async fn run(harness: &TestHarness, dataset: &str) -> corpora_core::Result<corpora_workflows::LoadReport> {
    harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), dataset)
        .await
}

// ============================================================================
// Status waits
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_load_wait_never_exits_while_loading() {
    let harness = TestHarness::with_service(MockSearchService::new().with_states([
        SystemState::Loading,
        SystemState::Loading,
        SystemState::Loading,
        SystemState::Loaded,
        SystemState::Indexing,
        SystemState::Ready,
    ]));

    let report = run(&harness, "tmdb").await.unwrap();

    let load_polls = harness.observer.polled(Phase::WaitForLoad);
    let states: Vec<_> = load_polls.iter().map(|s| s.system_state).collect();
    assert_eq!(
        states,
        vec![
            SystemState::Loading,
            SystemState::Loading,
            SystemState::Loading,
            SystemState::Loaded
        ]
    );
    assert!(report.load_duration >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_load_wait_accepts_any_settled_state() {
    let harness = TestHarness::with_service(
        MockSearchService::new().with_states([SystemState::Loading, SystemState::Created]),
    );
    // The exhausted script keeps answering Created, so the index wait never ends.
    let options = harness
        .options()
        .with_index_timeout(Some(Duration::from_secs(1)));

    let err = harness
        .workflow_with(options)
        .run_dataset(&DatasetRegistry::builtin(), "tmdb")
        .await
        .unwrap_err();

    assert_eq!(harness.observer.polled(Phase::WaitForLoad).len(), 2);
    assert_eq!(harness.service.call_count(endpoint::INDEX_DATA_SET), 1);
    assert!(matches!(
        err,
        Error::Timeout { phase: Phase::WaitForIndex, last_state: Some(SystemState::Created), .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_load_error_state_aborts_before_index() {
    let harness = TestHarness::with_service(
        MockSearchService::new()
            .with_states([SystemState::Loading, SystemState::Error])
            .with_error_message("malformed record at line 3"),
    );

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert!(matches!(
        err,
        Error::StateError { phase: Phase::WaitForLoad, state: SystemState::Error, ref message }
            if message.as_deref() == Some("malformed record at line 3")
    ));
    assert_eq!(harness.service.call_count(endpoint::GET_RECORD_COUNT), 0);
    assert_eq!(harness.service.call_count(endpoint::INDEX_DATA_SET), 0);
}

#[tokio::test(start_paused = true)]
async fn test_index_wait_exits_on_ready_only() {
    let harness = TestHarness::with_service(MockSearchService::new().with_states([
        SystemState::Loaded,
        SystemState::Loaded,
        SystemState::Indexing,
        SystemState::Indexing,
        SystemState::Ready,
    ]));

    run(&harness, "tmdb").await.unwrap();

    let states: Vec<_> = harness
        .observer
        .polled(Phase::WaitForIndex)
        .iter()
        .map(|s| s.system_state)
        .collect();
    assert_eq!(
        states,
        vec![
            SystemState::Loaded,
            SystemState::Indexing,
            SystemState::Indexing,
            SystemState::Ready
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_index_wait_hibernated_aborts_before_verify() {
    let harness = TestHarness::with_service(MockSearchService::new().with_states([
        SystemState::Loaded,
        SystemState::Indexing,
        SystemState::Hibernated,
    ]));

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::WaitForIndex));
    assert!(matches!(err, Error::StateError { state: SystemState::Hibernated, .. }));
    assert_eq!(harness.service.call_count(endpoint::SEARCH), 0);
}

#[tokio::test(start_paused = true)]
async fn test_status_fetch_error_aborts_wait() {
    let harness = TestHarness::with_service(
        MockSearchService::new()
            .with_states([SystemState::Loading])
            .then_status_error(),
    );

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::WaitForLoad));
    assert!(matches!(err.root(), Error::Request { .. }));
    assert_eq!(harness.service.call_count(endpoint::GET_STATUS), 2);
    assert_eq!(harness.service.call_count(endpoint::INDEX_DATA_SET), 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_timeout_is_explicit_outcome() {
    let harness =
        TestHarness::with_service(MockSearchService::new().with_states([SystemState::Loading]));
    let options = harness
        .options()
        .with_load_timeout(Some(Duration::from_secs(2)));

    let err = harness
        .workflow_with(options)
        .run_dataset(&DatasetRegistry::builtin(), "tmdb")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Timeout { phase: Phase::WaitForLoad, waited, last_state: Some(SystemState::Loading) }
            if waited >= Duration::from_secs(2)
    ));
    assert_eq!(harness.service.call_count(endpoint::INDEX_DATA_SET), 0);
    assert!(harness.observer.events().contains(&Event::Failed(Phase::WaitForLoad)));
}

// ============================================================================
// Aborting phases
// ============================================================================

#[tokio::test]
async fn test_null_analysis_aborts() {
    let harness = TestHarness::with_service(MockSearchService::new().with_null_analysis());

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Analyze));
    assert!(matches!(err.root(), Error::InvalidResponse { .. }));
    assert_eq!(harness.service.call_count(endpoint::GET_ALL_FIELDS), 0);
    assert_eq!(
        harness
            .service
            .call_count(FieldCategory::Searchable.set_endpoint()),
        0
    );
}

#[tokio::test]
async fn test_analysis_receives_whole_file() {
    let harness = TestHarness::new();
    run(&harness, "tmdb").await.unwrap();

    let body = harness
        .service
        .last_body(endpoint::ANALYZE_STRING)
        .unwrap();
    assert_eq!(body["length"], crate::common::TMDB_JSON.len());
}

#[tokio::test]
async fn test_field_configuration_failure_names_category() {
    let harness = TestHarness::with_service(
        MockSearchService::new().failing(FieldCategory::Facetable.set_endpoint()),
    );

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::ConfigureFields));
    assert!(err.to_string().contains("SetFacetableFields"));
    assert_eq!(
        harness
            .service
            .call_count(FieldCategory::Sortable.set_endpoint()),
        0
    );
    assert_eq!(
        harness
            .service
            .call_count(FieldCategory::Searchable.get_endpoint()),
        0
    );
    assert_eq!(harness.service.call_count(endpoint::LOAD_STREAM), 0);
}

#[tokio::test]
async fn test_searchable_fields_sent_as_tuples() {
    let harness = TestHarness::new();
    run(&harness, "tmdb").await.unwrap();

    let body = harness
        .service
        .last_body(FieldCategory::Searchable.set_endpoint())
        .unwrap();
    assert_eq!(
        body,
        serde_json::json!([["title", 0], ["original_title", 1], ["tagline", 1], ["overview", 2]])
    );
}

#[tokio::test]
async fn test_load_failure_aborts() {
    let harness =
        TestHarness::with_service(MockSearchService::new().failing(endpoint::LOAD_STREAM));

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Load));
    assert_eq!(harness.service.call_count(endpoint::GET_STATUS), 0);
}

#[tokio::test]
async fn test_index_trigger_failure_aborts() {
    let harness =
        TestHarness::with_service(MockSearchService::new().failing(endpoint::INDEX_DATA_SET));

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Index));
    assert_eq!(harness.service.call_count(endpoint::GET_STATUS), 1);
}

#[tokio::test]
async fn test_empty_verification_result_aborts() {
    let harness = TestHarness::with_service(
        MockSearchService::new().with_search_result(SearchResult::default()),
    );

    let err = run(&harness, "tmdb").await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Verify));
    assert!(matches!(err.root(), Error::EmptyResult { query } if query == "titanic"));
    assert_eq!(harness.service.call_count(endpoint::GET_JSON), 0);
}

#[tokio::test]
async fn test_verification_query_shape() {
    let harness = TestHarness::new();
    run(&harness, "tmdb").await.unwrap();

    let query = harness.service.last_body(endpoint::SEARCH).unwrap();
    assert_eq!(query["text"], "titanic");
    assert_eq!(query["maxResults"], 5);
    assert_eq!(query["sortBy"], "popularity");
}

// ============================================================================
// Best-effort steps
// ============================================================================

#[tokio::test]
async fn test_field_listing_failure_is_warning() {
    let harness =
        TestHarness::with_service(MockSearchService::new().failing(endpoint::GET_ALL_FIELDS));

    let report = run(&harness, "tmdb").await.unwrap();

    assert!(report.discovered_fields.is_none());
    assert_eq!(report.warnings.len(), 1);
    assert!(harness
        .observer
        .events()
        .iter()
        .any(|e| matches!(e, Event::Warning(Phase::Analyze, _))));
}

#[tokio::test]
async fn test_readback_failure_is_warning() {
    let harness = TestHarness::with_service(
        MockSearchService::new().failing(FieldCategory::Sortable.get_endpoint()),
    );

    let report = run(&harness, "tmdb").await.unwrap();

    assert_eq!(report.field_readback.len(), 4);
    assert!(!report.field_readback.contains_key(&FieldCategory::Sortable));
    assert!(report.warnings[0].contains("sortable"));
    assert_eq!(
        harness
            .service
            .call_count(FieldCategory::WordIndexing.get_endpoint()),
        1
    );
}

#[tokio::test]
async fn test_filter_failure_never_fails_run() {
    let harness = TestHarness::with_service(
        MockSearchService::new().failing(endpoint::CREATE_VALUE_FILTER),
    );

    let report = run(&harness, "pokedex").await.unwrap();

    assert!(matches!(report.filter_demo, FilterDemo::Partial { .. }));
    assert_eq!(harness.service.call_count(endpoint::COMBINE_FILTERS), 0);
    assert_eq!(harness.service.call_count(endpoint::LOAD_STREAM), 1);
    assert!(harness.observer.finished().contains(&Phase::Filters));
}

#[tokio::test]
async fn test_document_fetch_failure_is_warning() {
    let harness = TestHarness::with_service(MockSearchService::new().failing(endpoint::GET_JSON));

    let report = run(&harness, "tmdb").await.unwrap();

    assert_eq!(report.verification.len(), 2);
    assert!(report.verification.iter().all(|r| r.document.is_none()));
    assert_eq!(report.warnings.len(), 2);
}

#[tokio::test]
async fn test_documents_fetched_one_key_at_a_time() {
    let harness = TestHarness::new();
    let report = run(&harness, "tmdb").await.unwrap();

    let keys: Vec<_> = harness
        .service
        .calls()
        .into_iter()
        .filter(|c| c.endpoint == endpoint::GET_JSON)
        .map(|c| c.body.unwrap())
        .collect();
    assert_eq!(keys, vec![serde_json::json!([1]), serde_json::json!([2])]);
    assert_eq!(
        report.verification[0].document.as_deref(),
        Some("{\"id\":1}")
    );
}

#[tokio::test]
async fn test_observer_sees_phases_in_order() {
    let harness = TestHarness::new();
    run(&harness, "pokedex").await.unwrap();

    assert_eq!(harness.observer.finished(), Phase::ALL.to_vec());
}
