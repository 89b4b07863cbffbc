//! End-to-end runs of the builtin datasets.

use corpora_core::service::endpoint;
use corpora_core::{DatasetRegistry, Error, FieldCategory, MockSearchService, Phase};
use corpora_workflows::FilterDemo;

use crate::common::{TestHarness, same_file};

fn configure_and_read_back() -> Vec<&'static str> {
    FieldCategory::ALL
        .iter()
        .map(|c| c.set_endpoint())
        .chain(FieldCategory::ALL.iter().map(|c| c.get_endpoint()))
        .collect()
}

#[tokio::test]
async fn test_tmdb_runs_every_phase_in_order() {
    let harness = TestHarness::new();
    let registry = DatasetRegistry::builtin();

    let report = harness
        .workflow()
        .run_dataset(&registry, "tmdb")
        .await
        .expect("tmdb load should succeed");

    let mut expected = vec![
        endpoint::CREATE_OR_OPEN,
        endpoint::ANALYZE_STRING,
        endpoint::GET_ALL_FIELDS,
    ];
    expected.extend(configure_and_read_back());
    expected.extend([
        endpoint::LOAD_STREAM,
        endpoint::GET_STATUS,
        endpoint::GET_RECORD_COUNT,
        endpoint::INDEX_DATA_SET,
        endpoint::GET_STATUS,
        endpoint::SEARCH,
        endpoint::GET_JSON,
        endpoint::GET_JSON,
    ]);
    assert_eq!(harness.service.endpoints(), expected);

    assert_eq!(report.dataset, "tmdb");
    assert_eq!(report.filter_demo, FilterDemo::Skipped);
    assert_eq!(report.record_count, 2);
    assert_eq!(report.verification.len(), 2);
    assert_eq!(report.field_counts.searchable, 4);
    assert_eq!(report.field_readback.len(), 5);
    assert!(report.warnings.is_empty());
    assert!(report.file_bytes > 0);
}

#[tokio::test]
async fn test_tmdb_skips_filter_phase() {
    let harness = TestHarness::new();
    harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "tmdb")
        .await
        .unwrap();

    assert!(!harness.observer.finished().contains(&Phase::Filters));
    assert_eq!(harness.service.call_count(endpoint::CREATE_RANGE_FILTER), 0);
}

#[tokio::test]
async fn test_pokedex_builds_filter_chain_before_load() {
    let harness = TestHarness::new();
    let report = harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "pokedex")
        .await
        .expect("pokedex load should succeed");

    assert!(report.filter_demo.is_built());

    let endpoints = harness.service.endpoints();
    let position = |name: &str| endpoints.iter().position(|e| *e == name).unwrap();
    assert!(position(endpoint::CREATE_RANGE_FILTER) > position("GetWordIndexingFields"));
    assert!(position(endpoint::CREATE_RANGE_FILTER) < position(endpoint::CREATE_VALUE_FILTER));
    assert!(position(endpoint::CREATE_VALUE_FILTER) < position(endpoint::COMBINE_FILTERS));
    assert!(position(endpoint::COMBINE_FILTERS) < position(endpoint::CREATE_BOOST));
    assert!(position(endpoint::CREATE_BOOST) < position(endpoint::LOAD_STREAM));

    let range = harness
        .service
        .last_body(endpoint::CREATE_RANGE_FILTER)
        .unwrap();
    assert_eq!(range["fieldName"], "speed");
    assert_eq!(range["lowerLimit"], 10.5);
    assert_eq!(range["upperLimit"], 50.0);
    let value = harness
        .service
        .last_body(endpoint::CREATE_VALUE_FILTER)
        .unwrap();
    assert_eq!(value["value"], 50);
}

#[tokio::test]
async fn test_missing_data_file_aborts_before_any_request() {
    let harness = TestHarness::new();
    std::fs::remove_file(harness.data_file("tmdb.json")).unwrap();

    let err = harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "tmdb")
        .await
        .unwrap_err();

    match &err {
        Error::DataFile { path, message } => {
            assert!(path.is_absolute());
            assert!(same_file(path, &harness.data_file("tmdb.json")));
            assert_eq!(message, "file not found");
        }
        other => unreachable!("expected a data file error, got {other:?}"),
    }
    assert!(err.is_local());
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_json_aborts_before_any_request() {
    let harness = TestHarness::new();
    std::fs::write(harness.data_file("pokedex.json"), "[{\"name\": ").unwrap();

    let err = harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "pokedex")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("not valid JSON"));
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn test_open_failure_stops_everything() {
    let harness =
        TestHarness::with_service(MockSearchService::new().failing(endpoint::CREATE_OR_OPEN));

    let err = harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "tmdb")
        .await
        .unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Open));
    assert!(matches!(err.root(), Error::Status { status: 500, .. }));
    let hints = err.hints();
    assert!(hints.iter().any(|h| h.contains("base URL")));
    assert!(hints.iter().any(|h| h.contains("token")));

    assert_eq!(harness.service.endpoints(), vec![endpoint::CREATE_OR_OPEN]);
    assert_eq!(harness.service.call_count(endpoint::ANALYZE_STRING), 0);
}

#[tokio::test]
async fn test_unknown_dataset_issues_no_request() {
    let harness = TestHarness::new();
    let err = harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "imdb")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::DatasetNotFound { ref available, .. } if available == &["tmdb", "pokedex"]
    ));
    assert!(harness.service.calls().is_empty());
    assert!(harness.observer.events().is_empty());
}

#[tokio::test]
async fn test_dataset_lookup_ignores_case() {
    let harness = TestHarness::new();
    let report = harness
        .workflow()
        .run_dataset(&DatasetRegistry::builtin(), "PokeDex")
        .await
        .unwrap();
    assert_eq!(report.dataset, "pokedex");
    assert!(harness.service.calls().iter().all(|c| c.dataset == "pokedex"));
}
