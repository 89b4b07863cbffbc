//! Common test utilities and harness for corpora workflow tests.

use corpora_core::{Error, MockSearchService, Phase, SystemStatus};
use corpora_workflows::{LoadOptions, LoadWorkflow, ProgressObserver};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Sample TMDB payload.
pub const TMDB_JSON: &str = r#"[
  {"title": "Titanic", "original_title": "Titanic", "tagline": "Nothing on Earth could come between them.",
   "overview": "A seventeen-year-old aristocrat falls in love.", "popularity": 100.0,
   "vote_average": 7.5, "release_date": "1997-11-18", "original_language": "en", "genres": ["Drama", "Romance"]}
]"#;

/// Sample Pokedex payload.
pub const POKEDEX_JSON: &str = r#"[
  {"name": "Raichu", "type": "Electric", "species": "Mouse", "description": "Its tail discharges electricity.",
   "speed": 110, "hp": 60, "attack": 90, "defense": 55}
]"#;

/// Test harness for load workflow tests.
///
/// Owns a temporary data directory populated with the builtin datasets'
/// files and a scripted mock service.
pub struct TestHarness {
    /// Scripted service the workflow talks to
    pub service: Arc<MockSearchService>,
    /// Records every progress event
    pub observer: Arc<RecordingObserver>,
    /// Data directory (kept alive for the harness lifetime)
    pub data_dir: TempDir,
}

impl TestHarness {
    /// Creates a harness with both data files and an always-ready mock.
    pub fn new() -> Self {
        Self::with_service(MockSearchService::new())
    }

    /// Creates a harness around a custom mock.
    pub fn with_service(service: MockSearchService) -> Self {
        let data_dir = tempfile::tempdir().unwrap();
        std::fs::write(data_dir.path().join("tmdb.json"), TMDB_JSON).unwrap();
        std::fs::write(data_dir.path().join("pokedex.json"), POKEDEX_JSON).unwrap();
        Self {
            service: Arc::new(service),
            observer: Arc::new(RecordingObserver::default()),
            data_dir,
        }
    }

    /// Path of a file inside the data directory.
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.path().join(name)
    }

    /// Options pointing at the harness data directory.
    pub fn options(&self) -> LoadOptions {
        LoadOptions::default().with_data_dir(self.data_dir.path())
    }

    /// Workflow wired to the mock and the recording observer.
    pub fn workflow(&self) -> LoadWorkflow {
        self.workflow_with(self.options())
    }

    /// Workflow with custom options.
    pub fn workflow_with(&self, options: LoadOptions) -> LoadWorkflow {
        LoadWorkflow::new(self.service.clone(), options).with_observer(self.observer.clone())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A progress event as seen by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Phase started
    Started(Phase),
    /// Phase finished
    Finished(Phase),
    /// Phase failed
    Failed(Phase),
    /// Status fetched during a wait
    Polled(Phase, SystemStatus),
    /// Best-effort warning
    Warning(Phase, String),
}

/// Observer that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    /// Every event so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Phases that finished, in order.
    pub fn finished(&self) -> Vec<Phase> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finished(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }

    /// Status snapshots seen during `phase`.
    pub fn polled(&self, phase: Phase) -> Vec<SystemStatus> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Polled(p, status) if p == phase => Some(status),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressObserver for RecordingObserver {
    fn phase_started(&self, _dataset: &str, phase: Phase) {
        self.push(Event::Started(phase));
    }

    fn phase_finished(&self, _dataset: &str, phase: Phase, _elapsed: Duration) {
        self.push(Event::Finished(phase));
    }

    fn phase_failed(&self, _dataset: &str, phase: Phase, _error: &Error) {
        self.push(Event::Failed(phase));
    }

    fn status_polled(&self, _dataset: &str, phase: Phase, status: &SystemStatus) {
        self.push(Event::Polled(phase, status.clone()));
    }

    fn warning(&self, _dataset: &str, phase: Phase, message: &str) {
        self.push(Event::Warning(phase, message.to_string()));
    }
}

/// Returns `true` if `path` names the same file as `expected` after
/// resolving symlinks in the temp directory.
pub fn same_file(path: &Path, expected: &Path) -> bool {
    path == expected
        || std::fs::canonicalize(path.parent().unwrap_or(path)).ok()
            == std::fs::canonicalize(expected.parent().unwrap_or(expected)).ok()
            && path.file_name() == expected.file_name()
}
