//! The load workflow.
//!
//! Phases run strictly in order and each one starts only after the previous
//! one succeeded. Nothing is retried and a half-configured dataset is left
//! as is. Only the discovered-field listing, the field read-backs, the
//! filter demonstration and the document fetches of the verification step
//! are best-effort: their failures become warnings on the report.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use corpora_core::dataset::validate_data_file;
use corpora_core::poll::{DEFAULT_POLL_INTERVAL, index_settled, load_settled, poll_status};
use corpora_core::service::endpoint;
use corpora_core::{
    DatasetDescriptor, DatasetRegistry, Error, FieldCategory, Phase, PollOutcome, PollSpec,
    PollStep, Result, SearchQuery, SearchService, SystemState, SystemStatus,
};

use crate::filters::{FilterDemo, build_example_filters};
use crate::progress::{NoopObserver, ProgressObserver};
use crate::summary::{FieldCounts, LoadReport, VerifiedRecord};

/// Number of hits the verification query asks for.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Tunables of a load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Directory relative data-file paths resolve against
    pub data_dir: PathBuf,
    /// Delay between status fetches
    pub poll_interval: Duration,
    /// Maximum load wait; `None` waits indefinitely
    pub load_timeout: Option<Duration>,
    /// Maximum index wait; `None` waits indefinitely
    pub index_timeout: Option<Duration>,
    /// Result limit of the verification query
    pub max_results: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            poll_interval: DEFAULT_POLL_INTERVAL,
            load_timeout: None,
            index_timeout: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl LoadOptions {
    /// Sets the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds the load wait.
    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Bounds the index wait.
    pub fn with_index_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.index_timeout = timeout;
        self
    }

    /// Sets the verification result limit.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// Drives one dataset through the remote lifecycle until it is searchable.
#[derive(Clone)]
pub struct LoadWorkflow {
    service: Arc<dyn SearchService>,
    options: LoadOptions,
    observer: Arc<dyn ProgressObserver>,
}

impl LoadWorkflow {
    /// Creates a workflow that reports to nobody.
    pub fn new(service: Arc<dyn SearchService>, options: LoadOptions) -> Self {
        Self {
            service,
            options,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Sends progress events to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The options this workflow runs with.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Resolves `name` in `registry` and runs the workflow for it.
    ///
    /// An unknown name fails before any request is issued.
    pub async fn run_dataset(&self, registry: &DatasetRegistry, name: &str) -> Result<LoadReport> {
        let descriptor = registry.resolve(name)?;
        self.run(descriptor).await
    }

    /// Checks the data file of `descriptor`, then runs every phase.
    pub async fn run(&self, descriptor: &DatasetDescriptor) -> Result<LoadReport> {
        let prepared = prepare(descriptor, &self.options).await?;
        self.execute(&prepared).await
    }

    /// Runs every phase for a dataset whose data file already passed the
    /// local checks.
    pub async fn execute(&self, prepared: &PreparedLoad) -> Result<LoadReport> {
        let descriptor = &prepared.descriptor;
        let name = descriptor.name.as_str();
        let path = &prepared.path;
        let file_bytes = prepared.file_bytes;
        let mut warnings = Vec::new();

        tracing::info!(
            dataset = %name,
            path = %path.display(),
            bytes = file_bytes,
            "Starting load"
        );

        self.phase(name, Phase::Open, self.service.create_or_open(name))
            .await?;

        let discovered_fields = self
            .phase(name, Phase::Analyze, async {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| Error::data_file(path, e.to_string()))?;
                let analysis = self.service.analyze(name, content).await?;
                if analysis.is_null() {
                    return Err(Error::invalid_response(
                        format!("{}/{name}", endpoint::ANALYZE_STRING),
                        "the service could not analyze the data",
                    ));
                }

                match self.service.all_fields(name).await {
                    Ok(fields) => {
                        tracing::info!(dataset = %name, count = fields.len(), "Fields discovered");
                        Ok(Some(fields))
                    }
                    Err(e) => {
                        self.warn(
                            &mut warnings,
                            name,
                            Phase::Analyze,
                            format!("could not list discovered fields: {e}"),
                        );
                        Ok(None)
                    }
                }
            })
            .await?;

        let field_readback = self
            .phase(name, Phase::ConfigureFields, async {
                for category in FieldCategory::ALL {
                    let sent = match category {
                        FieldCategory::Searchable => {
                            self.service
                                .set_searchable_fields(name, &descriptor.searchable_fields)
                                .await
                        }
                        other => {
                            self.service
                                .set_fields(name, other, &descriptor.field_names(other))
                                .await
                        }
                    };
                    if let Err(e) = sent {
                        tracing::error!(dataset = %name, category = %category, "Field configuration rejected");
                        return Err(e);
                    }
                }

                let mut readback = BTreeMap::new();
                for category in FieldCategory::ALL {
                    match self.service.fields(name, category).await {
                        Ok(fields) => {
                            readback.insert(category, fields);
                        }
                        Err(e) => self.warn(
                            &mut warnings,
                            name,
                            Phase::ConfigureFields,
                            format!("could not read back {category} fields: {e}"),
                        ),
                    }
                }
                Ok(readback)
            })
            .await?;

        let filter_demo = match &descriptor.example_filters {
            None => FilterDemo::Skipped,
            Some(example) => {
                self.phase(name, Phase::Filters, async {
                    let demo = build_example_filters(
                        self.service.as_ref(),
                        name,
                        example,
                        |step, err| {
                            self.warn(
                                &mut warnings,
                                name,
                                Phase::Filters,
                                format!("{step} failed: {err}"),
                            );
                        },
                    )
                    .await;
                    Ok(demo)
                })
                .await?
            }
        };

        let load_started = Instant::now();
        self.phase(name, Phase::Load, self.service.load_file(name, path))
            .await?;
        let record_count = self
            .phase(name, Phase::WaitForLoad, async {
                let status = self
                    .wait(name, Phase::WaitForLoad, self.options.load_timeout, load_settled)
                    .await?;
                tracing::debug!(dataset = %name, state = %status.system_state, "Load settled");
                self.service.record_count(name).await
            })
            .await?;
        let load_duration = load_started.elapsed();

        let index_started = Instant::now();
        self.phase(name, Phase::Index, self.service.index(name))
            .await?;
        self.phase(
            name,
            Phase::WaitForIndex,
            self.wait(
                name,
                Phase::WaitForIndex,
                self.options.index_timeout,
                index_settled,
            ),
        )
        .await?;
        let index_duration = index_started.elapsed();

        let verification = self
            .phase(name, Phase::Verify, async {
                let mut query = SearchQuery::new(&descriptor.test_query)
                    .with_max_results(self.options.max_results);
                if let Some(field) = descriptor.primary_sort_field() {
                    query = query.sorted_by(field, true);
                }

                let result = self.service.search(name, &query).await?;
                if result.is_empty() {
                    return Err(Error::EmptyResult {
                        query: descriptor.test_query.clone(),
                    });
                }

                let mut records = Vec::with_capacity(result.len());
                for hit in &result.records {
                    let document = match self.service.documents(name, &[hit.document_key]).await
                    {
                        Ok(mut docs) if !docs.is_empty() => Some(docs.swap_remove(0)),
                        Ok(_) => {
                            self.warn(
                                &mut warnings,
                                name,
                                Phase::Verify,
                                format!("no document returned for key {}", hit.document_key),
                            );
                            None
                        }
                        Err(e) => {
                            self.warn(
                                &mut warnings,
                                name,
                                Phase::Verify,
                                format!("could not fetch document {}: {e}", hit.document_key),
                            );
                            None
                        }
                    };
                    records.push(VerifiedRecord {
                        document_key: hit.document_key,
                        score: hit.score,
                        document,
                    });
                }
                Ok(records)
            })
            .await?;

        tracing::info!(
            dataset = %name,
            records = record_count,
            load_ms = load_duration.as_millis() as u64,
            index_ms = index_duration.as_millis() as u64,
            hits = verification.len(),
            warnings = warnings.len(),
            "Load completed"
        );

        Ok(LoadReport {
            dataset: name.to_string(),
            file_bytes,
            discovered_fields,
            field_counts: FieldCounts::of(descriptor),
            field_readback,
            filter_demo,
            record_count,
            load_duration,
            index_duration,
            test_query: descriptor.test_query.clone(),
            verification,
            warnings,
        })
    }

    /// Runs one phase, timing it and attaching the phase to its error.
    async fn phase<T, F>(&self, name: &str, phase: Phase, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tracing::info!(dataset = %name, phase = %phase, "Phase started");
        self.observer.phase_started(name, phase);
        let started = Instant::now();

        match work.await {
            Ok(value) => {
                let elapsed = started.elapsed();
                tracing::info!(
                    dataset = %name,
                    phase = %phase,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Phase finished"
                );
                self.observer.phase_finished(name, phase, elapsed);
                Ok(value)
            }
            Err(e) => {
                let e = if e.phase().is_some() {
                    e
                } else {
                    e.in_phase(phase)
                };
                tracing::error!(dataset = %name, phase = %phase, error = %e, "Phase failed");
                self.observer.phase_failed(name, phase, &e);
                Err(e)
            }
        }
    }

    /// Polls the status until `classify` ends the wait.
    async fn wait(
        &self,
        name: &str,
        phase: Phase,
        timeout: Option<Duration>,
        classify: fn(SystemState) -> PollStep,
    ) -> Result<SystemStatus> {
        let spec = PollSpec::every(self.options.poll_interval).with_timeout(timeout);
        let outcome = poll_status(
            spec,
            || self.service.status(name),
            classify,
            |status| self.observer.status_polled(name, phase, status),
        )
        .await?;

        match outcome {
            PollOutcome::Reached(status) => Ok(status),
            PollOutcome::ErrorState(status) => Err(Error::StateError {
                phase,
                state: status.system_state,
                message: status.error_message,
            }),
            PollOutcome::TimedOut { last, waited } => Err(Error::Timeout {
                phase,
                waited,
                last_state: last.map(|status| status.system_state),
            }),
        }
    }

    fn warn(&self, warnings: &mut Vec<String>, name: &str, phase: Phase, message: String) {
        tracing::warn!(dataset = %name, phase = %phase, "{message}");
        self.observer.warning(name, phase, &message);
        warnings.push(message);
    }
}

/// A dataset whose data file passed the local checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLoad {
    /// The dataset to load
    pub descriptor: DatasetDescriptor,
    /// Absolute path of the data file
    pub path: PathBuf,
    /// Size of the data file in bytes
    pub file_bytes: u64,
}

/// Resolves and validates the data file of `descriptor` without issuing any
/// request.
///
/// The file must exist, be non-empty and parse as JSON. Validation runs on
/// the blocking pool.
pub async fn prepare(descriptor: &DatasetDescriptor, options: &LoadOptions) -> Result<PreparedLoad> {
    let path = descriptor.resolve_file(&options.data_dir);
    let file_bytes = check_file(&path).await?;
    Ok(PreparedLoad {
        descriptor: descriptor.clone(),
        path,
        file_bytes,
    })
}

async fn check_file(path: &Path) -> Result<u64> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || validate_data_file(&owned))
        .await
        .map_err(|e| Error::data_file(path, format!("validation task failed: {e}")))?
}
