//! Error types for the corpora core library.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::{Phase, SystemState};

/// Errors that can occur while provisioning a dataset.
///
/// Marked `#[non_exhaustive]` so new failure kinds can be added without
/// breaking downstream matches.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration error (credentials, base URL, TLS policy, ...)
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// The requested dataset is not in the registry.
    #[error("Unknown dataset '{name}' (available: {})", .available.join(", "))]
    DatasetNotFound {
        /// Name that was looked up
        name: String,
        /// Names the registry knows about
        available: Vec<String>,
    },

    /// The local data file is missing, empty or not JSON.
    #[error("Data file {}: {message}", .path.display())]
    DataFile {
        /// Resolved absolute path of the file
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, refused, ...).
    #[error("Request to {endpoint} failed: {message}")]
    Request {
        /// Endpoint or URL the request was sent to
        endpoint: String,
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint the request was sent to
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The service answered 2xx but the body was unusable.
    #[error("Unexpected response from {endpoint}: {message}")]
    InvalidResponse {
        /// Endpoint the request was sent to
        endpoint: String,
        /// What was wrong with the body
        message: String,
    },

    /// A status wait exceeded its configured maximum duration.
    #[error("Timed out after {waited:?} waiting for {phase}{}", .last_state.map(|s| format!(" (last state: {s})")).unwrap_or_default())]
    Timeout {
        /// Wait phase that timed out
        phase: Phase,
        /// How long the wait lasted
        waited: Duration,
        /// Last state observed before giving up, if any fetch completed
        last_state: Option<SystemState>,
    },

    /// The dataset reached a state the current phase cannot continue from.
    #[error("Dataset entered state {state} during {phase}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    StateError {
        /// Phase that observed the state
        phase: Phase,
        /// The offending state
        state: SystemState,
        /// Error message reported by the service, if any
        message: Option<String>,
    },

    /// The verification query returned nothing.
    #[error("Test query '{query}' returned no results")]
    EmptyResult {
        /// The query text that was issued
        query: String,
    },

    /// I/O error (reading the data file, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A workflow phase failed; wraps the underlying cause.
    #[error("{phase} failed: {source}")]
    Phase {
        /// Phase that failed
        phase: Phase,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },
}

/// Convenience `Result` type alias for corpora operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new data file error.
    pub fn data_file<P, S>(path: P, message: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Error::DataFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error without a source.
    pub fn request<E, S>(endpoint: E, message: S) -> Self
    where
        E: Into<String>,
        S: Into<String>,
    {
        Error::Request {
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error with a source error.
    pub fn request_with_source<E, S, X>(endpoint: E, message: S, source: X) -> Self
    where
        E: Into<String>,
        S: Into<String>,
        X: std::error::Error + Send + Sync + 'static,
    {
        Error::Request {
            endpoint: endpoint.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response<E, S>(endpoint: E, message: S) -> Self
    where
        E: Into<String>,
        S: Into<String>,
    {
        Error::InvalidResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Wraps this error as the failure of `phase`.
    pub fn in_phase(self, phase: Phase) -> Self {
        Error::Phase {
            phase,
            source: Box::new(self),
        }
    }

    /// Returns the phase this error was raised in, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Phase { phase, .. }
            | Error::Timeout { phase, .. }
            | Error::StateError { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Returns the innermost error, unwrapping phase context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Phase { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns `true` if this error never reached the remote service.
    pub fn is_local(&self) -> bool {
        matches!(
            self.root(),
            Error::Config { .. } | Error::DatasetNotFound { .. } | Error::DataFile { .. }
        )
    }

    /// Remediation lines shown beneath the error message.
    pub fn hints(&self) -> Vec<&'static str> {
        match self {
            Error::Phase {
                phase: Phase::Open,
                ..
            } => vec![
                "check that the base URL is reachable from this machine",
                "check that the auth token is valid and has not expired",
            ],
            Error::Phase { source, .. } => source.hints(),
            Error::DatasetNotFound { .. } => {
                vec!["run with --list to see the registered datasets"]
            }
            Error::DataFile { .. } => {
                vec!["point --data-dir (or CORPORA_DATA_DIR) at the directory holding the data files"]
            }
            Error::Config { .. } => vec![
                "set CORPORA_BASE_URL and either CORPORA_TOKEN or CORPORA_EMAIL + CORPORA_PASSWORD",
            ],
            Error::Request { .. } => vec!["check that the base URL is reachable from this machine"],
            Error::Status { status: 401, .. } | Error::Status { status: 403, .. } => vec![
                "the service rejected the credentials; refresh CORPORA_TOKEN or log in again",
            ],
            Error::Timeout { .. } => vec![
                "raise --load-timeout / --index-timeout, or inspect the dataset status on the service",
            ],
            Error::StateError { .. } => {
                vec!["inspect the dataset status on the service before retrying"]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("missing base URL");
        assert_eq!(err.to_string(), "Configuration error: missing base URL");
        assert!(err.is_local());
    }

    #[test]
    fn test_dataset_not_found_lists_names() {
        let err = Error::DatasetNotFound {
            name: "imdb".to_string(),
            available: vec!["pokedex".to_string(), "tmdb".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown dataset 'imdb' (available: pokedex, tmdb)"
        );
        assert!(!err.hints().is_empty());
    }

    #[test]
    fn test_data_file_display_includes_path() {
        let err = Error::data_file("/data/tmdb.json", "file not found");
        assert_eq!(err.to_string(), "Data file /data/tmdb.json: file not found");
    }

    #[test]
    fn test_open_phase_has_connectivity_hints() {
        let err = Error::Status {
            endpoint: "CreateOrOpen/tmdb".to_string(),
            status: 502,
            body: String::new(),
        }
        .in_phase(Phase::Open);

        assert_eq!(err.phase(), Some(Phase::Open));
        let hints = err.hints();
        assert_eq!(hints.len(), 2);
        assert!(hints[0].contains("base URL"));
        assert!(hints[1].contains("token"));
    }

    #[test]
    fn test_nested_phase_delegates_hints() {
        let err = Error::Status {
            endpoint: "LoadStream/tmdb".to_string(),
            status: 401,
            body: "expired".to_string(),
        }
        .in_phase(Phase::Load);
        assert!(err.hints()[0].contains("credentials"));
        assert!(!err.is_local());
    }

    #[test]
    fn test_phase_display_wraps_source() {
        let err = Error::request("https://localhost:5001/api/IndexDataSet/tmdb", "connection refused")
            .in_phase(Phase::Index);
        assert_eq!(
            err.to_string(),
            "Index failed: Request to https://localhost:5001/api/IndexDataSet/tmdb failed: connection refused"
        );
    }

    #[test]
    fn test_state_error_display() {
        let err = Error::StateError {
            phase: Phase::WaitForIndex,
            state: SystemState::Error,
            message: Some("out of memory".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Dataset entered state Error during Wait for index: out of memory"
        );

        let bare = Error::StateError {
            phase: Phase::WaitForLoad,
            state: SystemState::Error,
            message: None,
        };
        assert_eq!(
            bare.to_string(),
            "Dataset entered state Error during Wait for load"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout {
            phase: Phase::WaitForLoad,
            waited: Duration::from_secs(2),
            last_state: Some(SystemState::Loading),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 2s waiting for Wait for load (last state: Loading)"
        );

        let hung = Error::Timeout {
            phase: Phase::WaitForIndex,
            waited: Duration::from_secs(5),
            last_state: None,
        };
        assert_eq!(
            hung.to_string(),
            "Timed out after 5s waiting for Wait for index"
        );
    }

    #[test]
    fn test_request_with_source_keeps_source() {
        let io_error = std::io::Error::other("reset by peer");
        let err = Error::request_with_source("GetStatus/tmdb", "send failed", io_error);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_root_unwraps_nested_phases() {
        let err = Error::config("inner").in_phase(Phase::Analyze);
        assert!(matches!(err.root(), Error::Config { .. }));
        assert!(err.is_local());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: Error = serde_err.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
