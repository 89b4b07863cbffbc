//! CLI error type, rendering and exit codes.

use colored::Colorize;
use std::fmt;

// Exit codes

/// The dataset was loaded and verified.
pub const EXIT_SUCCESS: i32 = 0;
/// The run or its configuration failed.
pub const EXIT_ERROR: i32 = 1;
/// Missing or contradictory arguments.
pub const EXIT_USAGE: i32 = 2;
/// Interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Unified error type for CLI operations.
pub enum CliError {
    /// The load run (or its configuration) failed.
    Run(corpora_core::Error),
    /// The configuration file is missing or malformed.
    Config(String),
    /// Missing or contradictory arguments.
    Usage {
        /// What is wrong
        message: String,
        /// How to fix it
        hint: Option<&'static str>,
    },
    /// The user pressed Ctrl-C.
    Interrupted,
    /// Anything unexpected (terminal I/O, ...).
    Other(anyhow::Error),
}

impl CliError {
    /// Creates a usage error with a remediation line.
    pub fn usage(message: impl Into<String>, hint: &'static str) -> Self {
        CliError::Usage {
            message: message.into(),
            hint: Some(hint),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => EXIT_USAGE,
            CliError::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_ERROR,
        }
    }

    fn hints(&self) -> Vec<&'static str> {
        match self {
            CliError::Run(e) => e.hints(),
            CliError::Config(_) => vec!["fix or remove the file, or point --config elsewhere"],
            CliError::Usage { hint, .. } => hint.iter().copied().collect(),
            CliError::Interrupted => {
                vec!["the dataset may be half-configured; rerun to start over"]
            }
            CliError::Other(_) => Vec::new(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = "error:".red().bold();
        match self {
            CliError::Run(e) => write!(f, "{error} {e}")?,
            CliError::Config(msg) => write!(f, "{error} {msg}")?,
            CliError::Usage { message, .. } => write!(f, "{error} {message}")?,
            CliError::Interrupted => write!(f, "{error} interrupted")?,
            CliError::Other(e) => write!(f, "{error} {e:#}")?,
        }
        for hint in self.hints() {
            write!(f, "\n  {} {hint}", "help:".cyan().bold())?;
        }
        Ok(())
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<corpora_core::Error> for CliError {
    fn from(e: corpora_core::Error) -> Self {
        CliError::Run(e)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Other(e)
    }
}

/// Print the error and return its exit code.
pub fn report(err: &CliError) -> i32 {
    eprintln!("{err}");
    err.exit_code()
}

pub type CliResult<T> = std::result::Result<T, CliError>;
