//! Top-level errors for the harness driver.
//!
//! Per-descriptor problems never surface here: they become a
//! [`crate::verify::Outcome`] and are reported in the run log. What remains
//! are the conditions that stop the whole command.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Exit code for a run where every descriptor passed or was updated.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for a run with at least one failure that was not tolerated.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for a run that could not resolve its descriptors.
pub const EXIT_ABORT: u8 = 2;

/// Errors that end a harness command
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// An explicitly requested test produced no descriptors
    #[error("Can't obtain test descriptors from {}", path.display())]
    #[diagnostic(
        code(nasm_t::unresolvable),
        help("check that the file exists and holds at least one record with a description")
    )]
    DescriptorUnresolvable { path: PathBuf },

    /// The configuration file exists but could not be used
    #[error("Invalid configuration in {}: {message}", path.display())]
    #[diagnostic(code(nasm_t::config))]
    Config { path: PathBuf, message: String },

    /// A filesystem operation failed outside of a single test
    #[error("{action} {}: {source}", path.display())]
    #[diagnostic(code(nasm_t::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scaffolded descriptor could not be serialized
    #[error("Failed to serialize descriptor: {0}")]
    #[diagnostic(code(nasm_t::serialize))]
    Serialize(#[from] serde_json::Error),
}

impl HarnessError {
    /// Process exit code the driver reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::DescriptorUnresolvable { .. } => EXIT_ABORT,
            _ => EXIT_FAILURE,
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
