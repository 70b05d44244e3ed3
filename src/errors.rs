//! Harness error handling.
//!
//! A `HarnessError` is always a fault of the run itself, never of a test
//! case. Failing tests are counted and reported, not raised.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a harness run.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// The configured client executable does not exist or is not a file.
    ///
    /// Raised before any test runs, so a misconfigured run fails fast.
    #[error("test client executable not found: {}", .path.display())]
    #[diagnostic(
        code(nutrunner::client::not_found),
        help("pass --client <path> or set the NUTRUNNER_CLIENT environment variable")
    )]
    ClientNotFound { path: PathBuf },

    /// The client exists but could not be launched.
    #[error("failed to launch test client '{}': {}", .path.display(), .source)]
    #[diagnostic(code(nutrunner::client::spawn))]
    ClientSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The test directory could not be read.
    #[error("failed to read test directory '{}': {}", .path.display(), .source)]
    #[diagnostic(code(nutrunner::discovery::unreadable))]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The configured extension does not form a usable file name pattern.
    #[error("invalid test script extension '{extension}'")]
    #[diagnostic(
        code(nutrunner::discovery::extension),
        help("use a bare suffix such as `nut`, without a leading dot")
    )]
    InvalidExtension {
        extension: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error: {0}")]
    #[diagnostic(code(nutrunner::io))]
    Io(#[from] std::io::Error),
}
