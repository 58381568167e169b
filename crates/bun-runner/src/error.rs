//! Collaborator error types.

use std::time::Duration;
use thiserror::Error;

/// Error types for the external tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// bun binary not found.
    #[error("bun binary not found: {0}")]
    NotFound(String),

    /// Failed to spawn bun process.
    #[error("failed to spawn bun: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// bun process exited with error.
    #[error("bun exited with code {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    /// The runner script could not be written to the cache directory.
    #[error("failed to prepare bun runner script: {0}")]
    ScriptSetup(String),

    /// bun runner protocol error.
    #[error("bun runner protocol error: {0}")]
    ProtocolError(String),

    /// Failed to parse bun response.
    #[error("failed to parse bun response: {0}")]
    ParseError(String),

    /// The tool ran but refused the input.
    #[error("{tool} failed: {message}")]
    Rejected {
        /// `svgo` or `prettier`.
        tool: &'static str,
        /// The tool's error message.
        message: String,
    },

    /// The tool did not answer in time.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// No implementation of the tool is configured.
    #[error("no {0} available")]
    Unavailable(&'static str),
}
