//! Error types for fncall-core

use thiserror::Error;

/// Result type alias for fncall-core
pub type Result<T> = std::result::Result<T, Error>;

/// Workspace-wide error type
///
/// Crate-specific errors (such as `fncall_tools::ToolError`) convert into this
/// type at async and host-application boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// The call context was cancelled before the call started
    #[error("Call cancelled: {0}")]
    Cancelled(String),

    /// The call context deadline passed before the call started
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Processing a tool call failed
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}
