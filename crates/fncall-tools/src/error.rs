//! Error types for tool derivation, persistence and invocation

use crate::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by a callable
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// What differed between a persisted tool and the live callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Different number of parameters
    Count { expected: usize, actual: usize },
    /// Different schema kind at `path`
    Kind {
        path: String,
        expected: String,
        actual: String,
    },
    /// Different object property sets at `path`
    Properties {
        path: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Count { expected, actual } => write!(
                f,
                "invalid function param order, expected {expected} params, actual {actual}"
            ),
            Mismatch::Kind {
                path,
                expected,
                actual,
            } => write!(f, "type mismatch at {path}: expected {expected}, actual {actual}"),
            Mismatch::Properties {
                path,
                expected,
                actual,
            } => write!(
                f,
                "property mismatch at {path}: expected [{}], actual [{}]",
                expected.join(", "),
                actual.join(", ")
            ),
        }
    }
}

/// Errors that can occur while deriving, persisting or invoking tools
#[derive(Error, Debug)]
pub enum ToolError {
    /// The target is neither a callable nor a record
    #[error("expected a callable or a record, got {0}")]
    NotCallable(String),

    /// Schema derivation failed for the field at `path`
    #[error("failed to derive schema for field '{path}': {reason}")]
    SchemaDerivation { path: String, reason: String },

    /// Filesystem failure
    #[error("IO error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted tool file does not exist
    #[error("file {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Persisted tool document could not be decoded or is malformed
    #[error("invalid tool format: {0}")]
    InvalidFormat(String),

    /// Persisted tool does not match the live callable
    #[error("schema mismatch: {0}")]
    SchemaMismatch(Mismatch),

    /// Wrong number of positional arguments
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    /// An argument could not be converted to the declared parameter type
    #[error("argument {index}: expected {expected}, got {actual}")]
    TypeMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    /// A required named parameter was not supplied
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Argument text is neither a JSON object nor a JSON array
    #[error("invalid json string: {0}")]
    InvalidInput(String),

    /// Argument text could not be decoded
    #[error("json unmarshal fail: {0}")]
    Decode(#[source] serde_json::Error),

    /// The callable ran and returned an error
    ///
    /// `results` holds the non-error return values, with `Null` placeholders
    /// for slots the callable could not fill.
    #[error("tool call failed: {source}")]
    Callable {
        #[source]
        source: BoxError,
        results: Vec<Value>,
    },

    /// The tool has no callable attached (record tools, or a tool decoded
    /// without its function)
    #[error("tool '{0}' has no callable attached")]
    NotInvocable(String),

    /// No tool registered under this name
    #[error("tool not found: {0}")]
    UnknownTool(String),

    /// Invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ToolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }

    /// Prefix the field path of a derivation error with `field`
    pub(crate) fn within(self, field: &str) -> Self {
        match self {
            ToolError::SchemaDerivation { path, reason } => ToolError::SchemaDerivation {
                path: if path.is_empty() {
                    field.to_string()
                } else {
                    format!("{field}.{path}")
                },
                reason,
            },
            other => other,
        }
    }
}

/// Convert ToolError to fncall_core::Error
impl From<ToolError> for fncall_core::Error {
    fn from(err: ToolError) -> Self {
        fncall_core::Error::ProcessingFailed(err.to_string())
    }
}
