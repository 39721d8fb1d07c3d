//! Error types for counsel-rs.
//!
//! [`AgentError`] covers the pipeline and its LLM backend,
//! [`CommandError`] covers the CLI layer, and [`Error`] wraps both.

use thiserror::Error;

/// Result alias used by the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Pipeline or backend failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors raised by the extraction pipeline and its LLM provider.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was supplied or found in the environment.
    #[error("API key not configured: set OPENAI_API_KEY or COUNSEL_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not known.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name that was requested.
        name: String,
    },

    /// Configuration value is out of range or malformed.
    #[error("invalid configuration: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// Transport, authentication, quota or timeout failure from the backend.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error message from the backend or transport.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The relevance stage returned neither the irrelevant sentinel nor a
    /// target declaration.
    #[error("relevance response matched neither recognized shape: {content:?}")]
    FormatViolation {
        /// Raw backend response.
        content: String,
    },

    /// The extraction stage was given the wrong number of segments.
    #[error("expected exactly {expected} segments, got {actual}")]
    InputCardinality {
        /// Required segment count.
        expected: usize,
        /// Segment count supplied.
        actual: usize,
    },

    /// The query was rejected before reaching the backend.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Why the query was rejected.
        message: String,
    },

    /// A backend response could not be parsed into the expected structure.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// Parser diagnostic.
        message: String,
        /// Raw backend response.
        content: String,
    },
}

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not complete.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A command-line argument was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be rendered.
    #[error("output format error: {0}")]
    OutputFormat(String),

    /// Reading an input file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
