//! Error types for Quarry.

use std::path::{Path, PathBuf};

/// Errors that can occur while building, sending, or decoding a search.
///
/// Caller and response errors are raised by Quarry itself. Transport errors
/// originate in a `SearchClient` implementation and reach the caller
/// unchanged.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    // ------------------------------------------------------------------
    // Caller errors
    // ------------------------------------------------------------------
    /// A query or request violated a structural constraint.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// What was wrong with the query
        message: String,
    },

    /// Client configuration is invalid or could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    // ------------------------------------------------------------------
    // Response errors
    // ------------------------------------------------------------------
    /// The search service returned a response Quarry could not decode.
    #[error("{}", decode_display(*row, message))]
    Decode {
        /// Index of the offending row, when the failure is row-level
        row: Option<usize>,
        /// What was malformed
        message: String,
    },

    // ------------------------------------------------------------------
    // Transport errors
    // ------------------------------------------------------------------
    /// The search service could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The search service rejected the supplied credentials.
    #[error("Authentication failed: {message}")]
    Auth {
        /// Message returned by the service
        message: String,
    },

    /// The named index does not exist on the cluster.
    #[error("Index not found: {index}")]
    IndexNotFound {
        /// Index name that was not found
        index: String,
    },

    /// The search engine rejected or failed to execute the query.
    #[error("Query execution failed: {message}")]
    QueryExecution {
        /// Message returned by the engine
        message: String,
    },

    // ------------------------------------------------------------------
    // Ambient errors
    // ------------------------------------------------------------------
    /// I/O error with the path that caused it.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

fn decode_display(row: Option<usize>, message: &str) -> String {
    match row {
        Some(row) => format!("Decode error at row {row}: {message}"),
        None => format!("Decode error: {message}"),
    }
}

/// Convenience `Result` type alias for Quarry operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Only transport failures are transient. Quarry never retries on its
    /// own; this is a hint for callers that wrap a client in a retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection { .. } => true,
            Error::InvalidQuery { .. } => false,
            Error::Config { .. } => false,
            Error::Decode { .. } => false,
            Error::Auth { .. } => false, // surfaced, never retried
            Error::IndexNotFound { .. } => false,
            Error::QueryExecution { .. } => false,
            Error::Io { .. } => false,
        }
    }

    /// Creates a new invalid-query error.
    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        Error::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a response-level decode error.
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Error::Decode {
            row: None,
            message: message.into(),
        }
    }

    /// Creates a decode error pointing at a specific row.
    pub fn decode_row<S: Into<String>>(row: usize, message: S) -> Self {
        Error::Decode {
            row: Some(row),
            message: message.into(),
        }
    }

    /// Creates a new connection error.
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Error::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new connection error with a source error.
    pub fn connection_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    /// Creates a new index-not-found error.
    pub fn index_not_found<S: Into<String>>(index: S) -> Self {
        Error::IndexNotFound {
            index: index.into(),
        }
    }

    /// Creates a new query-execution error.
    pub fn query_execution<S: Into<String>>(message: S) -> Self {
        Error::QueryExecution {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
