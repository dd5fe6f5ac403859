//! Unified error types for the Xetra connector.
//!
//! All errors are represented by [`XetraError`], using `thiserror` for
//! ergonomic error definitions. Library code never uses `unwrap()`;
//! all fallible operations return `Result<T, XetraError>`.

use thiserror::Error;

/// The unified error type for all connector operations.
#[derive(Error, Debug)]
pub enum XetraError {
    /// Credentials are missing or empty.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Description of the credential problem.
        message: String,
    },

    /// The storage endpoint or bucket could not be reached or resolved.
    #[error("Cannot reach {endpoint}: {message}")]
    Connectivity {
        /// The endpoint address that was being contacted.
        endpoint: String,
        /// Human-readable description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested key was not found in storage.
    #[error("Not found: {key}")]
    NotFound {
        /// The storage key that was not found.
        key: String,
    },

    /// An object's content could not be decoded into a table.
    #[error("Failed to parse {key}: {message}")]
    Parse {
        /// The key whose content was malformed.
        key: String,
        /// Description of the parse failure.
        message: String,
    },

    /// The requested write format is not supported.
    #[error("Unsupported file format: {format}")]
    WrongFormat {
        /// The format string as given by the caller.
        format: String,
    },

    /// A table could not be encoded into the target format.
    #[error("Encode error: {message}")]
    Encode {
        /// Description of the encoding failure.
        message: String,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A storage operation failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable description of the failure.
        message: String,
        /// The backend error, unmodified.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl XetraError {
    /// Create a storage error from a message and source error.
    pub fn storage(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage error from a message only.
    pub fn storage_msg(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connectivity error for `endpoint` from a message and source error.
    pub fn connectivity(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connectivity {
            endpoint: endpoint.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error for `key`.
    pub fn parse(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create an encode error.
    pub fn encode(message: impl std::fmt::Display) -> Self {
        Self::Encode {
            message: message.to_string(),
        }
    }
}
