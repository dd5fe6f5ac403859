//! Xetra core types, traits, configuration, and errors.
//!
//! This crate provides the foundational building blocks shared by the
//! storage backends and the bucket connector: the [`ObjectStorage`] trait,
//! the [`ConnectorConfig`] with pre-resolved [`Credentials`], the closed
//! [`FileFormat`] enumeration, and the unified error type.

pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::{ConnectorConfig, Credentials};
pub use error::XetraError;
pub use storage::ObjectStorage;
pub use types::{FileFormat, WriteOutcome};

/// Convenience Result type using [`XetraError`].
pub type Result<T> = std::result::Result<T, XetraError>;
