//! Xetra bucket connector.
//!
//! [`S3BucketConnector`] wraps a single bucket and exposes prefix listing,
//! CSV reads into Arrow `RecordBatch`es, and table writes as CSV or Parquet
//! objects. Storage access goes through [`ObjectStorage`], so the same
//! connector runs against S3, a local directory, or an in-memory store.

pub mod connector;

pub use connector::S3BucketConnector;
pub use xetra_core::{
    ConnectorConfig, Credentials, FileFormat, ObjectStorage, Result, WriteOutcome, XetraError,
};
pub use xetra_storage::CsvReadOptions;
