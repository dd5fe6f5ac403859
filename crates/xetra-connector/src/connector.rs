//! The bucket connector.
//!
//! [`S3BucketConnector`] binds one bucket on one endpoint. It holds no
//! per-call state, so a single instance can be shared behind an `Arc` by
//! concurrent readers and writers. Concurrent writes to the same key are
//! last-writer-wins at the storage backend.
//!
//! Observability contract: the read and write events are logged *before*
//! the storage call is issued, and an unsupported write format is logged
//! before the error is returned.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use tracing::{debug, info};

use xetra_core::{
    ConnectorConfig, FileFormat, ObjectStorage, Result, WriteOutcome, XetraError,
};
use xetra_storage::{
    decode_csv, decode_parquet, encode_csv, encode_parquet, is_empty_batch, CsvReadOptions,
    ObjectStoreBackend,
};

/// Prefix listed by [`S3BucketConnector::validate_connection`]. Matches
/// nothing in practice, so the check is a single cheap request.
const CHECK_PREFIX: &str = ".xetra-connectivity-check/";

/// Connector for reading and writing tables in one bucket.
pub struct S3BucketConnector {
    storage: Arc<dyn ObjectStorage>,
    endpoint_url: String,
    bucket: String,
}

impl std::fmt::Debug for S3BucketConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BucketConnector")
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl S3BucketConnector {
    /// Create a connector for the S3 bucket described by `config`.
    ///
    /// Credentials are checked for presence here; reachability of the
    /// endpoint and bucket is deferred to the first request. Use
    /// [`connect`](Self::connect) to check it eagerly.
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        let backend = ObjectStoreBackend::s3(config)?;
        Ok(Self::with_storage(
            Arc::new(backend),
            config.endpoint_url.clone(),
            config.bucket.clone(),
        ))
    }

    /// Create a connector and verify that the bucket is reachable.
    pub async fn connect(config: &ConnectorConfig) -> Result<Self> {
        let connector = Self::new(config)?;
        connector.validate_connection().await?;
        Ok(connector)
    }

    /// Bind a connector to an existing storage backend.
    ///
    /// `endpoint_url` and `bucket` are only used to build the fully
    /// qualified locations in log events.
    pub fn with_storage(
        storage: Arc<dyn ObjectStorage>,
        endpoint_url: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            endpoint_url: endpoint_url.into(),
            bucket: bucket.into(),
        }
    }

    /// The storage endpoint address.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// The bound bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fully qualified location of `key`: `{endpoint}/{bucket}/{key}`.
    pub fn object_uri(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint_url, self.bucket, key)
    }

    /// Issue one listing request to check that the endpoint and bucket answer.
    ///
    /// Backend failures are reported as [`XetraError::Connectivity`]. A
    /// rejected key pair stays [`XetraError::Authentication`].
    pub async fn validate_connection(&self) -> Result<()> {
        match self.storage.list(CHECK_PREFIX).await {
            Ok(_) => {
                debug!(endpoint = %self.endpoint_url, bucket = %self.bucket, "Connection validated");
                Ok(())
            }
            Err(XetraError::Storage { message, source }) => Err(XetraError::Connectivity {
                endpoint: self.endpoint_url.clone(),
                message: format!("bucket {} is not reachable: {message}", self.bucket),
                source,
            }),
            Err(other) => Err(other),
        }
    }

    /// List every key in the bucket that starts with `prefix`.
    ///
    /// Order is whatever the backend yields. No match is an empty vector.
    pub async fn list_files_in_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.storage.list(prefix).await
    }

    /// Read a delimited-text object into a table.
    ///
    /// The first line is the header. Fails with [`XetraError::NotFound`] if
    /// the key is absent and [`XetraError::Parse`] if the content cannot be
    /// decoded or is not rectangular.
    pub async fn read_csv_to_batch(
        &self,
        key: &str,
        options: &CsvReadOptions,
    ) -> Result<RecordBatch> {
        let data = self.fetch(key).await?;
        decode_csv(key, &data, options)
    }

    /// Read a Parquet object into a table.
    pub async fn read_parquet_to_batch(&self, key: &str) -> Result<RecordBatch> {
        let data = self.fetch(key).await?;
        decode_parquet(key, data)
    }

    /// Read an object in the given format, with default CSV options.
    pub async fn read_table(&self, key: &str, format: FileFormat) -> Result<RecordBatch> {
        match format {
            FileFormat::Csv => self.read_csv_to_batch(key, &CsvReadOptions::default()).await,
            FileFormat::Parquet => self.read_parquet_to_batch(key).await,
        }
    }

    /// Write a table to `key` in `format`.
    ///
    /// An empty table (no rows or no columns) is not written and yields
    /// [`WriteOutcome::SkippedEmpty`]. Otherwise exactly one object is
    /// created or overwritten.
    pub async fn write_batch_to_s3(
        &self,
        batch: &RecordBatch,
        key: &str,
        format: FileFormat,
    ) -> Result<WriteOutcome> {
        if is_empty_batch(batch) {
            return Ok(self.skip_empty(key));
        }

        let buffer = match format {
            FileFormat::Csv => encode_csv(batch)?,
            FileFormat::Parquet => encode_parquet(batch)?,
        };
        self.put_object(buffer, key, format).await
    }

    /// Write a table with the format given as a string (`"csv"`, `"parquet"`).
    ///
    /// The empty-table check comes first, so an empty table is skipped
    /// whatever the format string. An unsupported format is logged, then
    /// fails with [`XetraError::WrongFormat`].
    pub async fn write_batch_as(
        &self,
        batch: &RecordBatch,
        key: &str,
        file_format: &str,
    ) -> Result<WriteOutcome> {
        if is_empty_batch(batch) {
            return Ok(self.skip_empty(key));
        }

        let format = match file_format.parse::<FileFormat>() {
            Ok(format) => format,
            Err(e) => {
                info!(
                    format = %file_format,
                    key = %key,
                    "The file format {} is not supported to be written to S3!",
                    file_format
                );
                return Err(e);
            }
        };
        self.write_batch_to_s3(batch, key, format).await
    }

    /// Delete an object. Deleting a missing key is not an error.
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        info!(
            endpoint = %self.endpoint_url,
            bucket = %self.bucket,
            key = %key,
            op = "delete",
            "Deleting file {}",
            self.object_uri(key)
        );
        self.storage.delete(key).await
    }

    async fn fetch(&self, key: &str) -> Result<Bytes> {
        info!(
            endpoint = %self.endpoint_url,
            bucket = %self.bucket,
            key = %key,
            op = "read",
            "Reading file {}",
            self.object_uri(key)
        );
        self.storage.get(key).await
    }

    fn skip_empty(&self, key: &str) -> WriteOutcome {
        info!(key = %key, "The table is empty! No file will be written!");
        WriteOutcome::SkippedEmpty
    }

    async fn put_object(
        &self,
        buffer: Vec<u8>,
        key: &str,
        format: FileFormat,
    ) -> Result<WriteOutcome> {
        let bytes = buffer.len() as u64;
        info!(
            endpoint = %self.endpoint_url,
            bucket = %self.bucket,
            key = %key,
            op = "write",
            format = %format,
            bytes,
            "Writing file to {}",
            self.object_uri(key)
        );
        self.storage.put(key, Bytes::from(buffer)).await?;
        Ok(WriteOutcome::Written {
            key: key.to_string(),
            bytes,
            format,
        })
    }
}
