//! Storage backends and table codecs for the Xetra connector.
//!
//! - [`ObjectStoreBackend`]: an [`ObjectStorage`](xetra_core::ObjectStorage)
//!   over the `object_store` crate (S3-compatible, in-memory or local filesystem)
//! - [`csv_codec`]: delimited text <-> Arrow `RecordBatch`
//! - [`parquet_codec`]: Parquet bytes <-> Arrow `RecordBatch`

pub mod backend;
pub mod csv_codec;
pub mod parquet_codec;

pub use backend::ObjectStoreBackend;
pub use csv_codec::{decode_csv, encode_csv, CsvReadOptions};
pub use parquet_codec::{decode_parquet, encode_parquet};

/// `true` if the batch has no data to persist (no rows or no columns).
pub fn is_empty_batch(batch: &arrow::record_batch::RecordBatch) -> bool {
    batch.num_rows() == 0 || batch.num_columns() == 0
}
