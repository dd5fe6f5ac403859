//! Parquet bytes <-> Arrow `RecordBatch`.
//!
//! Objects are built fully in memory before upload. The Arrow schema is
//! embedded in the file metadata, so column types and nullability survive a
//! round trip.

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;

use xetra_core::{Result, XetraError};

/// Serialize a table into one Parquet object.
///
/// Column pages are LZ4_RAW compressed. No index column is added; the
/// object holds exactly the batch's columns.
pub fn encode_parquet(batch: &RecordBatch) -> Result<Vec<u8>> {
    let props = WriterProperties::builder()
        .set_compression(Compression::LZ4_RAW)
        .build();
    let encode_err = |e: ParquetError| XetraError::encode(format!("Parquet encoding failed: {e}"));

    let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), Some(props))
        .map_err(encode_err)?;
    writer.write(batch).map_err(encode_err)?;
    // Writes the footer
    writer.into_inner().map_err(encode_err)
}

/// Read a whole Parquet object into a single RecordBatch.
pub fn decode_parquet(key: &str, data: Bytes) -> Result<RecordBatch> {
    let reader_builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .map_err(|e| XetraError::parse(key, format!("Failed to open Parquet reader: {e}")))?;
    let schema = reader_builder.schema().clone();

    let reader = reader_builder
        .build()
        .map_err(|e| XetraError::parse(key, format!("Failed to build Parquet reader: {e}")))?;

    let mut batches = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| XetraError::parse(key, format!("Failed to read Parquet batch: {e}")))?;
        batches.push(batch);
    }

    if batches.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    arrow::compute::concat_batches(&schema, &batches).map_err(|e| XetraError::parse(key, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::*;
    use arrow::datatypes::{DataType, Field, Schema};

    fn mixed_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("isin", DataType::Utf8, false),
            Field::new("price", DataType::Float64, true),
            Field::new("volume", DataType::Int64, false),
            Field::new("traded", DataType::Boolean, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["AT0000A0E9W5", "DE000A0DJ6J9"])),
                Arc::new(Float64Array::from(vec![Some(14.76), None])),
                Arc::new(Int64Array::from(vec![4, 1200])),
                Arc::new(BooleanArray::from(vec![Some(true), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_parquet_magic() {
        let bytes = encode_parquet(&mixed_batch()).unwrap();
        assert!(!bytes.is_empty());
        // Parquet magic bytes
        assert_eq!(&bytes[0..4], b"PAR1");
        assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
    }

    #[test]
    fn test_roundtrip_keeps_types() {
        let batch = mixed_batch();
        let bytes = encode_parquet(&batch).unwrap();
        let decoded = decode_parquet("t.parquet", Bytes::from(bytes)).unwrap();

        assert_eq!(decoded.num_rows(), 2);
        assert_eq!(decoded.schema().fields(), batch.schema().fields());
        assert_eq!(decoded.columns(), batch.columns());
    }

    #[test]
    fn test_decode_garbage_is_parse_error() {
        let err = decode_parquet("junk.parquet", Bytes::from_static(b"not parquet")).unwrap_err();
        assert!(matches!(err, XetraError::Parse { ref key, .. } if key == "junk.parquet"));
    }
}
