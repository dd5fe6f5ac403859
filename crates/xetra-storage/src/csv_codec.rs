//! Delimited text <-> Arrow `RecordBatch`.
//!
//! Reading decodes the raw object bytes with a named text encoding, infers a
//! schema from the whole object (header row = column names) and parses it
//! with `arrow-csv` defaults: rows whose field count differs from the header
//! are rejected, empty fields are read as nulls. Writing always produces
//! comma-separated text with a header row and no index column.
//!
//! With type inference switched off every column is read as `Utf8` and empty
//! fields stay empty strings, so a string-only table written by
//! [`encode_csv`] reads back unchanged.

use std::borrow::Cow;
use std::io::Cursor;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::array::{ArrayRef, AsArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use encoding_rs::Encoding;

use xetra_core::{Result, XetraError};

/// Default text encoding label.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Options for reading a delimited-text object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReadOptions {
    /// WHATWG encoding label, e.g. `utf-8`, `latin1`, `windows-1252`.
    pub encoding: String,
    /// Field delimiter.
    pub delimiter: u8,
    /// Infer column types. When `false` every column is `Utf8`.
    pub infer_types: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            delimiter: DEFAULT_DELIMITER,
            infer_types: true,
        }
    }
}

impl CsvReadOptions {
    /// Use a different text encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Use a different field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Switch column type inference on or off.
    pub fn with_infer_types(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

/// Decode `data` as text using the encoding named by `label`.
///
/// Decoding is strict: malformed byte sequences fail with
/// [`XetraError::Parse`] instead of being replaced. A byte-order mark for
/// the requested encoding is skipped.
pub fn decode_text<'a>(key: &str, data: &'a [u8], label: &str) -> Result<Cow<'a, str>> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        XetraError::Config {
            message: format!("unknown text encoding '{label}'"),
        }
    })?;

    let body = match Encoding::for_bom(data) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &data[bom_len..],
        _ => data,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            XetraError::parse(key, format!("content is not valid {}", encoding.name()))
        })
}

/// Parse delimited text into a single `RecordBatch`.
///
/// An empty object yields a batch with no columns; a header without rows
/// yields a zero-row batch carrying the header's columns.
pub fn decode_csv(key: &str, data: &[u8], options: &CsvReadOptions) -> Result<RecordBatch> {
    let text = decode_text(key, data, &options.encoding)?;

    if text.trim().is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    let format = Format::default()
        .with_header(true)
        .with_delimiter(options.delimiter);

    let schema = if options.infer_types {
        format.infer_schema(Cursor::new(text.as_bytes()), None)
    } else {
        // Header names only, every column text
        format
            .infer_schema(Cursor::new(text.as_bytes()), Some(0))
            .map(|(header, n)| {
                let fields: Vec<Field> = header
                    .fields()
                    .iter()
                    .map(|f| Field::new(f.name(), DataType::Utf8, true))
                    .collect();
                (Schema::new(fields), n)
            })
    }
    .map_err(|e| XetraError::parse(key, e))?
    .0;
    let schema = Arc::new(schema);

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(Cursor::new(text.as_bytes()))
        .map_err(|e| XetraError::parse(key, e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| XetraError::parse(key, e))?;

    if batches.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let batch =
        arrow::compute::concat_batches(&schema, &batches).map_err(|e| XetraError::parse(key, e))?;
    if options.infer_types {
        Ok(batch)
    } else {
        empty_fields_as_strings(key, batch)
    }
}

/// Replace the nulls `arrow-csv` reads for empty fields with `""`.
fn empty_fields_as_strings(key: &str, batch: RecordBatch) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for column in batch.columns() {
        let strings = column
            .as_string_opt::<i32>()
            .ok_or_else(|| XetraError::parse(key, "expected a text column"))?;
        let filled = StringArray::from_iter_values(strings.iter().map(|v| v.unwrap_or("")));
        columns.push(Arc::new(filled));
    }
    RecordBatch::try_new(batch.schema(), columns).map_err(|e| XetraError::parse(key, e))
}

/// Encode a batch as comma-separated text with a header row.
pub fn encode_csv(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(DEFAULT_DELIMITER)
        .build(Vec::new());
    writer
        .write(batch)
        .map_err(|e| XetraError::encode(format!("Failed to write CSV data: {e}")))?;
    Ok(writer.into_inner())
}
