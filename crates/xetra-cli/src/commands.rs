//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use arrow::util::pretty::pretty_format_batches;

use xetra_connector::{CsvReadOptions, S3BucketConnector, WriteOutcome};

/// List keys under `prefix`, one per line.
pub async fn ls(connector: &S3BucketConnector, prefix: &str) -> Result<()> {
    let keys = connector
        .list_files_in_prefix(prefix)
        .await
        .with_context(|| format!("Failed to list prefix '{prefix}'"))?;
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

/// Read a CSV object and pretty-print it.
pub async fn cat(
    connector: &S3BucketConnector,
    key: &str,
    options: &CsvReadOptions,
) -> Result<()> {
    let batch = connector
        .read_csv_to_batch(key, options)
        .await
        .with_context(|| format!("Failed to read {key}"))?;
    println!("{}", pretty_format_batches(&[batch])?);
    Ok(())
}

/// Read a CSV object and write it back under `dst` in `format`.
pub async fn convert(
    connector: &S3BucketConnector,
    src: &str,
    dst: &str,
    format: &str,
    options: &CsvReadOptions,
) -> Result<()> {
    let batch = connector
        .read_csv_to_batch(src, options)
        .await
        .with_context(|| format!("Failed to read {src}"))?;
    let outcome = connector
        .write_batch_as(&batch, dst, format)
        .await
        .with_context(|| format!("Failed to write {dst}"))?;

    match outcome {
        WriteOutcome::Written { key, bytes, format } => {
            println!("written {bytes} bytes to {key} ({format})")
        }
        WriteOutcome::SkippedEmpty => println!("skipped: empty table"),
    }
    Ok(())
}

/// Delete an object.
pub async fn rm(connector: &S3BucketConnector, key: &str) -> Result<()> {
    connector
        .delete_object(key)
        .await
        .with_context(|| format!("Failed to delete {key}"))
}

/// Check that the bucket answers.
pub async fn check(connector: &S3BucketConnector) -> Result<()> {
    connector.validate_connection().await?;
    println!(
        "ok: {}/{} is reachable",
        connector.endpoint_url(),
        connector.bucket()
    );
    Ok(())
}

/// Build read options from the command-line flags.
pub fn read_options(encoding: &str, delimiter: char, text_only: bool) -> Result<CsvReadOptions> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{delimiter}'");
    }
    Ok(CsvReadOptions::default()
        .with_encoding(encoding)
        .with_delimiter(delimiter as u8)
        .with_infer_types(!text_only))
}
