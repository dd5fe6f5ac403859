//! Xetra CLI - command-line access to a configured bucket.
//!
//! Commands:
//! - `ls` - List keys under a prefix
//! - `cat` - Print a CSV object as a table
//! - `convert` - Re-write a CSV object as CSV or Parquet
//! - `rm` - Delete an object
//! - `check` - Verify that the endpoint and bucket answer

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xetra_connector::S3BucketConnector;

mod commands;
mod config;

use config::JobConfig;

#[derive(Parser)]
#[command(name = "xetra")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read and write tables in an S3 bucket", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "XETRA_CONFIG", default_value = "xetra.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List keys that start with a prefix
    Ls {
        /// Key prefix (plain string match, not a directory)
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Print a CSV object as a table
    Cat {
        key: String,

        /// Text encoding of the object
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Read every column as text instead of inferring types
        #[arg(long)]
        text: bool,
    },

    /// Read a CSV object and write it under another key
    Convert {
        src: String,

        dst: String,

        /// Output format (csv, parquet)
        #[arg(short, long, default_value = "parquet")]
        format: String,

        /// Text encoding of the source object
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Field delimiter of the source object
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Read every column as text instead of inferring types
        #[arg(long)]
        text: bool,
    },

    /// Delete an object
    Rm { key: String },

    /// Verify that the endpoint and bucket answer
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let job = JobConfig::load(&cli.config)?;
    init_tracing(&job.logging.level);
    tracing::debug!(config = %cli.config.display(), bucket = %job.s3.bucket, "Loaded configuration");

    let connector = S3BucketConnector::new(&job.connector_config()?)?;

    match cli.command {
        Commands::Ls { prefix } => commands::ls(&connector, &prefix).await,
        Commands::Cat {
            key,
            encoding,
            delimiter,
            text,
        } => {
            let options = commands::read_options(&encoding, delimiter, text)?;
            commands::cat(&connector, &key, &options).await
        }
        Commands::Convert {
            src,
            dst,
            format,
            encoding,
            delimiter,
            text,
        } => {
            let options = commands::read_options(&encoding, delimiter, text)?;
            commands::convert(&connector, &src, &dst, &format, &options).await
        }
        Commands::Rm { key } => commands::rm(&connector, &key).await,
        Commands::Check => commands::check(&connector).await,
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}
