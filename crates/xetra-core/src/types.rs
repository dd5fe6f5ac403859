//! Format and outcome types shared by the connector and its callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::XetraError;

/// File formats the connector can write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Comma-separated text with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl FileFormat {
    /// The canonical lowercase name, also used as the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
        }
    }

    /// File extension for objects of this format, without the dot.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the exact lowercase names are accepted.
impl FromStr for FileFormat {
    type Err = XetraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            _ => Err(XetraError::WrongFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Result of a successful write call.
///
/// Failure is the `Err` arm of the surrounding `Result`, so callers always
/// distinguish "written", "nothing to write" and "failed".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Exactly one object was stored at `key`.
    Written {
        /// Destination key.
        key: String,
        /// Size of the stored object in bytes.
        bytes: u64,
        /// Format the object was encoded in.
        format: FileFormat,
    },
    /// The table had no data; storage was not touched.
    SkippedEmpty,
}

impl WriteOutcome {
    /// `true` if an object was stored.
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("csv".parse::<FileFormat>().unwrap(), FileFormat::Csv);
        assert_eq!("parquet".parse::<FileFormat>().unwrap(), FileFormat::Parquet);
    }

    #[test]
    fn test_parse_is_exact() {
        for name in ["PARQUET", "Csv", " csv ", "parquet\n", ""] {
            match name.parse::<FileFormat>() {
                Err(XetraError::WrongFormat { format }) => assert_eq!(format, name),
                other => panic!("Expected WrongFormat for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_unknown_format() {
        let err = "wrong_format".parse::<FileFormat>().unwrap_err();
        match err {
            XetraError::WrongFormat { format } => assert_eq!(format, "wrong_format"),
            other => panic!("Expected WrongFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for format in [FileFormat::Csv, FileFormat::Parquet] {
            assert_eq!(format.to_string().parse::<FileFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_format_serde() {
        let json = serde_json::to_string(&FileFormat::Parquet).unwrap();
        assert_eq!(json, "\"parquet\"");
        let back: FileFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(back, FileFormat::Csv);
    }

    #[test]
    fn test_write_outcome_is_written() {
        let written = WriteOutcome::Written {
            key: "a.csv".into(),
            bytes: 10,
            format: FileFormat::Csv,
        };
        assert!(written.is_written());
        assert!(!WriteOutcome::SkippedEmpty.is_written());
    }
}
