// Adapters layer: moving batches between files and memory.

pub mod reader;
pub mod writer;

use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Json,
    Csv,
}

impl DataFormat {
    pub const EXTENSIONS: [&'static str; 2] = ["json", "csv"];

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| EtlError::UnsupportedFormatError {
                value: path.display().to_string(),
            })?;
        extension.parse()
    }

    /// An explicit format wins over the file extension.
    pub fn resolve(path: impl AsRef<Path>, explicit: Option<DataFormat>) -> Result<Self> {
        match explicit {
            Some(format) => Ok(format),
            None => Self::from_path(path),
        }
    }
}

impl FromStr for DataFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "csv" => Ok(DataFormat::Csv),
            _ => Err(EtlError::UnsupportedFormatError {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Json => write!(f, "json"),
            DataFormat::Csv => write!(f, "csv"),
        }
    }
}
