use crate::adapters::DataFormat;
use crate::domain::model::{value_to_text, Record};
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

pub struct DataWriter;

impl DataWriter {
    /// Returns whether a file was written.
    pub fn write(records: &[Record], path: impl AsRef<Path>, format: Option<DataFormat>) -> Result<bool> {
        let path = path.as_ref();
        match DataFormat::resolve(path, format)? {
            DataFormat::Json => Self::write_json(records, path).map(|_| true),
            DataFormat::Csv => Self::write_csv(records, path),
        }
    }

    pub fn write_json(records: &[Record], path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = Self::to_json_string(records)?;
        ensure_parent_dir(path)?;
        fs::write(path, content)?;
        tracing::debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    pub fn to_json_string(records: &[Record]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    /// Writes nothing, and creates no file, for an empty batch: there is no
    /// record to take the header from. Returns whether a file was written.
    pub fn write_csv(records: &[Record], path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if records.is_empty() {
            tracing::debug!("No records to write, skipping {}", path.display());
            return Ok(false);
        }

        ensure_parent_dir(path)?;
        let file = fs::File::create(path)?;
        Self::write_csv_to(records, file)?;
        tracing::debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(true)
    }

    /// Header comes from the first record. Later records are written in header
    /// order: missing fields become empty cells and extra fields are dropped.
    pub fn write_csv_to<W: Write>(records: &[Record], output: W) -> Result<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };
        let headers: Vec<&str> = first.field_names().collect();

        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(&headers)?;
        for record in records {
            let row: Vec<String> = headers
                .iter()
                .map(|field| record.get(field).map(value_to_text).unwrap_or_default())
                .collect();
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
