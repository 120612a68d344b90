use crate::adapters::DataFormat;
use crate::domain::model::{json_type_name, Record};
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::Path;

pub struct DataReader;

impl DataReader {
    pub fn read(path: impl AsRef<Path>, format: Option<DataFormat>) -> Result<Vec<Record>> {
        let path = path.as_ref();
        match DataFormat::resolve(path, format)? {
            DataFormat::Json => Self::read_json(path),
            DataFormat::Csv => Self::read_csv(path),
        }
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let path = path.as_ref();
        tracing::debug!("Reading JSON records from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    /// Accepts an array of objects, or a single object as a batch of one.
    pub fn parse_json(content: &str) -> Result<Vec<Record>> {
        match serde_json::from_str::<Value>(content)? {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(data) => Ok(Record::from(data)),
                    other => Err(EtlError::FormatError {
                        message: format!(
                            "element {} is a {}, expected an object",
                            index,
                            json_type_name(&other)
                        ),
                    }),
                })
                .collect(),
            Value::Object(data) => Ok(vec![Record::from(data)]),
            other => Err(EtlError::FormatError {
                message: format!(
                    "top-level value is a {}, expected an object or an array of objects",
                    json_type_name(&other)
                ),
            }),
        }
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let path = path.as_ref();
        tracing::debug!("Reading CSV records from {}", path.display());
        let file = fs::File::open(path)?;
        Self::parse_csv(file)
    }

    /// First row names the fields; every value is read as a string.
    pub fn parse_csv<R: Read>(input: R) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let data: Map<String, Value> = headers
                .iter()
                .zip(row.iter())
                .map(|(field, value)| (field.to_string(), Value::String(value.to_string())))
                .collect();
            records.push(Record::from(data));
        }

        Ok(records)
    }
}
