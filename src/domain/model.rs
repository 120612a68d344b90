use crate::utils::error::EtlError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of data: field name to JSON value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(field.into(), value.into())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl TryFrom<Value> for Record {
    type Error = EtlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(EtlError::FormatError {
                message: format!("expected a JSON object, found {}", json_type_name(&other)),
            }),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders a scalar the way it reads in a flat file: strings unquoted,
/// null as nothing, everything else as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub processor: String,
    pub processed_at: DateTime<Utc>,
    pub total_records: usize,
    pub processed_records: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Validation,
    Transformation,
}

/// Outcome of one pipeline run. A run either produced data or errors, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingResult {
    Succeeded {
        records: Vec<Record>,
        metadata: ProcessingMetadata,
    },
    Failed {
        stage: FailureStage,
        errors: Vec<String>,
    },
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Succeeded { .. })
    }

    pub fn records(&self) -> Option<&[Record]> {
        match self {
            ProcessingResult::Succeeded { records, .. } => Some(records),
            ProcessingResult::Failed { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&[String]> {
        match self {
            ProcessingResult::Succeeded { .. } => None,
            ProcessingResult::Failed { errors, .. } => Some(errors),
        }
    }

    pub fn failure_stage(&self) -> Option<FailureStage> {
        match self {
            ProcessingResult::Succeeded { .. } => None,
            ProcessingResult::Failed { stage, .. } => Some(*stage),
        }
    }

    pub fn metadata(&self) -> Option<&ProcessingMetadata> {
        match self {
            ProcessingResult::Succeeded { metadata, .. } => Some(metadata),
            ProcessingResult::Failed { .. } => None,
        }
    }

    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            ProcessingResult::Succeeded { records, .. } => Some(records),
            ProcessingResult::Failed { .. } => None,
        }
    }
}

/// Result of the validate phase on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid_records: Vec<Record>,
    pub errors: Vec<String>,
    pub total_records: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
