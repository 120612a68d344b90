use crate::core::{Record, RecordValidator, Verdict};
use crate::domain::model::value_to_text;
use crate::utils::error::Result;
use regex::Regex;
use serde_json::Value;

/// Fails a record when any configured field is absent or null.
#[derive(Debug, Clone)]
pub struct RequiredFieldValidator {
    required_fields: Vec<String>,
}

impl RequiredFieldValidator {
    pub fn new<I, S>(required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_fields: required_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }
}

impl RecordValidator for RequiredFieldValidator {
    fn name(&self) -> &str {
        "RequiredFieldValidator"
    }

    fn validate(&self, record: &Record) -> Verdict {
        let missing: Vec<&str> = self
            .required_fields
            .iter()
            .filter(|field| matches!(record.get(field), None | Some(Value::Null)))
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Invalid(format!("Missing required fields: {}", missing.join(", ")))
        }
    }
}

/// Requires a field to be present and its text form to match a regex.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    field: String,
    pattern: Regex,
}

impl PatternValidator {
    pub fn new(field: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self {
            field: field.into(),
            pattern: Regex::new(pattern)?,
        })
    }
}

impl RecordValidator for PatternValidator {
    fn name(&self) -> &str {
        "PatternValidator"
    }

    fn validate(&self, record: &Record) -> Verdict {
        match record.get(&self.field) {
            None | Some(Value::Null) => Verdict::Invalid(format!("Field '{}' is missing", self.field)),
            Some(value) => {
                if self.pattern.is_match(&value_to_text(value)) {
                    Verdict::Valid
                } else {
                    Verdict::Invalid(format!(
                        "Field '{}' does not match pattern '{}'",
                        self.field,
                        self.pattern.as_str()
                    ))
                }
            }
        }
    }
}
