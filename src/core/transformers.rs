use crate::core::{Record, RecordTransformer};
use crate::domain::model::{json_type_name, value_to_text};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Renames fields according to an old -> new mapping. Unmapped fields pass through.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    field_mapping: HashMap<String, String>,
}

impl FieldMapper {
    pub fn new<I, K, V>(field_mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            field_mapping: field_mapping
                .into_iter()
                .map(|(old, new)| (old.into(), new.into()))
                .collect(),
        }
    }

    fn map_record(&self, record: &Record) -> Record {
        let mut data = Map::with_capacity(record.len());
        let mut renamed = HashSet::new();

        for (field, value) in &record.data {
            match self.field_mapping.get(field) {
                Some(new_name) => {
                    data.insert(new_name.clone(), value.clone());
                    renamed.insert(new_name.as_str());
                }
                // a renamed field owns its target name
                None if renamed.contains(field.as_str()) => {}
                None => {
                    data.insert(field.clone(), value.clone());
                }
            }
        }

        Record::from(data)
    }
}

impl RecordTransformer for FieldMapper {
    fn name(&self) -> &str {
        "FieldMapper"
    }

    fn transform(&self, batch: &[Record]) -> Result<Vec<Record>> {
        Ok(batch.iter().map(|record| self.map_record(record)).collect())
    }
}

/// Keeps only the listed fields.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    keep: HashSet<String>,
}

impl FieldFilter {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keep: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl RecordTransformer for FieldFilter {
    fn name(&self) -> &str {
        "FieldFilter"
    }

    fn transform(&self, batch: &[Record]) -> Result<Vec<Record>> {
        Ok(batch
            .iter()
            .map(|record| {
                Record::from(
                    record
                        .data
                        .iter()
                        .filter(|(field, _)| self.keep.contains(field.as_str()))
                        .map(|(field, value)| (field.clone(), value.clone()))
                        .collect::<Map<String, Value>>(),
                )
            })
            .collect())
    }
}

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>").expect("HTML tag pattern is valid")
});

/// Cleans up string values. Non-string values are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCleaner {
    #[serde(default)]
    pub trim_whitespace: bool,
    #[serde(default)]
    pub collapse_newlines: bool,
    #[serde(default)]
    pub remove_html_tags: bool,
}

impl TextCleaner {
    fn clean(&self, text: &str) -> String {
        let mut cleaned = if self.remove_html_tags {
            HTML_TAG.replace_all(text, "").into_owned()
        } else {
            text.to_string()
        };
        if self.collapse_newlines {
            cleaned = cleaned.replace("\r\n", " ").replace(['\r', '\n'], " ");
        }
        if self.trim_whitespace {
            cleaned = cleaned.trim().to_string();
        }
        cleaned
    }
}

impl RecordTransformer for TextCleaner {
    fn name(&self) -> &str {
        "TextCleaner"
    }

    fn transform(&self, batch: &[Record]) -> Result<Vec<Record>> {
        let mut output = batch.to_vec();
        for record in &mut output {
            for value in record.data.values_mut() {
                if let Value::String(s) = value {
                    *s = self.clean(s);
                }
            }
        }
        Ok(output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastTarget {
    String,
    Integer,
    Float,
    Boolean,
}

impl CastTarget {
    fn cast(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (CastTarget::String, other) => Some(Value::String(value_to_text(other))),
            (CastTarget::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(Value::from),
            (CastTarget::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (CastTarget::Integer, Value::Bool(b)) => Some(Value::from(i64::from(*b))),
            (CastTarget::Float, Value::Number(n)) => n.as_f64().map(Value::from),
            (CastTarget::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from),
            (CastTarget::Boolean, Value::Bool(b)) => Some(Value::Bool(*b)),
            (CastTarget::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(Value::Bool(true)),
                "false" | "no" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (CastTarget::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Converts field values to a target type. Missing and null fields are left alone;
/// any value that cannot be converted fails the whole batch.
#[derive(Debug, Clone)]
pub struct TypeCaster {
    casts: Vec<(String, CastTarget)>,
}

impl TypeCaster {
    pub fn new<I, S>(casts: I) -> Self
    where
        I: IntoIterator<Item = (S, CastTarget)>,
        S: Into<String>,
    {
        Self {
            casts: casts.into_iter().map(|(field, target)| (field.into(), target)).collect(),
        }
    }
}

impl RecordTransformer for TypeCaster {
    fn name(&self) -> &str {
        "TypeCaster"
    }

    fn transform(&self, batch: &[Record]) -> Result<Vec<Record>> {
        let mut output = batch.to_vec();
        for (index, record) in output.iter_mut().enumerate() {
            for (field, target) in &self.casts {
                let Some(value) = record.data.get_mut(field) else {
                    continue;
                };
                if value.is_null() {
                    continue;
                }
                let cast = target.cast(value).ok_or_else(|| EtlError::TransformationError {
                    transformer: self.name().to_string(),
                    message: format!(
                        "record {}: cannot cast field '{}' ({} {}) to {:?}",
                        index,
                        field,
                        json_type_name(value),
                        value,
                        target
                    ),
                })?;
                *value = cast;
            }
        }
        Ok(output)
    }
}

/// Drops records whose key was already seen, keeping the first occurrence.
/// With no key fields the whole record is the key.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    key_fields: Vec<String>,
}

impl Deduplicator {
    pub fn new<I, S>(key_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_fields: key_fields.into_iter().map(Into::into).collect(),
        }
    }

    fn key(&self, record: &Record) -> Result<String> {
        if self.key_fields.is_empty() {
            return Ok(serde_json::to_string(&sorted_object(&record.data))?);
        }
        let parts: Vec<Value> = self
            .key_fields
            .iter()
            .map(|field| record.get(field).map(sorted_keys).unwrap_or(Value::Null))
            .collect();
        Ok(serde_json::to_string(&parts)?)
    }
}

/// Copy of `value` with the fields of every nested object sorted by name.
fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => sorted_object(map),
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

fn sorted_object(map: &Map<String, Value>) -> Value {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    Value::Object(
        entries
            .into_iter()
            .map(|(field, value)| (field.clone(), sorted_keys(value)))
            .collect(),
    )
}

impl RecordTransformer for Deduplicator {
    fn name(&self) -> &str {
        "Deduplicator"
    }

    fn transform(&self, batch: &[Record]) -> Result<Vec<Record>> {
        let mut seen = HashSet::new();
        let mut output = Vec::with_capacity(batch.len());
        for record in batch {
            if seen.insert(self.key(record)?) {
                output.push(record.clone());
            }
        }
        Ok(output)
    }
}
