use crate::adapters::DataFormat;
use crate::core::events::TracingObserver;
use crate::core::transformers::{CastTarget, Deduplicator, FieldFilter, FieldMapper, TextCleaner, TypeCaster};
use crate::core::validators::{PatternValidator, RequiredFieldValidator};
use crate::core::DataProcessor;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_list, validate_non_empty_string, validate_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

/// A complete pipeline definition: where records come from, how they are
/// checked and reshaped, and where they go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub pipeline: PipelineInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub validators: Vec<ValidatorConfig>,
    #[serde(default)]
    pub transformers: Vec<TransformerConfig>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    pub format: Option<DataFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub format: Option<DataFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorConfig {
    RequiredFields { fields: Vec<String> },
    Pattern { field: String, pattern: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformerConfig {
    RenameFields { mapping: HashMap<String, String> },
    KeepOnlyFields { fields: Vec<String> },
    CleanText(TextCleaner),
    CastTypes { fields: BTreeMap<String, CastTarget> },
    Deduplicate {
        #[serde(default)]
        fields: Vec<String>,
    },
}

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
});

impl PipelineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn name(&self) -> &str {
        &self.pipeline.name
    }

    pub fn source_format(&self) -> Result<DataFormat> {
        DataFormat::resolve(&self.source.path, self.source.format)
    }

    pub fn output_format(&self) -> Result<DataFormat> {
        DataFormat::resolve(&self.load.output_path, self.load.format)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        validate_path("source.path", &self.source.path)?;
        if self.source.format.is_none() {
            validate_file_extension("source.path", &self.source.path, &DataFormat::EXTENSIONS)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        if self.load.format.is_none() {
            validate_file_extension("load.output_path", &self.load.output_path, &DataFormat::EXTENSIONS)?;
        }

        for (index, validator) in self.validators.iter().enumerate() {
            match validator {
                ValidatorConfig::RequiredFields { fields } => {
                    validate_non_empty_list(&format!("validators[{}].fields", index), fields)?;
                }
                ValidatorConfig::Pattern { field, pattern } => {
                    validate_non_empty_string(&format!("validators[{}].field", index), field)?;
                    Regex::new(pattern).map_err(|e| EtlError::InvalidConfigValueError {
                        field: format!("validators[{}].pattern", index),
                        value: pattern.clone(),
                        reason: e.to_string(),
                    })?;
                }
            }
        }

        for (index, transformer) in self.transformers.iter().enumerate() {
            match transformer {
                TransformerConfig::RenameFields { mapping } => {
                    if mapping.is_empty() {
                        return Err(EtlError::InvalidConfigValueError {
                            field: format!("transformers[{}].mapping", index),
                            value: "{}".to_string(),
                            reason: "Mapping must contain at least one entry".to_string(),
                        });
                    }
                    for (old, new) in mapping {
                        validate_non_empty_string(&format!("transformers[{}].mapping.{}", index, old), new)?;
                    }
                }
                TransformerConfig::KeepOnlyFields { fields } => {
                    validate_non_empty_list(&format!("transformers[{}].fields", index), fields)?;
                }
                TransformerConfig::CastTypes { fields } => {
                    if fields.is_empty() {
                        return Err(EtlError::InvalidConfigValueError {
                            field: format!("transformers[{}].fields", index),
                            value: "{}".to_string(),
                            reason: "At least one field must be cast".to_string(),
                        });
                    }
                }
                TransformerConfig::CleanText(_) | TransformerConfig::Deduplicate { .. } => {}
            }
        }

        Ok(())
    }

    /// Builds a processor with validators and transformers in configured order,
    /// reporting through `tracing`.
    pub fn build_processor(&self) -> Result<DataProcessor> {
        let mut processor = DataProcessor::new(self.pipeline.name.clone());
        processor.add_observer(Box::new(TracingObserver));

        for validator in &self.validators {
            match validator {
                ValidatorConfig::RequiredFields { fields } => {
                    processor.add_validator(Box::new(RequiredFieldValidator::new(fields.iter().cloned())));
                }
                ValidatorConfig::Pattern { field, pattern } => {
                    processor.add_validator(Box::new(PatternValidator::new(field.clone(), pattern)?));
                }
            }
        }

        for transformer in &self.transformers {
            match transformer {
                TransformerConfig::RenameFields { mapping } => {
                    processor.add_transformer(Box::new(FieldMapper::new(mapping.clone())));
                }
                TransformerConfig::KeepOnlyFields { fields } => {
                    processor.add_transformer(Box::new(FieldFilter::new(fields.iter().cloned())));
                }
                TransformerConfig::CleanText(cleaner) => {
                    processor.add_transformer(Box::new(cleaner.clone()));
                }
                TransformerConfig::CastTypes { fields } => {
                    processor.add_transformer(Box::new(TypeCaster::new(
                        fields.iter().map(|(field, target)| (field.clone(), *target)),
                    )));
                }
                TransformerConfig::Deduplicate { fields } => {
                    processor.add_transformer(Box::new(Deduplicator::new(fields.iter().cloned())));
                }
            }
        }

        Ok(processor)
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
