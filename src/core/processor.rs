use crate::core::{
    FailureStage, PipelineEvent, PipelineObserver, ProcessingMetadata, ProcessingResult, Record, RecordTransformer,
    RecordValidator, ValidationReport,
};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;

/// Runs a batch through every validator, then, if all records passed, through
/// the transformer chain.
pub struct DataProcessor {
    name: String,
    validators: Vec<Box<dyn RecordValidator>>,
    transformers: Vec<Box<dyn RecordTransformer>>,
    observers: Vec<Box<dyn PipelineObserver>>,
}

impl DataProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validators: Vec::new(),
            transformers: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn transformer_count(&self) -> usize {
        self.transformers.len()
    }

    /// Observers only see events emitted after they are added.
    pub fn add_observer(&mut self, observer: Box<dyn PipelineObserver>) {
        self.observers.push(observer);
    }

    pub fn add_validator(&mut self, validator: Box<dyn RecordValidator>) {
        self.emit(PipelineEvent::ValidatorRegistered {
            processor: self.name.clone(),
            validator: validator.name().to_string(),
        });
        self.validators.push(validator);
    }

    pub fn add_transformer(&mut self, transformer: Box<dyn RecordTransformer>) {
        self.emit(PipelineEvent::TransformerRegistered {
            processor: self.name.clone(),
            transformer: transformer.name().to_string(),
        });
        self.transformers.push(transformer);
    }

    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.add_observer(Box::new(observer));
        self
    }

    pub fn with_validator(mut self, validator: impl RecordValidator + 'static) -> Self {
        self.add_validator(Box::new(validator));
        self
    }

    pub fn with_transformer(mut self, transformer: impl RecordTransformer + 'static) -> Self {
        self.add_transformer(Box::new(transformer));
        self
    }

    fn emit(&self, event: PipelineEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Checks every record; the first failing validator decides the record's
    /// single error message.
    pub fn validate_data(&self, data: &[Record]) -> ValidationReport {
        let mut valid_records = Vec::with_capacity(data.len());
        let mut errors = Vec::new();

        for (index, record) in data.iter().enumerate() {
            let rejection = self.validators.iter().find_map(|validator| {
                validator
                    .validate(record)
                    .explanation()
                    .map(|reason| (validator.name(), reason.to_string()))
            });

            match rejection {
                None => valid_records.push(record.clone()),
                Some((validator, reason)) => {
                    self.emit(PipelineEvent::RecordRejected {
                        processor: self.name.clone(),
                        index,
                        validator: validator.to_string(),
                        reason: reason.clone(),
                    });
                    errors.push(format!("Record {}: {}", index, reason));
                }
            }
        }

        ValidationReport {
            valid_records,
            errors,
            total_records: data.len(),
        }
    }

    /// Applies the transformer chain in registration order. The first failure
    /// stops the chain.
    pub fn transform_data(&self, data: Vec<Record>) -> Result<Vec<Record>> {
        let mut current = data;

        for transformer in &self.transformers {
            current = transformer.transform(&current).map_err(|e| match e {
                wrapped @ EtlError::TransformationError { .. } => wrapped,
                other => EtlError::TransformationError {
                    transformer: transformer.name().to_string(),
                    message: other.to_string(),
                },
            })?;
            self.emit(PipelineEvent::TransformerApplied {
                processor: self.name.clone(),
                transformer: transformer.name().to_string(),
                output_records: current.len(),
            });
        }

        Ok(current)
    }

    /// Runs the full pipeline. Never returns an error: failures are reported in
    /// the result.
    pub fn process(&self, data: Vec<Record>) -> ProcessingResult {
        let total_records = data.len();
        self.emit(PipelineEvent::RunStarted {
            processor: self.name.clone(),
            total_records,
        });

        let report = self.validate_data(&data);
        if !report.is_valid() {
            self.emit(PipelineEvent::ValidationFailed {
                processor: self.name.clone(),
                failed_records: report.errors.len(),
            });
            return ProcessingResult::Failed {
                stage: FailureStage::Validation,
                errors: report.errors,
            };
        }

        match self.transform_data(report.valid_records) {
            Ok(records) => {
                self.emit(PipelineEvent::RunSucceeded {
                    processor: self.name.clone(),
                    processed_records: records.len(),
                });
                let metadata = ProcessingMetadata {
                    processor: self.name.clone(),
                    processed_at: Utc::now(),
                    total_records,
                    processed_records: records.len(),
                };
                ProcessingResult::Succeeded { records, metadata }
            }
            Err(e) => {
                let message = format!("Transformation failed: {}", e);
                self.emit(PipelineEvent::RunFailed {
                    processor: self.name.clone(),
                    error: message.clone(),
                });
                ProcessingResult::Failed {
                    stage: FailureStage::Transformation,
                    errors: vec![message],
                }
            }
        }
    }
}

impl std::fmt::Debug for DataProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProcessor")
            .field("name", &self.name)
            .field(
                "validators",
                &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .field(
                "transformers",
                &self.transformers.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventLog;
    use crate::core::transformers::FieldMapper;
    use crate::core::validators::RequiredFieldValidator;
    use crate::core::Verdict;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sample_data() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": 1, "name": "John", "email": "john@example.com", "age": 30},
            {"id": 2, "name": "Jane", "email": "jane@example.com", "age": 25},
            {"id": 3, "name": "Bob", "email": "bob@example.com"}
        ]))
        .unwrap()
    }

    struct FailingTransformer;

    impl RecordTransformer for FailingTransformer {
        fn name(&self) -> &str {
            "FailingTransformer"
        }

        fn transform(&self, _batch: &[Record]) -> Result<Vec<Record>> {
            Err(EtlError::FormatError {
                message: "Transformation error".to_string(),
            })
        }
    }

    struct CountingTransformer(Arc<AtomicUsize>);

    impl RecordTransformer for CountingTransformer {
        fn name(&self) -> &str {
            "CountingTransformer"
        }

        fn transform(&self, batch: &[Record]) -> Result<Vec<Record>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(batch.to_vec())
        }
    }

    struct CountingValidator(Arc<AtomicUsize>);

    impl RecordValidator for CountingValidator {
        fn name(&self) -> &str {
            "CountingValidator"
        }

        fn validate(&self, _record: &Record) -> Verdict {
            self.0.fetch_add(1, Ordering::SeqCst);
            Verdict::Invalid("always".to_string())
        }
    }

    #[test]
    fn test_add_validator_and_transformer() {
        let mut processor = DataProcessor::new("TestProcessor");
        processor.add_validator(Box::new(RequiredFieldValidator::new(["id", "name"])));
        processor.add_transformer(Box::new(FieldMapper::new([("id", "user_id")])));

        assert_eq!(processor.name(), "TestProcessor");
        assert_eq!(processor.validator_count(), 1);
        assert_eq!(processor.transformer_count(), 1);
    }

    #[test]
    fn test_validate_data_success() {
        let processor =
            DataProcessor::new("TestProcessor").with_validator(RequiredFieldValidator::new(["id", "name", "email"]));

        let report = processor.validate_data(&sample_data());

        assert!(report.is_valid());
        assert_eq!(report.valid_records.len(), 3);
        assert_eq!(report.total_records, 3);
    }

    #[test]
    fn test_validate_data_failure() {
        let processor = DataProcessor::new("TestProcessor")
            .with_validator(RequiredFieldValidator::new(["id", "name", "email", "age"]));

        let report = processor.validate_data(&sample_data());

        assert!(!report.is_valid());
        assert_eq!(report.errors, vec!["Record 2: Missing required fields: age".to_string()]);
        assert_eq!(report.valid_records.len(), 2);
    }

    #[test]
    fn test_first_failing_validator_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = DataProcessor::new("TestProcessor")
            .with_validator(RequiredFieldValidator::new(["missing"]))
            .with_validator(CountingValidator(calls.clone()));

        let report = processor.validate_data(&sample_data());

        assert_eq!(report.errors.len(), 3);
        assert!(report.errors.iter().all(|e| e.contains("Missing required fields: missing")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_one_error_per_failing_record() {
        let processor = DataProcessor::new("TestProcessor")
            .with_validator(RequiredFieldValidator::new(["age"]))
            .with_validator(RequiredFieldValidator::new(["phone"]));

        let result = processor.process(sample_data());

        assert_eq!(result.errors().unwrap().len(), 3);
        assert!(result.errors().unwrap()[2].starts_with("Record 2: Missing required fields: age"));
    }

    #[test]
    fn test_transform_data() {
        let processor = DataProcessor::new("TestProcessor")
            .with_transformer(FieldMapper::new([("id", "user_id"), ("name", "full_name")]));

        let result = processor.transform_data(sample_data()).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].get("user_id"), Some(&json!(1)));
        assert_eq!(result[0].get("full_name"), Some(&json!("John")));
    }

    #[test]
    fn test_transformers_chain_in_order() {
        let processor = DataProcessor::new("TestProcessor")
            .with_transformer(FieldMapper::new([("id", "user_id")]))
            .with_transformer(FieldMapper::new([("user_id", "uid")]));

        let result = processor.transform_data(sample_data()).unwrap();

        assert_eq!(result[0].get("uid"), Some(&json!(1)));
        assert!(!result[0].contains_field("user_id"));
    }

    #[test]
    fn test_process_success() {
        let processor = DataProcessor::new("TestProcessor")
            .with_validator(RequiredFieldValidator::new(["id", "name", "email"]))
            .with_transformer(FieldMapper::new([("id", "user_id")]));

        let result = processor.process(sample_data());

        assert!(result.is_success());
        let records = result.records().unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].contains_field("user_id"));
        let metadata = result.metadata().unwrap();
        assert_eq!(metadata.processor, "TestProcessor");
        assert_eq!(metadata.total_records, 3);
        assert_eq!(metadata.processed_records, 3);
    }

    #[test]
    fn test_process_validation_failure_skips_transform() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = DataProcessor::new("TestProcessor")
            .with_validator(RequiredFieldValidator::new(["id", "name", "email", "age"]))
            .with_transformer(CountingTransformer(calls.clone()));

        let result = processor.process(sample_data());

        assert!(!result.is_success());
        assert!(result.records().is_none());
        assert_eq!(result.errors().unwrap().len(), 1);
        assert_eq!(result.failure_stage(), Some(FailureStage::Validation));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_process_transformation_error_aborts_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = DataProcessor::new("TestProcessor")
            .with_validator(RequiredFieldValidator::new(["id", "name", "email"]))
            .with_transformer(FailingTransformer)
            .with_transformer(CountingTransformer(calls.clone()));

        let result = processor.process(sample_data());

        assert!(!result.is_success());
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Transformation failed:"));
        assert!(errors[0].contains("Transformation error"));
        assert!(errors[0].contains("FailingTransformer"));
        assert_eq!(result.failure_stage(), Some(FailureStage::Transformation));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_process_empty_batch_succeeds() {
        let processor =
            DataProcessor::new("TestProcessor").with_validator(RequiredFieldValidator::new(["id"]));

        let result = processor.process(Vec::new());

        assert!(result.is_success());
        assert_eq!(result.records().unwrap().len(), 0);
        assert_eq!(result.metadata().unwrap().total_records, 0);
    }

    #[test]
    fn test_process_preserves_order() {
        let processor = DataProcessor::new("TestProcessor").with_transformer(FieldMapper::new([("name", "n")]));

        let records = processor.process(sample_data()).into_records().unwrap();
        let ids: Vec<&Value> = records.iter().filter_map(|r| r.get("id")).collect();

        assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3)]);
    }

    #[test]
    fn test_observer_sees_registration_and_run_events() {
        let log = Arc::new(EventLog::new());
        let processor = DataProcessor::new("Audited")
            .with_observer(log.clone())
            .with_validator(RequiredFieldValidator::new(["age"]))
            .with_transformer(FieldMapper::new([("id", "user_id")]));

        processor.process(sample_data());

        let events = log.events();
        assert!(matches!(&events[0], PipelineEvent::ValidatorRegistered { validator, .. } if validator == "RequiredFieldValidator"));
        assert!(matches!(&events[1], PipelineEvent::TransformerRegistered { transformer, .. } if transformer == "FieldMapper"));
        assert!(matches!(events[2], PipelineEvent::RunStarted { total_records: 3, .. }));
        assert!(matches!(events[3], PipelineEvent::RecordRejected { index: 2, .. }));
        assert!(matches!(events[4], PipelineEvent::ValidationFailed { failed_records: 1, .. }));
        assert_eq!(events.len(), 5);
    }
}
