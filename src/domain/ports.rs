use crate::domain::model::Record;
use crate::utils::error::Result;

/// Outcome of checking one record against one validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn explanation(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(reason) => Some(reason),
        }
    }
}

pub trait RecordValidator: Send + Sync {
    fn name(&self) -> &str;

    /// Must depend only on the record and the validator's own configuration.
    fn validate(&self, record: &Record) -> Verdict;
}

pub trait RecordTransformer: Send + Sync {
    fn name(&self) -> &str;

    fn transform(&self, batch: &[Record]) -> Result<Vec<Record>>;
}

/// Something that wants to hear about what a processor is doing.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    ValidatorRegistered {
        processor: String,
        validator: String,
    },
    TransformerRegistered {
        processor: String,
        transformer: String,
    },
    RunStarted {
        processor: String,
        total_records: usize,
    },
    RecordRejected {
        processor: String,
        index: usize,
        validator: String,
        reason: String,
    },
    ValidationFailed {
        processor: String,
        failed_records: usize,
    },
    TransformerApplied {
        processor: String,
        transformer: String,
        output_records: usize,
    },
    RunSucceeded {
        processor: String,
        processed_records: usize,
    },
    RunFailed {
        processor: String,
        error: String,
    },
}
