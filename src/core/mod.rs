pub mod etl;
pub mod events;
pub mod processor;
pub mod transformers;
pub mod validators;

pub use crate::domain::model::{FailureStage, ProcessingMetadata, ProcessingResult, Record, ValidationReport};
pub use crate::domain::ports::{PipelineEvent, PipelineObserver, RecordTransformer, RecordValidator, Verdict};
pub use crate::utils::error::Result;
pub use processor::DataProcessor;
