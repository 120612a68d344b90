pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{reader::DataReader, writer::DataWriter, DataFormat};
pub use config::PipelineConfig;
pub use core::etl::{EtlEngine, RunSummary};
pub use core::events::{EventLog, TracingObserver};
pub use core::transformers::{CastTarget, Deduplicator, FieldFilter, FieldMapper, TextCleaner, TypeCaster};
pub use core::validators::{PatternValidator, RequiredFieldValidator};
pub use core::DataProcessor;
pub use domain::model::{FailureStage, ProcessingMetadata, ProcessingResult, Record, ValidationReport};
pub use domain::ports::{PipelineEvent, PipelineObserver, RecordTransformer, RecordValidator, Verdict};
pub use utils::error::{EtlError, Result};
