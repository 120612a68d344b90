use crate::adapters::reader::DataReader;
use crate::adapters::writer::DataWriter;
use crate::config::PipelineConfig;
use crate::core::{FailureStage, PipelineObserver, ProcessingResult};
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub input_records: usize,
    pub output_records: usize,
    /// False when there was nothing to write (an empty batch going to CSV).
    pub written: bool,
}

/// Reads the configured source, runs the processor, writes the result.
pub struct EtlEngine {
    config: PipelineConfig,
    observers: Vec<Box<dyn PipelineObserver>>,
    dry_run: bool,
}

impl EtlEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            dry_run: false,
        }
    }

    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(self) -> Result<RunSummary> {
        let Self {
            config,
            observers,
            dry_run,
        } = self;

        let mut processor = config.build_processor()?;
        for observer in observers {
            processor.add_observer(observer);
        }

        tracing::info!("📥 {}: Extracting records from {}", config.name(), config.source.path);
        let records = DataReader::read(&config.source.path, Some(config.source_format()?))?;
        let input_records = records.len();
        tracing::info!("📥 {}: Extracted {} records", config.name(), input_records);

        let records = match processor.process(records) {
            ProcessingResult::Succeeded { records, .. } => records,
            ProcessingResult::Failed { stage, errors } => {
                for error in &errors {
                    tracing::warn!("⚠️ {}: {}", config.name(), error);
                }
                return Err(into_run_error(stage, errors));
            }
        };
        let output_records = records.len();

        if dry_run {
            tracing::info!(
                "🔍 {}: Dry run, {} records not written to {}",
                config.name(),
                output_records,
                config.load.output_path
            );
            return Ok(RunSummary {
                output_path: config.load.output_path.clone(),
                input_records,
                output_records,
                written: false,
            });
        }

        tracing::info!("💾 {}: Loading {} records into {}", config.name(), output_records, config.load.output_path);
        let written = DataWriter::write(&records, &config.load.output_path, Some(config.output_format()?))?;
        if !written {
            tracing::warn!("⚠️ {}: Nothing to write, no output file created", config.name());
        }

        Ok(RunSummary {
            output_path: config.load.output_path.clone(),
            input_records,
            output_records,
            written,
        })
    }
}

fn into_run_error(stage: FailureStage, errors: Vec<String>) -> EtlError {
    match stage {
        FailureStage::Validation => EtlError::ValidationError { errors },
        FailureStage::Transformation => EtlError::ProcessingError {
            message: errors.join("; "),
        },
    }
}
