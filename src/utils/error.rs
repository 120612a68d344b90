use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Invalid data format: {message}")]
    FormatError { message: String },

    #[error("Unsupported data format: {value}")]
    UnsupportedFormatError { value: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Transformer '{transformer}' failed: {message}")]
    TransformationError { transformer: String, message: String },

    #[error("{message}")]
    ProcessingError { message: String },

    #[error("Validation failed for {} record(s): {}", .errors.len(), .errors.join("; "))]
    ValidationError { errors: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Config,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::FormatError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::TomlError(_)
            | EtlError::PatternError(_)
            | EtlError::UnsupportedFormatError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            EtlError::TransformationError { .. } | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    /// Only rejected records are `Medium`. Input that cannot be read or parsed
    /// is as fatal as a missing file.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ValidationError { .. } => ErrorSeverity::Medium,
            EtlError::TransformationError { .. } | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            _ => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::IoError(_) => "Check that the input file exists and the output directory is writable",
            EtlError::CsvError(_) => "Make sure every CSV row has the same number of columns as the header",
            EtlError::SerializationError(_) | EtlError::FormatError { .. } => {
                "Input JSON must be an object or an array of objects"
            }
            EtlError::TomlError(_) => "Fix the TOML syntax in the pipeline configuration",
            EtlError::PatternError(_) => "Fix the regular expression in the pattern validator",
            EtlError::UnsupportedFormatError { .. } => "Use a .json or .csv file, or set the format explicitly",
            EtlError::InvalidConfigValueError { .. } => "Review the pipeline configuration file",
            EtlError::TransformationError { .. } | EtlError::ProcessingError { .. } => {
                "Check the transformer configuration against the shape of the input records"
            }
            EtlError::ValidationError { .. } => "Correct the reported records and run the pipeline again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) => format!("Could not access a file: {}", e),
            EtlError::ValidationError { errors } => {
                format!("{} record(s) failed validation", errors.len())
            }
            EtlError::TransformationError {
                transformer,
                message,
            } => format!("Transformation '{}' failed: {}", transformer, message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
