use crate::adapters::DataFormat;
use crate::config::PipelineConfig;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "batch-etl")]
#[command(about = "Validate and transform JSON/CSV record batches")]
pub struct CliConfig {
    /// Path to the TOML pipeline definition
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: String,

    /// Read records from this file instead of source.path
    #[arg(long)]
    pub input: Option<String>,

    /// Write records to this file instead of load.output_path
    #[arg(long)]
    pub output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Validate and transform but do not write any output
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_json_flag(self.json_logs)
    }

    /// Command-line paths replace the configured ones. A format pinned in the
    /// file only survives when the new path has no recognised extension.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            config.source.path = input.clone();
            config.source.format = DataFormat::from_path(input).ok().or(config.source.format);
        }
        if let Some(output) = &self.output {
            config.load.output_path = output.clone();
            config.load.format = DataFormat::from_path(output).ok().or(config.load.format);
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> PipelineConfig {
        PipelineConfig::from_toml_str(
            r#"
[pipeline]
name = "cli"

[source]
path = "in.txt"
format = "csv"

[load]
output_path = "out.json"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_args() {
        let cli = CliConfig::parse_from(["batch-etl", "-c", "users.toml", "--output", "out.csv", "-v"]);
        assert_eq!(cli.config, "users.toml");
        assert_eq!(cli.output.as_deref(), Some("out.csv"));
        assert!(cli.verbose);
        assert!(!cli.dry_run);
        assert_eq!(cli.log_format(), LogFormat::Compact);
        assert!(cli.validate().is_ok());

        let cli = CliConfig::parse_from(["batch-etl", "--json-logs"]);
        assert_eq!(cli.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_overrides_replace_paths_and_formats() {
        let cli = CliConfig::parse_from(["batch-etl", "--input", "users.json", "--output", "users.csv"]);
        let mut config = base_config();

        cli.apply_overrides(&mut config);

        assert_eq!(config.source.path, "users.json");
        assert_eq!(config.source.format, Some(DataFormat::Json));
        assert_eq!(config.load.output_path, "users.csv");
        assert_eq!(config.output_format().unwrap(), DataFormat::Csv);
    }

    #[test]
    fn test_override_without_known_extension_keeps_pinned_format() {
        let cli = CliConfig::parse_from(["batch-etl", "--input", "dump.txt"]);
        let mut config = base_config();

        cli.apply_overrides(&mut config);

        assert_eq!(config.source.format, Some(DataFormat::Csv));
    }
}
