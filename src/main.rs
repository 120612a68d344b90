use batch_etl::utils::error::{EtlError, ErrorSeverity};
use batch_etl::utils::{logger, validation::Validate};
use batch_etl::{CliConfig, EtlEngine, PipelineConfig};
use clap::Parser;

fn main() {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, cli.log_format());

    tracing::info!("🚀 Starting batch-etl");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        exit_with(&e);
    }

    tracing::info!("📁 Loading pipeline from: {}", cli.config);
    let mut config = match PipelineConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            exit_with(&e);
        }
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }
    tracing::info!(
        "✅ Pipeline '{}' loaded: {} validators, {} transformers",
        config.name(),
        config.validators.len(),
        config.transformers.len()
    );

    match EtlEngine::new(config).dry_run(cli.dry_run).run() {
        Ok(summary) => {
            tracing::info!("✅ Processed {} of {} records", summary.output_records, summary.input_records);
            if summary.written {
                println!("✅ Wrote {} records to {}", summary.output_records, summary.output_path);
            } else {
                println!("✅ Processed {} records, nothing written", summary.output_records);
            }
        }
        Err(EtlError::ValidationError { errors }) => {
            eprintln!("❌ {} record(s) failed validation:", errors.len());
            for error in &errors {
                eprintln!("   {}", error);
            }
            exit_with(&EtlError::ValidationError { errors });
        }
        Err(e) => {
            tracing::error!(
                "❌ Pipeline run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            exit_with(&e);
        }
    }
}

fn exit_with(e: &EtlError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
