use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One short human-readable line per event.
    #[default]
    Compact,
    /// One JSON object per event, for collected logs.
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "batch_etl=debug,info"
    } else {
        "batch_etl=info,warn"
    }
}

/// `RUST_LOG` wins over the verbosity flag when it is set.
pub fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Installs the global subscriber. Call once, before the pipeline runs.
pub fn init_logger(verbose: bool, format: LogFormat) {
    let layer = tracing_subscriber::fmt::layer().with_target(false);
    let subscriber = tracing_subscriber::registry().with(log_filter(verbose));

    match format {
        LogFormat::Compact => subscriber.with(layer.compact()).init(),
        LogFormat::Json => subscriber.with(layer.json()).init(),
    }
}
