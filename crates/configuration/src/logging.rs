use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "sales-analytics.log";

/// Builds the level filter: `RUST_LOG` if present, otherwise the configured level.
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|e| {
            ConfigError::ValidationError(format!("invalid log level '{}': {}", settings.level, e))
        }),
    }
}

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// when a directory is configured.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// life of the program.
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = env_filter(settings)?;

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}
