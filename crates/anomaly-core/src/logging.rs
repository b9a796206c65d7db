// Logging setup for the evaluation toolkit

use anyhow::Context;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(format!("{}", level));
        // Silence polars internals
        for directive in ["polars=warn", "polars_io=warn", "polars_core=warn"] {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
        filter
    })
}

/// Setup structured logging with tracing
///
/// This configures:
/// - Console output with color and timestamps
/// - A JSON log file under `log_dir`
/// - Environment variable filtering
///
/// The returned guard must be held for as long as file output is wanted.
pub fn setup_logging(config: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let log_dir = std::env::var("LOG_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| config.log_dir.clone());
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;

    let log_file = std::env::var("LOG_FILE").unwrap_or_else(|_| config.log_file.clone());

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    // File layer with JSON formatting for structured logs
    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("global tracing subscriber already installed")?;

    tracing::info!("Logging initialized (verbose={})", config.verbose);
    tracing::info!("Log file: {:?}", log_dir.join(&log_file));

    Ok(guard)
}

/// Setup minimal logging (console only, no files)
pub fn setup_minimal_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))?;

    tracing::debug!("Minimal logging initialized");
    Ok(())
}

/// Install the logging `config` asks for.
///
/// With `file_output` set this is [`setup_logging`] and the guard is
/// returned; hold it until exit so buffered lines reach the file.
/// Otherwise console only.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    if config.file_output {
        setup_logging(config).map(Some)
    } else {
        setup_minimal_logging(config.verbose).map(|_| None)
    }
}
