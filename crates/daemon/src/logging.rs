//! Subscriber setup: stdout (pretty or JSON), optional rolling file, optional OTLP

use crate::config::{LogFormat, LoggingConfig};
use crate::telemetry::{self, BoxedLayer};
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_subscriber::{Layer, Registry};

const DEFAULT_LOG_FILTER: &str = "thumbnailer=info,thumbnail_worker=info";
const LOG_FILE_PREFIX: &str = "thumbnail-worker.log";

/// Handles that must outlive the subscriber
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
    pub telemetry_enabled: bool,
}

pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    let mut layers: Vec<BoxedLayer<Registry>> = Vec::new();

    layers.push(match config.format {
        // Production: JSON structured logging
        LogFormat::Json => fmt::layer().json().boxed(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    });

    let file_guard = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    let otel = telemetry::telemetry_layer::<Registry>()?;
    let telemetry_enabled = otel.is_some();
    layers.extend(otel);

    tracing_subscriber::registry()
        .with(layers.with_filter(env_filter))
        .try_init()?;

    Ok(LoggingGuard {
        _file: file_guard,
        telemetry_enabled,
    })
}
