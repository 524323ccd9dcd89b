//! Tracing setup for the builder.
//!
//! Console output is always on; a rolling file appender and JSON
//! formatting are opt-in through [`LoggingSettings`]. `RUST_LOG` overrides
//! the configured level when set, and the CLI's `-v`/`-q` flags win over
//! both.

use std::fs;
use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

/// Holds the non-blocking file writer; dropping it flushes whatever is
/// still buffered, so keep it alive until the process exits.
pub struct LogGuards {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber from config plus CLI verbosity flags.
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let level = effective_level(settings, verbose, quiet);

    let (file_layer, file_guard) = match settings.file {
        Some(ref path) => {
            let (layer, guard) = file_layer(path, settings)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer(settings.json_format))
        .with(file_layer)
        .init();

    tracing::debug!(%level, json = settings.json_format, file = ?settings.file, "Logging ready");

    Ok(LogGuards { _file: file_guard })
}

/// Console-only setup for light commands that exit before config loads.
pub fn init_simple(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(fmt::layer().compact())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// `-q` drops to errors only, `-v`/`-vv` raise to debug/trace, otherwise
/// the configured level applies.
fn effective_level(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => settings.level.parse().unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn env_filter(level: Level) -> EnvFilter {
    // RUST_LOG takes precedence when present; the crate's own directive is
    // appended either way so builder logs stay visible
    let own = format!("persona_builder={}", level)
        .parse()
        .expect("crate log directive is valid");
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()))
        .add_directive(own)
}

fn console_layer<S>(json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    if json {
        Box::new(
            fmt::layer()
                .json()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
    } else {
        Box::new(fmt::layer().with_target(true).with_ansi(true).compact())
    }
}

fn file_layer<S>(
    path: &str,
    settings: &LoggingSettings,
) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let path = Path::new(path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| {
        Error::Config(format!(
            "Failed to create log directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("builder");

    // tracing-appender only rotates on time, not size; treat a small size
    // budget as a request for hourly rotation
    let rotation = if (1..10).contains(&settings.max_file_size_mb) {
        Rotation::HOURLY
    } else {
        Rotation::DAILY
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(settings.max_files as usize)
        .build(dir)
        .map_err(|e| Error::Config(format!("Failed to create log appender: {}", e)))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer: Box<dyn Layer<S> + Send + Sync> = if settings.json_format {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
    };

    Ok((layer, guard))
}
