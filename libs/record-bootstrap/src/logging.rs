//! Logging initialization.
//!
//! One `tracing` registry carries a human-readable or JSON layer on stderr and
//! an optional daily-rotated file layer. `RUST_LOG`, when set, wins over the
//! configured level. Records emitted through the `log` facade are bridged in.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt as tfmt};

use crate::paths::resolve_in;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `record_store=debug,info`.
    pub level: String,
    pub format: LogFormat,
    /// Log file, rotated daily. Relative paths resolve inside the data directory.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Filter directive for a `-v` count: 1 info, 2 debug, 3 or more trace.
    #[must_use]
    pub fn level_for_verbosity(verbose: u8) -> Option<&'static str> {
        match verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }

    /// Resolved location of the log file, if any.
    ///
    /// # Errors
    /// Fails when the path uses `~` and no home directory is known.
    pub fn file_path(&self, base_dir: &Path) -> anyhow::Result<Option<PathBuf>> {
        self.file
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(|f| resolve_in(base_dir, f))
            .transpose()
            .context("invalid logging.file")
    }
}

fn build_filter(cfg: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("invalid logging.level '{}'", cfg.level)),
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn stderr_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Text => tfmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => tfmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
    }
}

fn file_layer(path: &Path, format: LogFormat) -> anyhow::Result<(BoxedLayer, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("logging.file has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = match format {
        LogFormat::Text => tfmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
        LogFormat::Json => tfmt::layer().json().with_writer(writer).boxed(),
    };
    Ok((layer, guard))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
///
/// # Errors
/// Fails on an invalid filter directive, an unusable log file location, or
/// when a global subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig, base_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(cfg)?;

    let mut layers: Vec<BoxedLayer> = vec![stderr_layer(cfg.format)];
    let mut guard = None;
    if let Some(path) = cfg.file_path(base_dir)? {
        let (layer, g) = file_layer(&path, cfg.format)?;
        layers.push(layer);
        guard = Some(g);
    }

    let subscriber = tracing_subscriber::registry().with(layers).with(filter);

    tracing_log::LogTracer::init().context("failed to bridge log records")?;
    tracing::subscriber::set_global_default(subscriber)
        .context("global tracing subscriber already installed")?;

    Ok(guard)
}
