//! Application configuration.
//!
//! Configuration is layered, highest priority first:
//!
//! 1. Environment variables (`TASKTRACE_` prefix; the `LANGFUSE_HOST`,
//!    `LANGFUSE_PUBLIC_KEY` and `LANGFUSE_SECRET_KEY` names are also read)
//! 2. A TOML file: the path passed in, else `TASKTRACE_CONFIG`, else
//!    `tasktrace.toml` in the working directory when it exists
//! 3. Defaults
//!
//! Durations are whole milliseconds.
//!
//! ```toml
//! [orchestrator]
//! default_backend = "multi"
//! request_timeout_ms = 10000
//!
//! [observability]
//! queue_capacity = 64
//! backpressure = "reject_new"
//! exporter = "http"
//! endpoint = "https://telemetry.example.com/api/traces"
//!
//! [logging]
//! filter = "tasktrace=debug"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent_backend::domain::BackendKind;
use crate::observability::{
    adapters::{HttpTraceExporter, LogTraceExporter, NoopTraceExporter, SinkCredentials},
    ports::{TraceExportError, TraceExporter},
    services::{BackpressurePolicy, RetryPolicy, TracerSettings},
};
use crate::orchestrator::TaskManagerSettings;

/// File read when no path is configured.
pub const CONFIG_FILE: &str = "tasktrace.toml";
/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_VAR: &str = "TASKTRACE_CONFIG";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting holds an unusable value.
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        /// Environment variable or config key.
        name: String,
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP exporter was selected without an endpoint.
    #[error("the http exporter requires an endpoint")]
    MissingEndpoint,

    /// The selected exporter could not be constructed.
    #[error("failed to build trace exporter: {0}")]
    Exporter(#[from] TraceExportError),
}

/// Where closed traces are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExporterKind {
    /// Write traces as JSON through the diagnostic logger.
    #[default]
    Log,
    /// POST traces to an HTTP endpoint.
    Http,
    /// Discard traces.
    None,
}

impl ExporterKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Http => "http",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExporterKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "http" => Ok(Self::Http),
            "none" | "off" => Ok(Self::None),
            _ => Err("expected log, http or none".to_owned()),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Request handling.
    pub orchestrator: OrchestratorConfig,
    /// Tracing pipeline and exporter.
    pub observability: ObservabilityConfig,
    /// Diagnostic logging.
    pub logging: LoggingConfig,
}

/// Request handling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Backend used when none is selected.
    pub default_backend: BackendKind,
    /// Upper bound on one backend call.
    pub request_timeout_ms: u64,
    /// Characters of request text kept in trace metadata.
    pub input_preview_chars: usize,
    /// Characters of response text kept in trace metadata.
    pub output_preview_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let settings = TaskManagerSettings::default();
        Self {
            default_backend: settings.default_backend,
            request_timeout_ms: duration_ms(settings.request_timeout),
            input_preview_chars: settings.input_preview_chars,
            output_preview_chars: settings.output_preview_chars,
        }
    }
}

impl OrchestratorConfig {
    /// Converts to task manager settings.
    #[must_use]
    pub const fn manager_settings(&self) -> TaskManagerSettings {
        TaskManagerSettings {
            default_backend: self.default_backend,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            input_preview_chars: self.input_preview_chars,
            output_preview_chars: self.output_preview_chars,
        }
    }
}

/// Tracing pipeline and exporter settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Closed traces held while waiting for export. At least 1.
    pub queue_capacity: usize,
    /// Retries after a failed export attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff_ms: u64,
    /// Cap on any single retry delay.
    pub max_backoff_ms: u64,
    /// Policy applied when the queue is full.
    pub backpressure: BackpressurePolicy,
    /// How long the `block` policy waits for room.
    pub block_timeout_ms: u64,
    /// Exporter selection.
    pub exporter: ExporterKind,
    /// HTTP exporter endpoint.
    pub endpoint: Option<String>,
    /// HTTP basic-auth user name.
    pub public_key: Option<String>,
    /// HTTP basic-auth password.
    pub secret_key: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let settings = TracerSettings::default();
        Self {
            queue_capacity: settings.queue_capacity,
            max_retries: settings.retry.max_retries,
            initial_backoff_ms: duration_ms(settings.retry.initial_backoff),
            max_backoff_ms: duration_ms(settings.retry.max_backoff),
            backpressure: settings.backpressure,
            block_timeout_ms: duration_ms(settings.block_timeout),
            exporter: ExporterKind::default(),
            endpoint: None,
            public_key: None,
            secret_key: None,
        }
    }
}

impl fmt::Debug for ObservabilityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservabilityConfig")
            .field("queue_capacity", &self.queue_capacity)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .field("backpressure", &self.backpressure)
            .field("block_timeout_ms", &self.block_timeout_ms)
            .field("exporter", &self.exporter)
            .field("endpoint", &self.endpoint)
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ObservabilityConfig {
    /// Converts to tracer settings.
    #[must_use]
    pub fn tracer_settings(&self) -> TracerSettings {
        TracerSettings {
            block_timeout: Duration::from_millis(self.block_timeout_ms),
            ..TracerSettings::default()
        }
        .with_queue_capacity(self.queue_capacity)
        .with_backpressure(self.backpressure)
        .with_retry(RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        })
    }

    /// Builds the configured exporter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEndpoint`] when `http` is selected
    /// without an endpoint, or [`ConfigError::Exporter`] when the HTTP
    /// client cannot be built.
    pub fn build_exporter(&self) -> Result<Arc<dyn TraceExporter>, ConfigError> {
        let exporter: Arc<dyn TraceExporter> = match self.exporter {
            ExporterKind::Log => Arc::new(LogTraceExporter),
            ExporterKind::None => Arc::new(NoopTraceExporter),
            ExporterKind::Http => {
                let endpoint = self.endpoint.as_deref().ok_or(ConfigError::MissingEndpoint)?;
                Arc::new(HttpTraceExporter::new(endpoint, self.credentials())?)
            }
        };
        Ok(exporter)
    }

    fn credentials(&self) -> Option<SinkCredentials> {
        let public_key = self.public_key.clone()?;
        Some(SinkCredentials {
            public_key,
            secret_key: self.secret_key.clone().unwrap_or_default(),
        })
    }
}

/// Diagnostic logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment and the default
    /// file locations.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None, |name| std::env::var(name).ok())
    }

    /// Loads configuration, reading environment variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when an explicitly named file cannot be
    /// read, [`ConfigError::Parse`] for malformed TOML, and
    /// [`ConfigError::InvalidValue`] or [`ConfigError::MissingEndpoint`]
    /// when the merged settings are unusable.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requested = path
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_PATH_VAR).map(PathBuf::from));
        let mut config = requested.map_or_else(Self::from_default_file, |file| {
            Self::from_file(&file)
        })?;
        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    fn from_default_file() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let orchestrator = &mut self.orchestrator;
        if let Some(raw) = lookup("TASKTRACE_DEFAULT_BACKEND") {
            orchestrator.default_backend = BackendKind::try_from(raw.as_str())
                .map_err(|err| invalid("TASKTRACE_DEFAULT_BACKEND", &raw, err))?;
        }
        override_with(
            lookup,
            "TASKTRACE_REQUEST_TIMEOUT_MS",
            &mut orchestrator.request_timeout_ms,
        )?;
        override_with(
            lookup,
            "TASKTRACE_INPUT_PREVIEW_CHARS",
            &mut orchestrator.input_preview_chars,
        )?;
        override_with(
            lookup,
            "TASKTRACE_OUTPUT_PREVIEW_CHARS",
            &mut orchestrator.output_preview_chars,
        )?;

        let observability = &mut self.observability;
        override_with(lookup, "TASKTRACE_QUEUE_CAPACITY", &mut observability.queue_capacity)?;
        override_with(lookup, "TASKTRACE_MAX_RETRIES", &mut observability.max_retries)?;
        override_with(
            lookup,
            "TASKTRACE_INITIAL_BACKOFF_MS",
            &mut observability.initial_backoff_ms,
        )?;
        override_with(lookup, "TASKTRACE_MAX_BACKOFF_MS", &mut observability.max_backoff_ms)?;
        override_with(lookup, "TASKTRACE_BLOCK_TIMEOUT_MS", &mut observability.block_timeout_ms)?;
        override_with(lookup, "TASKTRACE_EXPORTER", &mut observability.exporter)?;
        if let Some(raw) = lookup("TASKTRACE_BACKPRESSURE") {
            observability.backpressure = BackpressurePolicy::try_from(raw.as_str())
                .map_err(|err| invalid("TASKTRACE_BACKPRESSURE", &raw, err))?;
        }
        if let Some(endpoint) = first_of(lookup, &["TASKTRACE_ENDPOINT", "LANGFUSE_HOST"]) {
            observability.endpoint = Some(endpoint);
        }
        if let Some(key) = first_of(lookup, &["TASKTRACE_PUBLIC_KEY", "LANGFUSE_PUBLIC_KEY"]) {
            observability.public_key = Some(key);
        }
        if let Some(key) = first_of(lookup, &["TASKTRACE_SECRET_KEY", "LANGFUSE_SECRET_KEY"]) {
            observability.secret_key = Some(key);
        }

        if let Some(filter) = lookup("TASKTRACE_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.observability.queue_capacity == 0 {
            return Err(invalid("queue_capacity", "0", "must be at least 1"));
        }
        if self.observability.exporter == ExporterKind::Http
            && self
                .observability
                .endpoint
                .as_deref()
                .is_none_or(|endpoint| endpoint.trim().is_empty())
        {
            return Err(ConfigError::MissingEndpoint);
        }
        Ok(())
    }
}

fn override_with<F, T>(lookup: &F, name: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Some(raw) = lookup(name) {
        *target = raw.trim().parse().map_err(|err| invalid(name, &raw, err))?;
    }
    Ok(())
}

fn first_of<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

fn invalid(name: &str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_owned(),
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
