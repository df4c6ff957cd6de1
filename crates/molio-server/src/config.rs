//! Configuration loading from file and environment variables.

use axum::http::HeaderValue;
use molio_types::{DEFAULT_ARCHIVE_CONTENT_TYPE, DEFAULT_ARCHIVE_FILENAME};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Inputs used to build the document.
    #[serde(default)]
    pub document: DocumentConfig,

    /// How the archive is presented to the client.
    #[serde(default)]
    pub response: ResponseConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "molio_db=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Document inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Schema script to load instead of the bundled template.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// File stored as the document's sample attachment.
    #[serde(default = "default_attachment_path")]
    pub attachment_path: PathBuf,
}

/// Response presentation.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseConfig {
    /// `Content-Type` of the archive.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Filename offered in `Content-Disposition`.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Advertise `Content-Encoding: gzip` so clients inflate the body
    /// themselves and save a plain database file.
    #[serde(default)]
    pub gzip_content_encoding: bool,

    /// Gzip level, 0 to 9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_attachment_path() -> PathBuf {
    PathBuf::from("assets/sample.pdf")
}

fn default_content_type() -> String {
    DEFAULT_ARCHIVE_CONTENT_TYPE.to_string()
}

fn default_filename() -> String {
    DEFAULT_ARCHIVE_FILENAME.to_string()
}

fn default_compression_level() -> u32 {
    9
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            attachment_path: default_attachment_path(),
        }
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            content_type: default_content_type(),
            filename: default_filename(),
            gzip_content_encoding: false,
            compression_level: default_compression_level(),
        }
    }
}

impl ResponseConfig {
    /// `Content-Disposition` value for the configured filename.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Checks that the values can be emitted as HTTP headers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compression_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "response.compression_level must be 0..=9, got {}",
                self.compression_level
            )));
        }
        if HeaderValue::from_str(&self.content_type).is_err() {
            return Err(ConfigError::Invalid(format!(
                "response.content_type is not a valid header value: {:?}",
                self.content_type
            )));
        }
        if self.filename.is_empty()
            || self.filename.contains('"')
            || HeaderValue::from_str(&self.content_disposition()).is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "response.filename is not usable in Content-Disposition: {:?}",
                self.filename
            )));
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Config file used when neither an explicit path nor `MOLIO_CONFIG_PATH` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Where the selected config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    CliArg,
    /// Taken from `MOLIO_CONFIG_PATH`.
    EnvVar,
    /// Fell back to [`DEFAULT_CONFIG_PATH`].
    Default,
}

impl ConfigSource {
    /// Short label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CliArg => "cli-arg",
            Self::EnvVar => "env-var",
            Self::Default => "default",
        }
    }
}

/// Picks the config file path: `explicit` first, then the value of
/// `MOLIO_CONFIG_PATH` passed as `env_value`, then [`DEFAULT_CONFIG_PATH`].
/// Blank values are skipped.
pub fn resolve_config_path(
    explicit: Option<String>,
    env_value: Option<String>,
) -> (String, ConfigSource) {
    let non_blank = |value: &String| !value.trim().is_empty();

    if let Some(path) = explicit.filter(non_blank) {
        (path, ConfigSource::CliArg)
    } else if let Some(path) = env_value.filter(non_blank) {
        (path, ConfigSource::EnvVar)
    } else {
        (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
    }
}

/// Parses configuration from TOML text and validates it.
///
/// # Errors
///
/// Returns `ConfigError::Parse` or `ConfigError::Invalid`.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(contents)?;
    config.response.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `MOLIO_HOST` overrides `server.host`
/// - `MOLIO_PORT` overrides `server.port`
/// - `MOLIO_LOG_LEVEL` overrides `logging.level`
/// - `MOLIO_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `MOLIO_SCHEMA_PATH` overrides `document.schema_path`
/// - `MOLIO_ATTACHMENT_PATH` overrides `document.attachment_path`
/// - `MOLIO_CONTENT_TYPE` overrides `response.content_type`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the final values fail validation.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Ok(host) = std::env::var("MOLIO_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("MOLIO_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(level) = std::env::var("MOLIO_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("MOLIO_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(schema_path) = std::env::var("MOLIO_SCHEMA_PATH") {
        config.document.schema_path = Some(PathBuf::from(schema_path));
    }
    if let Ok(attachment_path) = std::env::var("MOLIO_ATTACHMENT_PATH") {
        config.document.attachment_path = PathBuf::from(attachment_path);
    }
    if let Ok(content_type) = std::env::var("MOLIO_CONTENT_TYPE") {
        config.response.content_type = content_type;
    }

    config.response.validate()?;
    Ok(config)
}
