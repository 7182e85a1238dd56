use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_ENV: &str = "LAZYROWS_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "lazyrows.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub stream: StreamConfig,
    pub poll: PollConfig,
    pub log_format: LogFormat,
}

/// Settings for the single-connection variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub batch_size: u32,
    pub slow_delay_ms: u64,
}

/// Settings for the two-request variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub batch_size: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    stream: StreamConfig,
    #[serde(default)]
    poll: PollConfig,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct LoggingSection {
    #[serde(default)]
    format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            slow_delay_ms: 3000,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_delay_ms: 2000,
            max_delay_ms: 5000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            stream: StreamConfig::default(),
            poll: PollConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl StreamConfig {
    pub fn slow_delay(&self) -> Duration {
        Duration::from_millis(self.slow_delay_ms)
    }
}

impl PollConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl ServerConfig {
    /// Loads from `LAZYROWS_CONFIG` or `./lazyrows.toml` when present,
    /// otherwise from `LAZYROWS_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| env::var(name).ok())
    }

    /// [`load`](Self::load) with an explicit variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match config_path(&lookup) {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::from_env_with(lookup)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(path, &contents)
    }

    pub fn from_toml_str(path: &str, contents: &str) -> Result<Self, ConfigError> {
        let parsed: FileConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::from_file_config(parsed))
    }

    fn from_file_config(file_config: FileConfig) -> Self {
        Self {
            host: file_config.server.host,
            port: file_config.server.port,
            stream: file_config.stream,
            poll: file_config.poll,
            log_format: file_config.logging.format,
        }
    }

    /// Builds the config from a variable lookup; unset variables keep defaults.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("LAZYROWS_HOST").filter(|value| !value.trim().is_empty()) {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "LAZYROWS_PORT")? {
            config.port = port;
        }
        if let Some(size) = parse_var(&lookup, "LAZYROWS_STREAM_BATCH_SIZE")? {
            config.stream.batch_size = size;
        }
        if let Some(delay) = parse_var(&lookup, "LAZYROWS_STREAM_DELAY_MS")? {
            config.stream.slow_delay_ms = delay;
        }
        if let Some(size) = parse_var(&lookup, "LAZYROWS_POLL_BATCH_SIZE")? {
            config.poll.batch_size = size;
        }
        if let Some(delay) = parse_var(&lookup, "LAZYROWS_POLL_MIN_DELAY_MS")? {
            config.poll.min_delay_ms = delay;
        }
        if let Some(delay) = parse_var(&lookup, "LAZYROWS_POLL_MAX_DELAY_MS")? {
            config.poll.max_delay_ms = delay;
        }
        if let Some(format) = lookup("LAZYROWS_LOG_FORMAT") {
            config.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "LAZYROWS_LOG_FORMAT",
                        value: format,
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.batch_size == 0 {
            return Err(ConfigError::ZeroBatch("stream.batch_size"));
        }
        if self.poll.batch_size == 0 {
            return Err(ConfigError::ZeroBatch("poll.batch_size"));
        }
        if self.poll.min_delay_ms > self.poll.max_delay_ms {
            return Err(ConfigError::InvertedDelayRange {
                min_ms: self.poll.min_delay_ms,
                max_ms: self.poll.max_delay_ms,
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
    }
}

fn config_path<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(CONFIG_ENV).filter(|value| !value.trim().is_empty()) {
        Some(path) => Some(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Some(DEFAULT_CONFIG_FILE.to_string()),
        None => None,
    }
}
