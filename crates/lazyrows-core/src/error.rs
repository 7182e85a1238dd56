//! Configuration error types.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroBatch(&'static str),

    #[error("poll delay range is inverted: min {min_ms}ms > max {max_ms}ms")]
    InvertedDelayRange { min_ms: u64, max_ms: u64 },
}
