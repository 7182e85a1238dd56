//! Shared building blocks for the progressive table demos.
//!
//! Both server variants render the same table: rows whose fast columns are
//! known immediately and whose slow column arrives later. This crate holds
//! the row model, the batch builders, configuration loading and tracing
//! setup used by `lazyrows-stream` and `lazyrows-poll`.

pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod shutdown;
pub mod telemetry;

pub use config::{LogFormat, PollConfig, ServerConfig, StreamConfig};
pub use error::ConfigError;
pub use models::{FastRow, Price, Row, RowId, SlowRow, SlowValueResponse};
