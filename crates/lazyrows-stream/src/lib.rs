//! Single-connection progressive delivery.
//!
//! `GET /stream` sends the fast columns, waits for the slow computation,
//! sends the slow columns and finishes with a `done` event, all over one
//! server-sent event stream.

pub mod api;
pub mod event;
pub mod producer;
pub mod static_assets;

pub use api::{StreamState, router};
pub use event::{DecodedEvent, EventKind, StreamEvent, decode_events};
pub use producer::{
    LogLifecycle, StreamLifecycle, StreamOutcome, StreamReport, StreamSettings, produce,
    produce_with,
};
