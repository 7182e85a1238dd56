//! Named events carried by the progressive stream and their text framing.
//!
//! Every event is one self-delimited block:
//!
//! ```text
//! event: <fast|slow|done>
//! data: <payload>
//!
//! ```

use axum::response::sse::Event;
use lazyrows_core::{FastRow, SlowRow};
use std::fmt;
use std::str::FromStr;

/// Payload of the terminal `done` event.
pub const DONE_PAYLOAD: &str = "finished";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Fast,
    Slow,
    Done,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Fast => "fast",
            EventKind::Slow => "slow",
            EventKind::Done => "done",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(EventKind::Fast),
            "slow" => Ok(EventKind::Slow),
            "done" => Ok(EventKind::Done),
            other => Err(format!("unknown event kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Fast(Vec<FastRow>),
    Slow(Vec<SlowRow>),
    Done,
}

impl StreamEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Fast(_) => EventKind::Fast,
            StreamEvent::Slow(_) => EventKind::Slow,
            StreamEvent::Done => EventKind::Done,
        }
    }

    /// JSON array for `fast`/`slow`, the literal `finished` for `done`.
    pub fn data(&self) -> Result<String, serde_json::Error> {
        match self {
            StreamEvent::Fast(rows) => serde_json::to_string(rows),
            StreamEvent::Slow(rows) => serde_json::to_string(rows),
            StreamEvent::Done => Ok(DONE_PAYLOAD.to_string()),
        }
    }

    /// Text block exactly as it appears on the wire.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(format!("event: {}\ndata: {}\n\n", self.kind(), self.data()?))
    }
}

impl TryFrom<StreamEvent> for Event {
    type Error = serde_json::Error;

    fn try_from(event: StreamEvent) -> Result<Self, Self::Error> {
        let data = event.data()?;
        Ok(Event::default().event(event.kind().as_str()).data(data))
    }
}

/// One event read back from a captured stream body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub kind: String,
    pub data: String,
}

impl DecodedEvent {
    pub fn kind(&self) -> Option<EventKind> {
        self.kind.parse().ok()
    }
}

/// Splits an event-stream body into its events.
///
/// Blocks without an `event:` field are ignored (comments, keep-alives).
/// Multiple `data:` lines in one block are joined with `\n`.
pub fn decode_events(body: &str) -> Vec<DecodedEvent> {
    body.split("\n\n")
        .filter_map(|block| {
            let mut kind = None;
            let mut data: Vec<&str> = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    kind = Some(value.strip_prefix(' ').unwrap_or(value).to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value));
                }
            }
            kind.map(|kind| DecodedEvent {
                kind,
                data: data.join("\n"),
            })
        })
        .collect()
}
