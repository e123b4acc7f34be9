//! Server-Sent Events framing for run streams.
//!
//! Run endpoints answer with `text/event-stream` bodies like:
//!
//! ```text
//! event: thread.run.created
//! data: {"id":"run_123","object":"thread.run","status":"queued",...}
//!
//! event: thread.message.completed
//! data: {"id":"msg_123","object":"thread.message",...}
//!
//! event: done
//! data: [DONE]
//! ```
//!
//! Framing is delegated to `eventsource-stream`; this module only adapts its
//! events into [`SseRecord`]s and its errors into [`Error::Stream`]. Payload
//! decoding lives in [`RunStreamEvent::decode`](crate::RunStreamEvent::decode).

use crate::{Error, Result};
use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;

/// Data payload that terminates a stream segment
pub const DONE_MARKER: &str = "[DONE]";

/// A lazy, finite sequence of SSE records for one stream segment
pub type EventStream = Pin<Box<dyn Stream<Item = Result<SseRecord>> + Send>>;

/// One SSE record: the optional event name and its data payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseRecord {
    pub event: String,
    pub data: String,
}

impl SseRecord {
    /// Record carrying only a data payload
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: String::new(),
            data: data.into(),
        }
    }

    /// Record with an explicit event name
    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// The terminator record
    pub fn done() -> Self {
        Self::named("done", DONE_MARKER)
    }

    /// Returns true when the payload is the `[DONE]` marker.
    pub fn is_done(&self) -> bool {
        self.data == DONE_MARKER
    }

    /// Returns true when the record has no payload to decode.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Frames a streaming HTTP response into SSE records.
pub fn parse_event_stream(response: reqwest::Response) -> EventStream {
    records_from_bytes(response.bytes_stream())
}

/// Frames any byte stream into SSE records.
///
/// Chunk boundaries may fall anywhere, including inside a UTF-8 sequence;
/// the parser buffers until a full event is available.
pub fn records_from_bytes<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let stream = bytes.eventsource().map(|result| match result {
        Ok(event) => Ok(SseRecord {
            event: event.event,
            data: event.data,
        }),
        Err(e) => Err(Error::stream(e.to_string())),
    });

    Box::pin(stream)
}
