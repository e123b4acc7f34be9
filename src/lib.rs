//! # Assistant Runs
//!
//! Client-side orchestration of assistant runs over streaming HTTP.
//!
//! ## Overview
//!
//! A remote assistant works on threads. Running it on a thread produces a stream
//! of server-sent events; mid-stream, the run may stop and ask the client to
//! execute tools. This crate drives that loop:
//!
//! 1. create the run in streaming mode
//! 2. collect message objects as they arrive (latest version wins, first-seen order)
//! 3. when the run requires action, dispatch each tool call to a locally
//!    registered handler and submit the outputs
//! 4. keep consuming the continuation stream until nothing more is required
//!
//! ## Example
//!
//! ```rust,no_run
//! use assistant_runs::{Assistant, ClientOptions, ContentPayload};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Query {
//!     city: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Weather {
//!     #[serde(rename = "tempC")]
//!     temp_c: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ClientOptions::from_env().build()?;
//!     let assistant = Assistant::connect("asst_123", options)?;
//!
//!     // Handlers are typed; argument decoding and output encoding are handled for you
//!     assistant.set_tool("getWeather", |query: Query| async move {
//!         let temp_c = if query.city == "Zurich" { 21.5 } else { 15.0 };
//!         Ok::<_, std::io::Error>(Weather { temp_c })
//!     });
//!
//!     let thread = assistant.create_thread().await?;
//!     thread
//!         .add_message([ContentPayload::text("What's the weather in Zurich?")])
//!         .await?;
//!
//!     for message in thread.run(None).await? {
//!         println!("{}", message.text());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! - Transport failures, malformed stream payloads, stream timeouts and
//!   interrupts fail the run; no partial message list is returned.
//! - Tool failures (unknown tool, bad arguments, handler error) are sent to the
//!   model as tool output text and the run continues.
//!
//! ## Architecture
//!
//! - **assistant**: assistant identity, shared transport and tool registry
//! - **thread**: adding messages and starting runs
//! - **run**: the run state machine and the message working set
//! - **tools**: typed handler registration behind type-erased adapters
//! - **transport**: the remote interface and its HTTP implementation
//! - **sse**: framing of streaming bodies into records
//! - **types**: wire types and the stream event union
//! - **config**: HTTP client options
//! - **error**: error type and `Result` alias

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

/// Assistant handle owning the tool registry and the shared transport.
mod assistant;

/// Client options for the HTTP transport, with environment variable support.
mod config;

/// Error types and conversions used across all public APIs.
mod error;

/// Run state machine: streaming, tool dispatch, resubmission.
mod run;

/// Server-Sent Events framing of streaming response bodies.
mod sse;

/// Thread handle with message creation and run entry points.
mod thread;

/// Tool registry with typed registration and type-erased invocation.
mod tools;

/// Transport trait and its HTTP implementation.
mod transport;

/// Wire types for threads, messages, runs and stream events.
mod types;

// ============================================================================
// PUBLIC EXPORTS
// ============================================================================

// --- Assistants and threads ---

pub use assistant::Assistant;
pub use thread::Thread;

// --- Runs ---

pub use run::{MessageSet, RunOptions};

// --- Tools ---

pub use tools::{BoxError, CallArgument, ToolAdapter, ToolFuture, ToolRegistry};

// --- Transport ---

pub use sse::{DONE_MARKER, EventStream, SseRecord, parse_event_stream, records_from_bytes};
pub use transport::{HttpTransport, Transport};

// --- Configuration ---

pub use config::{
    ASSISTANTS_BETA, ClientOptions, ClientOptionsBuilder, DEFAULT_BASE_URL, get_api_key,
    get_base_url,
};

// --- Error Handling ---

pub use error::{Error, Result};

// --- Wire Types ---

pub use types::{
    ContentPayload, CreateMessageRequest, CreateRunRequest, FunctionCall, ImageDetail, ImageFile,
    ImageUrl, Message, MessageContent, MessageContentPart, MessageRole, RequiredAction, RunObject,
    RunStatus, RunStreamEvent, SubmitToolOutputs, SubmitToolOutputsRequest, TextContent,
    ThreadObject, ToolCall, ToolOutput,
};

// ============================================================================
// CONVENIENCE PRELUDE
// ============================================================================

/// The most commonly used types.
///
/// Import with `use assistant_runs::prelude::*;`.
pub mod prelude {
    pub use crate::{
        Assistant, CallArgument, ClientOptions, ContentPayload, Error, Message, Result,
        RunOptions, Thread,
    };
}
