//! Wire types for threads, messages, runs and stream events

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Thread object returned by `POST /threads`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadObject {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// Message role in the thread
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Level of detail requested for image inputs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    #[default]
    Auto,
}

/// Reference to an uploaded image file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageFile {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

/// Reference to an image by URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

/// Text part of a message as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

/// Content part of a message returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: ImageFile },
    ImageUrl { image_url: ImageUrl },
    /// Content kinds this crate does not model yet
    #[serde(other)]
    Unknown,
}

/// A message in a thread, identified by its remote id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Message {
    /// Concatenates the text parts of this message, one per line.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content accepted by [`Thread::add_message`](crate::Thread::add_message)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    Text(String),
    ImageFile {
        file_id: String,
        detail: Option<ImageDetail>,
    },
    ImageUrl {
        url: String,
        detail: Option<ImageDetail>,
    },
}

impl ContentPayload {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPayload::Text(text.into())
    }

    pub fn image_file(file_id: impl Into<String>) -> Self {
        ContentPayload::ImageFile {
            file_id: file_id.into(),
            detail: None,
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPayload::ImageUrl {
            url: url.into(),
            detail: None,
        }
    }

    /// Sets the detail level; has no effect on text payloads.
    pub fn with_detail(self, level: ImageDetail) -> Self {
        match self {
            ContentPayload::ImageFile { file_id, .. } => ContentPayload::ImageFile {
                file_id,
                detail: Some(level),
            },
            ContentPayload::ImageUrl { url, .. } => ContentPayload::ImageUrl {
                url,
                detail: Some(level),
            },
            text => text,
        }
    }

    /// Maps this payload to its wire content part.
    pub fn to_content_part(&self) -> MessageContentPart {
        match self {
            ContentPayload::Text(text) => MessageContentPart::Text { text: text.clone() },
            ContentPayload::ImageFile { file_id, detail } => MessageContentPart::ImageFile {
                image_file: ImageFile {
                    file_id: file_id.clone(),
                    detail: *detail,
                },
            },
            ContentPayload::ImageUrl { url, detail } => MessageContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: url.clone(),
                    detail: *detail,
                },
            },
        }
    }
}

impl From<&str> for ContentPayload {
    fn from(text: &str) -> Self {
        ContentPayload::Text(text.to_string())
    }
}

impl From<String> for ContentPayload {
    fn from(text: String) -> Self {
        ContentPayload::Text(text)
    }
}

/// Content part in a create-message request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContentPart {
    Text { text: String },
    ImageFile { image_file: ImageFile },
    ImageUrl { image_url: ImageUrl },
}

/// Body of `POST /threads/{thread_id}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: Vec<MessageContentPart>,
}

/// Body of `POST /threads/{thread_id}/runs`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateRunRequest {
    pub assistant_id: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
}

/// One tool result submitted back to a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

impl ToolOutput {
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }
}

/// Body of `POST /threads/{thread_id}/runs/{run_id}/submit_tool_outputs`
#[derive(Debug, Clone, Serialize)]
pub struct SubmitToolOutputsRequest {
    pub tool_outputs: Vec<ToolOutput>,
    pub stream: bool,
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// The run has reached a terminal status.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled
                | RunStatus::Failed
                | RunStatus::Completed
                | RunStatus::Incomplete
                | RunStatus::Expired
        )
    }

    /// The run is waiting for tool outputs.
    pub fn is_blocked(&self) -> bool {
        matches!(self, RunStatus::RequiresAction)
    }
}

/// Function name and JSON argument text of a tool call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// A tool call requested by a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn default_call_type() -> String {
    "function".to_string()
}

/// Tool calls awaiting outputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// Action a run needs from the client before it can continue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequiredAction {
    #[serde(rename = "type", default)]
    pub action_type: String,
    #[serde(default)]
    pub submit_tool_outputs: SubmitToolOutputs,
}

impl RequiredAction {
    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.submit_tool_outputs.tool_calls
    }
}

/// Run object as delivered in `thread.run.*` events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunObject {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<Value>,
}

/// Event payload delivered on a run stream
///
/// Variants are selected by the payload's `object` field. Kinds this crate does
/// not react to keep their raw JSON; anything unrecognised lands in `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStreamEvent {
    Message(Message),
    Run(RunObject),
    RunStep(Value),
    MessageDelta(Value),
    RunStepDelta(Value),
    Other(Value),
}

impl RunStreamEvent {
    /// Decodes one SSE data payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the payload is not JSON, or when it names a
    /// message or run object whose shape does not match.
    pub fn decode(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| Error::decode(format!("invalid event payload: {}", e)))?;

        let kind = value
            .get("object")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let event = match kind.as_str() {
            "thread.message" => RunStreamEvent::Message(
                serde_json::from_value(value)
                    .map_err(|e| Error::decode(format!("invalid message object: {}", e)))?,
            ),
            "thread.run" => RunStreamEvent::Run(
                serde_json::from_value(value)
                    .map_err(|e| Error::decode(format!("invalid run object: {}", e)))?,
            ),
            "thread.run.step" => RunStreamEvent::RunStep(value),
            "thread.message.delta" => RunStreamEvent::MessageDelta(value),
            "thread.run.step.delta" => RunStreamEvent::RunStepDelta(value),
            _ => RunStreamEvent::Other(value),
        };

        Ok(event)
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RunStreamEvent::Message(_) => "message",
            RunStreamEvent::Run(_) => "run",
            RunStreamEvent::RunStep(_) => "run_step",
            RunStreamEvent::MessageDelta(_) => "message_delta",
            RunStreamEvent::RunStepDelta(_) => "run_step_delta",
            RunStreamEvent::Other(_) => "other",
        }
    }
}
