//! Remote operations the run loop depends on.
//!
//! [`Transport`] is the whole surface the assistant, threads and run loop use.
//! [`HttpTransport`] implements it against the assistants REST endpoints. Any
//! other implementation (a proxy, a recorded session, a test double) can be
//! handed to [`Assistant::new`](crate::Assistant::new) instead.
//!
//! Failures are surfaced as-is; nothing here retries.

use crate::config::{ASSISTANTS_BETA, ClientOptions};
use crate::sse::{EventStream, parse_event_stream};
use crate::types::{
    CreateMessageRequest, CreateRunRequest, Message, MessageContentPart, MessageRole,
    SubmitToolOutputsRequest, ThreadObject, ToolOutput,
};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Narrow client interface for threads and runs
///
/// Implementations must tolerate concurrent calls: one transport is shared by
/// every thread of an assistant and by concurrent runs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Creates an empty thread.
    async fn create_thread(&self) -> Result<ThreadObject>;

    /// Appends a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: Vec<MessageContentPart>,
    ) -> Result<Message>;

    /// Starts a run and returns its event stream.
    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        parallel_tool_calls: Option<bool>,
    ) -> Result<EventStream>;

    /// Submits tool outputs for a run and returns the continuation stream.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<EventStream>;
}

/// [`Transport`] over HTTP using a shared `reqwest::Client`
#[derive(Clone)]
pub struct HttpTransport {
    options: ClientOptions,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("options", &self.options)
            .finish()
    }
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(options.connect_timeout))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            options,
            http_client,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let mut request = self
            .http_client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", self.options.api_key))
            .header("Content-Type", "application/json")
            .header("OpenAI-Beta", ASSISTANTS_BETA)
            .json(body);

        if let Some(organization) = &self.options.organization {
            request = request.header("OpenAI-Organization", organization);
        }

        let response = request.send().await.map_err(Error::Http)?;
        check_status(response).await
    }
}

/// Turns non-success responses into [`Error::Api`] carrying status and body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_else(|e| {
        log::warn!("Failed to read error response body: {}", e);
        "Unknown error (failed to read response body)".to_string()
    });
    Err(Error::api(format!("API error {}: {}", status, body)))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn create_thread(&self) -> Result<ThreadObject> {
        let response = self.post("/threads", &serde_json::json!({})).await?;
        Ok(response.json().await?)
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: Vec<MessageContentPart>,
    ) -> Result<Message> {
        let body = CreateMessageRequest { role, content };
        let response = self
            .post(&format!("/threads/{}/messages", thread_id), &body)
            .await?;
        Ok(response.json().await?)
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        parallel_tool_calls: Option<bool>,
    ) -> Result<EventStream> {
        let body = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
            stream: true,
            parallel_tool_calls,
        };
        let response = self
            .post(&format!("/threads/{}/runs", thread_id), &body)
            .await?;
        Ok(parse_event_stream(response))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<EventStream> {
        let body = SubmitToolOutputsRequest {
            tool_outputs: outputs,
            stream: true,
        };
        let response = self
            .post(
                &format!("/threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
                &body,
            )
            .await?;
        Ok(parse_event_stream(response))
    }
}
