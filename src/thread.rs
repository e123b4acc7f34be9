//! Thread handle: messages in, runs out.

use crate::assistant::Assistant;
use crate::run::{RunLoop, RunOptions};
use crate::types::{ContentPayload, Message, MessageRole};
use crate::{Error, Result};

/// A remote thread bound to the assistant that created it
#[derive(Debug, Clone)]
pub struct Thread {
    id: String,
    assistant: Assistant,
}

impl Thread {
    pub(crate) fn new(id: String, assistant: Assistant) -> Self {
        Self { id, assistant }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    /// Adds a user message made of one or more content parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `content` is empty, or the transport
    /// error if the request fails.
    pub async fn add_message<I>(&self, content: I) -> Result<Message>
    where
        I: IntoIterator,
        I::Item: Into<ContentPayload>,
    {
        let parts: Vec<_> = content
            .into_iter()
            .map(|payload| {
                let payload: ContentPayload = payload.into();
                payload.to_content_part()
            })
            .collect();

        if parts.is_empty() {
            return Err(Error::invalid_input("a message needs at least one content part"));
        }

        self.assistant
            .transport()
            .create_message(&self.id, MessageRole::User, parts)
            .await
    }

    /// Runs the assistant on this thread until no further action is required.
    ///
    /// Returns every message object seen during the run, in first-seen order,
    /// each at its latest version.
    pub async fn run(&self, parallel_tool_calls: Option<bool>) -> Result<Vec<Message>> {
        self.run_with(RunOptions::new().parallel_tool_calls(parallel_tool_calls))
            .await
    }

    /// Like [`Thread::run`], with timeouts and an interrupt handle.
    pub async fn run_with(&self, options: RunOptions) -> Result<Vec<Message>> {
        RunLoop::new(&self.assistant, &self.id, options)
            .execute()
            .await
    }
}
