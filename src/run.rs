//! Run execution loop.
//!
//! A run is driven as a sequence of stream segments:
//!
//! ```text
//! Starting ──create_run──▶ Streaming ──required action──▶ AwaitingToolDispatch
//!                             ▲                                   │
//!                             │                                   ▼
//!                             └──────submit_tool_outputs──── Resubmitting
//!
//! Streaming ──segment ends, no new stream──▶ Completed
//! ```
//!
//! Within a segment records are consumed in arrival order until the stream ends
//! or a `[DONE]` record arrives. Message objects are upserted into a
//! [`MessageSet`]; run objects carrying a required action trigger tool dispatch
//! and resubmission, and the stream returned by the resubmission becomes the
//! next segment. Every other event kind is observed and dropped.
//!
//! Tool failures never end the run: unknown tools, undecodable arguments and
//! handler errors all become output text for the model. Transport failures,
//! undecodable stream payloads, stalls past [`RunOptions::stream_timeout`] and
//! interrupts end the run with an error and no partial result.

use crate::assistant::Assistant;
use crate::sse::{EventStream, SseRecord};
use crate::types::{Message, RunObject, RunStreamEvent, ToolCall, ToolOutput};
use crate::{Error, Result};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Per-run settings
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    parallel_tool_calls: Option<bool>,
    stream_timeout: Option<Duration>,
    tool_timeout: Option<Duration>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwarded verbatim to the create-run request.
    pub fn parallel_tool_calls(mut self, parallel: impl Into<Option<bool>>) -> Self {
        self.parallel_tool_calls = parallel.into();
        self
    }

    /// Deadline for each stream record; elapsing fails the run with [`Error::Timeout`].
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    /// Deadline for each tool handler; elapsing answers the call with an error text.
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Uses `flag` as the interrupt signal for the run.
    pub fn interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Returns the interrupt flag, creating one if none was set.
    ///
    /// Setting it to `true` stops the run before the next record is consumed.
    /// A batch of tool calls that has started dispatching is always submitted
    /// first, so no call is left marked dispatched without a submission attempt.
    ///
    /// ```rust
    /// use assistant_runs::RunOptions;
    /// use std::sync::atomic::Ordering;
    ///
    /// let mut options = RunOptions::new();
    /// let handle = options.interrupt_handle();
    /// handle.store(true, Ordering::SeqCst);
    /// ```
    pub fn interrupt_handle(&mut self) -> Arc<AtomicBool> {
        Arc::clone(
            self.interrupt
                .get_or_insert_with(|| Arc::new(AtomicBool::new(false))),
        )
    }

    pub fn get_parallel_tool_calls(&self) -> Option<bool> {
        self.parallel_tool_calls
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// State of the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    Starting,
    Streaming,
    AwaitingToolDispatch,
    Resubmitting,
    Completed,
}

/// Working set of messages seen during a run.
///
/// Keyed by message id. A newer version of a known id replaces the stored one
/// in place; new ids are appended. Iteration follows first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MessageSet {
    messages: Vec<Message>,
    index: HashMap<String, usize>,
}

impl MessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a message. Returns true if the id was new.
    pub fn upsert(&mut self, message: Message) -> bool {
        match self.index.get(&message.id) {
            Some(&position) => {
                self.messages[position] = message;
                false
            }
            None => {
                self.index.insert(message.id.clone(), self.messages.len());
                self.messages.push(message);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&position| &self.messages[position])
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn into_vec(self) -> Vec<Message> {
        self.messages
    }
}

/// Drives one run to completion. Owned by a single task.
pub(crate) struct RunLoop<'a> {
    assistant: &'a Assistant,
    thread_id: &'a str,
    options: RunOptions,
    state: RunState,
    messages: MessageSet,
    dispatched: HashSet<String>,
}

impl<'a> RunLoop<'a> {
    pub(crate) fn new(assistant: &'a Assistant, thread_id: &'a str, options: RunOptions) -> Self {
        Self {
            assistant,
            thread_id,
            options,
            state: RunState::Starting,
            messages: MessageSet::new(),
            dispatched: HashSet::new(),
        }
    }

    pub(crate) async fn execute(mut self) -> Result<Vec<Message>> {
        log::debug!(
            "Starting run on thread {} with assistant {}",
            self.thread_id,
            self.assistant.id()
        );

        let mut current = Some(
            self.assistant
                .transport()
                .create_run(
                    self.thread_id,
                    self.assistant.id(),
                    self.options.parallel_tool_calls,
                )
                .await?,
        );

        let mut segment = 0usize;
        while let Some(stream) = current.take() {
            segment += 1;
            log::debug!("Consuming stream segment {} on thread {}", segment, self.thread_id);
            self.transition(RunState::Streaming);
            current = self.consume(stream).await?;
        }

        self.transition(RunState::Completed);
        log::debug!(
            "Run on thread {} completed after {} segment(s) with {} message(s)",
            self.thread_id,
            segment,
            self.messages.len()
        );
        Ok(self.messages.into_vec())
    }

    /// Consumes one segment. Returns the continuation stream if a tool-output
    /// submission happened during it.
    async fn consume(&mut self, mut stream: EventStream) -> Result<Option<EventStream>> {
        let mut next = None;

        while let Some(record) = self.next_record(&mut stream).await? {
            if record.is_done() {
                break;
            }
            if record.is_empty() {
                continue;
            }

            match RunStreamEvent::decode(&record.data)? {
                RunStreamEvent::Message(message) => {
                    self.messages.upsert(message);
                }
                RunStreamEvent::Run(run) => {
                    if let Some(continuation) = self.handle_run(run).await? {
                        next = Some(continuation);
                        self.transition(RunState::Streaming);
                    }
                }
                other => {
                    log::trace!("Ignoring {} event", other.kind());
                }
            }
        }

        Ok(next)
    }

    async fn next_record(&self, stream: &mut EventStream) -> Result<Option<SseRecord>> {
        if self.options.is_interrupted() {
            log::debug!("Run on thread {} interrupted", self.thread_id);
            return Err(Error::Interrupted);
        }

        let item = match self.options.stream_timeout {
            Some(deadline) => tokio::time::timeout(deadline, stream.next())
                .await
                .map_err(|_| Error::timeout())?,
            None => stream.next().await,
        };

        item.transpose()
    }

    async fn handle_run(&mut self, run: RunObject) -> Result<Option<EventStream>> {
        let Some(action) = run.required_action else {
            return Ok(None);
        };

        self.transition(RunState::AwaitingToolDispatch);
        let calls = action.tool_calls();
        log::debug!(
            "Run {} requires {} tool call(s)",
            run.id,
            calls.len()
        );

        let outputs = self.dispatch(calls).await;

        // Every required action is answered, even when no call produced an output.
        if outputs.is_empty() {
            log::debug!("Submitting an empty output batch for run {}", run.id);
        }

        self.transition(RunState::Resubmitting);
        let stream = self
            .assistant
            .transport()
            .submit_tool_outputs(self.thread_id, &run.id, outputs)
            .await?;
        Ok(Some(stream))
    }

    async fn dispatch(&mut self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());

        for call in calls {
            if !self.dispatched.insert(call.id.clone()) {
                log::debug!("Skipping already dispatched tool call {}", call.id);
                continue;
            }

            let output = match self.invoke(call).await {
                Ok(text) => text.unwrap_or_default(),
                Err(e) => {
                    log::warn!(
                        "Tool call {} ({}) failed: {}",
                        call.id,
                        call.function.name,
                        e
                    );
                    e.to_string()
                }
            };

            outputs.push(ToolOutput::new(call.id.clone(), output));
        }

        outputs
    }

    async fn invoke(&self, call: &ToolCall) -> Result<Option<String>> {
        let name = call.function.name.as_str();
        let invocation = self.assistant.tools().invoke(name, &call.function.arguments);

        match self.options.tool_timeout {
            Some(deadline) => tokio::time::timeout(deadline, invocation)
                .await
                .map_err(|_| Error::tool(format!("'{}' timed out after {:?}", name, deadline)))?,
            None => invocation.await,
        }
    }

    fn transition(&mut self, state: RunState) {
        if self.state != state {
            log::trace!("Run state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageContent, MessageRole, TextContent};

    fn message(id: &str, text: &str) -> Message {
        Message {
            id: id.to_string(),
            thread_id: Some("thread_1".to_string()),
            role: MessageRole::Assistant,
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: text.to_string(),
                    annotations: Vec::new(),
                },
            }],
            run_id: None,
            assistant_id: None,
            status: None,
        }
    }

    #[test]
    fn test_message_set_overwrites_in_place() {
        let mut set = MessageSet::new();
        assert!(set.upsert(message("m1", "first draft")));
        assert!(set.upsert(message("m2", "second")));
        assert!(!set.upsert(message("m1", "final")));

        let ids: Vec<&str> = set.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(set.get("m1").unwrap().text(), "final");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_message_set_into_vec_keeps_first_seen_order() {
        let mut set = MessageSet::new();
        for id in ["c", "a", "b", "a", "c"] {
            set.upsert(message(id, id));
        }

        let ids: Vec<String> = set.into_vec().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_run_options() {
        let mut options = RunOptions::new()
            .parallel_tool_calls(true)
            .stream_timeout(Duration::from_secs(30))
            .tool_timeout(Duration::from_secs(5));

        assert_eq!(options.get_parallel_tool_calls(), Some(true));
        assert!(!options.is_interrupted());

        let handle = options.interrupt_handle();
        handle.store(true, Ordering::SeqCst);
        assert!(options.is_interrupted());

        // The same flag is returned on later calls
        let again = options.interrupt_handle();
        assert!(Arc::ptr_eq(&handle, &again));
    }

    #[test]
    fn test_parallel_tool_calls_accepts_option() {
        let options = RunOptions::new().parallel_tool_calls(None);
        assert_eq!(options.get_parallel_tool_calls(), None);
    }
}
