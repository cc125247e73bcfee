//! Server-sent-events streaming for chat-completions backends
//!
//! The request runs on a spawned task that forwards parsed chunks through a
//! bounded channel. Dropping the returned stream closes the channel, which
//! the task observes and answers by closing the event source.

use futures::StreamExt;
use reqwest::RequestBuilder;
use reqwest_eventsource::{Event, EventSource, retry::Never};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::infrastructure::model::traits::ChunkStream;
use crate::infrastructure::model::types::{StreamChunk, TokenUsage};

const DONE_SENTINEL: &str = "[DONE]";
const CHANNEL_CAPACITY: usize = 32;
const STOP: &str = "stop";

/// Folds `data:` payloads into [`StreamChunk`]s.
///
/// Reasoning deltas accumulate across events; the most recent usage block is
/// attached to every chunk emitted after it arrives.
#[derive(Debug, Default)]
pub struct SseAccumulator {
    reasoning: String,
    usage: Option<TokenUsage>,
}

impl SseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one event payload. Returns `None` for events that carry nothing
    /// worth forwarding (keep-alives, empty deltas, malformed JSON).
    pub fn push(&mut self, data: &str) -> Option<StreamChunk> {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }
        if data == DONE_SENTINEL {
            return Some(StreamChunk {
                content: String::new(),
                reasoning: self.reasoning_so_far(),
                usage: self.usage,
                finish_reason: Some(STOP.to_string()),
                done: true,
            });
        }

        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "Skipping malformed stream event");
                return None;
            }
        };

        if let Some(usage) = value.get("usage").filter(|u| u.is_object()) {
            self.usage = Some(parse_usage(usage));
        }

        let choice = value.get("choices")?.get(0)?;
        let delta = choice.get("delta");
        let content = delta
            .and_then(|d| d.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let reasoning = delta
            .and_then(|d| d.get("reasoning_content").or_else(|| d.get("reasoning")))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let finish_reason = choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string);

        self.reasoning.push_str(reasoning);

        if content.is_empty() && reasoning.is_empty() && finish_reason.is_none() {
            return None;
        }

        Some(StreamChunk {
            content: content.to_string(),
            reasoning: self.reasoning_so_far(),
            usage: self.usage,
            done: finish_reason.is_some(),
            finish_reason,
        })
    }

    fn reasoning_so_far(&self) -> Option<String> {
        (!self.reasoning.is_empty()).then(|| self.reasoning.clone())
    }
}

fn parse_usage(value: &Value) -> TokenUsage {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_u64)
            .map_or(0, |count| u32::try_from(count).unwrap_or(u32::MAX))
    };
    TokenUsage {
        prompt_tokens: field("prompt_tokens"),
        completion_tokens: field("completion_tokens"),
        total_tokens: field("total_tokens"),
    }
}

/// Open an SSE request and expose its parsed chunks as a [`ChunkStream`].
///
/// The stream always ends with a chunk whose `done` is set, unless the
/// consumer drops it first. Transport and status failures surface as
/// [`StreamChunk::error`]; the request is never re-sent.
pub fn sse_chunks(provider: &'static str, request: RequestBuilder) -> ChunkStream {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut source = match EventSource::new(request) {
            Ok(source) => source,
            Err(err) => {
                warn!(provider, error = %err, "Failed to open completion stream");
                let _ = tx.send(StreamChunk::error()).await;
                return;
            }
        };
        source.set_retry_policy(Box::new(Never));

        let mut accumulator = SseAccumulator::new();
        let mut finished = false;
        loop {
            let event = tokio::select! {
                _ = tx.closed() => {
                    debug!(provider, "Stream consumer dropped, cancelling request");
                    break;
                }
                event = source.next() => event,
            };

            match event {
                None | Some(Err(reqwest_eventsource::Error::StreamEnded)) => break,
                Some(Ok(Event::Open)) => debug!(provider, "Completion stream opened"),
                Some(Ok(Event::Message(message))) => {
                    let Some(chunk) = accumulator.push(&message.data) else {
                        continue;
                    };
                    let done = chunk.done;
                    if tx.send(chunk).await.is_err() {
                        break;
                    }
                    if done {
                        finished = true;
                        break;
                    }
                }
                Some(Err(err)) => {
                    warn!(provider, error = %err, "Completion stream failed");
                    let _ = tx.send(StreamChunk::error()).await;
                    finished = true;
                    break;
                }
            }
        }

        if !finished && !tx.is_closed() {
            let _ = tx
                .send(StreamChunk {
                    finish_reason: Some(STOP.to_string()),
                    done: true,
                    ..StreamChunk::default()
                })
                .await;
        }
        source.close();
    });

    Box::pin(ReceiverStream::new(rx))
}
