//! Scripted provider for exercising the pipeline without a network.
//!
//! [`ScriptedProvider`] answers each call with the next queued reply and
//! records every request it receives, so tests can assert on call counts,
//! instructions, and temperatures.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

#[derive(Debug)]
enum Reply {
    Text {
        content: String,
        usage: TokenUsage,
        finish_reason: &'static str,
    },
    Fail(String),
}

/// Provider that replays a fixed queue of responses.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Creates a provider with an empty reply queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply with zero token usage.
    #[must_use]
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.push(Reply::Text {
            content: content.into(),
            usage: TokenUsage::default(),
            finish_reason: "stop",
        })
    }

    /// Queues a successful reply reporting `total_tokens`.
    #[must_use]
    pub fn reply_with_usage(self, content: impl Into<String>, total_tokens: u32) -> Self {
        self.push(Reply::Text {
            content: content.into(),
            usage: TokenUsage {
                prompt_tokens: 0,
                completion_tokens: total_tokens,
                total_tokens,
            },
            finish_reason: "stop",
        })
    }

    /// Queues a reply cut off by the token limit.
    #[must_use]
    pub fn reply_truncated(self, content: impl Into<String>) -> Self {
        self.push(Reply::Text {
            content: content.into(),
            usage: TokenUsage::default(),
            finish_reason: "length",
        })
    }

    /// Queues a backend failure.
    #[must_use]
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Reply::Fail(message.into()))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Returns a copy of every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Reply::Text {
                content,
                usage,
                finish_reason,
            }) => Ok(ChatResponse {
                content,
                usage,
                finish_reason: Some(finish_reason.to_string()),
            }),
            Some(Reply::Fail(message)) => Err(AgentError::ApiRequest {
                message,
                status: Some(500),
            }),
            None => Err(AgentError::ApiRequest {
                message: "scripted provider has no replies left".to_string(),
                status: None,
            }),
        }
    }
}
