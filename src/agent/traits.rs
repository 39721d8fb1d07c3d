//! Agent trait definition.
//!
//! Each pipeline stage (relevance, extraction, compilation) is an agent
//! with a fixed system instruction. [`Agent::execute`] is the single
//! completion call a stage makes.

use async_trait::async_trait;

use super::message::{ChatResponse, TokenUsage, completion_request};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

impl From<ChatResponse> for AgentResponse {
    fn from(response: ChatResponse) -> Self {
        Self {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        }
    }
}

/// Trait implemented by all pipeline stage agents.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System instruction that defines the stage's output contract.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        1024
    }

    /// Sends the system instruction and `user_msg` to the provider.
    ///
    /// # Errors
    ///
    /// Propagates [`AgentError`] from the provider unchanged.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = completion_request(
            self.model(),
            self.system_prompt(),
            user_msg,
            self.temperature(),
            self.max_tokens(),
            self.json_mode(),
        );

        let response = provider.chat(&request).await?;

        Ok(response.into())
    }
}
