//! Relevance (gate) agent.
//!
//! Decides whether a query names a target entity worth searching for.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::core::RelevanceVerdict;
use crate::error::AgentError;

/// Agent that classifies a query as irrelevant or naming a target.
///
/// The query is sent verbatim as the user message.
pub struct RelevanceAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl RelevanceAgent {
    /// Creates a new relevance agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.relevance_model.clone(),
            temperature: config.temperature,
            max_tokens: config.relevance_max_tokens,
            system_prompt,
        }
    }

    /// Executes the agent and interprets its answer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::FormatViolation`] if the response is neither the
    /// sentinel nor a target declaration; propagates backend errors.
    pub async fn classify(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
    ) -> Result<(RelevanceVerdict, AgentResponse), AgentError> {
        let response = self.execute(provider, query).await?;
        let verdict = RelevanceVerdict::from_response(&response.content)?;
        Ok((verdict, response))
    }
}

#[async_trait]
impl Agent for RelevanceAgent {
    fn name(&self) -> &'static str {
        "relevance"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
