//! Segment extraction agent.
//!
//! Analyses the four segments in one combined request, returning a
//! six-field analysis block per segment as free text.

use async_trait::async_trait;
use tracing::warn;

use super::config::AgentConfig;
use super::prompt::build_extraction_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::core::{Segments, TargetName};
use crate::error::AgentError;

/// Agent that extracts party and law-firm information per segment.
pub struct ExtractionAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl ExtractionAgent {
    /// Creates a new extraction agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.extraction_model.clone(),
            temperature: config.temperature,
            max_tokens: config.extraction_max_tokens,
            system_prompt,
        }
    }

    /// Executes the agent over the four segments.
    ///
    /// Returns the raw analysis text. A response cut off by the token limit
    /// is still returned, with a warning logged.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    pub async fn extract(
        &self,
        provider: &dyn LlmProvider,
        target: &TargetName,
        segments: &Segments,
    ) -> Result<(String, AgentResponse), AgentError> {
        let user_msg = build_extraction_prompt(target, segments);
        let response = self.execute(provider, &user_msg).await?;

        if response.finish_reason.as_deref() == Some("length") {
            warn!(
                max_tokens = self.max_tokens,
                "extraction response truncated; consider raising the extraction max tokens"
            );
        }

        Ok((response.content.clone(), response))
    }
}

#[async_trait]
impl Agent for ExtractionAgent {
    fn name(&self) -> &'static str {
        "extraction"
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
