//! Compilation agent for merging segment analyses.
//!
//! Takes the extraction stage's per-segment analyses and asks for a single
//! JSON record. Validation of that record lives in
//! [`CompiledRecord::parse`](crate::core::CompiledRecord::parse); this agent
//! only returns the raw text.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::build_compilation_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that compiles analyses into the four-key record.
pub struct CompilationAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl CompilationAgent {
    /// Creates a new compilation agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.compilation_model.clone(),
            temperature: config.temperature,
            max_tokens: config.compilation_max_tokens,
            system_prompt,
        }
    }

    /// Executes the agent over one or more analysis texts.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    pub async fn compile(
        &self,
        provider: &dyn LlmProvider,
        analyses: &[&str],
    ) -> Result<(String, AgentResponse), AgentError> {
        let user_msg = build_compilation_prompt(analyses);
        let response = self.execute(provider, &user_msg).await?;
        Ok((response.content.clone(), response))
    }
}

#[async_trait]
impl Agent for CompilationAgent {
    fn name(&self) -> &'static str {
        "compilation"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
