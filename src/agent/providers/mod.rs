//! Concrete [`LlmProvider`] implementations and selection by name.

pub mod openai;

use std::sync::Arc;

pub use openai::OpenAiProvider;

use super::config::AgentConfig;
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Provider names accepted by [`create_provider`].
pub const SUPPORTED_PROVIDERS: &[&str] = &["openai"];

/// Builds the backend named by [`AgentConfig::provider`].
///
/// Matching ignores case and surrounding whitespace.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for names not in
/// [`SUPPORTED_PROVIDERS`].
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    match config.provider.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config))),
        _ => Err(AgentError::UnsupportedProvider {
            name: format!(
                "{} (supported: {})",
                config.provider,
                SUPPORTED_PROVIDERS.join(", ")
            ),
        }),
    }
}
