//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! The environment is only consulted when [`AgentConfigBuilder::from_env`] is
//! called; the pipeline itself only ever sees the built [`AgentConfig`].

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default model for every stage.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default sampling temperature. Kept low so repeated runs over the same
/// input compile to the same record.
const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Default relevance stage max tokens.
const DEFAULT_RELEVANCE_MAX_TOKENS: u32 = 256;
/// Default extraction stage max tokens.
const DEFAULT_EXTRACTION_MAX_TOKENS: u32 = 4096;
/// Default compilation stage max tokens.
const DEFAULT_COMPILATION_MAX_TOKENS: u32 = 1024;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Highest temperature accepted by OpenAI-compatible APIs.
const MAX_TEMPERATURE: f32 = 2.0;

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the relevance stage.
    pub relevance_model: String,
    /// Model for the extraction stage.
    pub extraction_model: String,
    /// Model for the compilation stage.
    pub compilation_model: String,
    /// Sampling temperature used by every stage.
    pub temperature: f32,
    /// Maximum tokens for relevance responses.
    pub relevance_max_tokens: u32,
    /// Maximum tokens for extraction responses.
    pub extraction_max_tokens: u32,
    /// Maximum tokens for compilation responses.
    pub compilation_max_tokens: u32,
    /// Per-request timeout applied at the backend boundary.
    pub timeout: Duration,
    /// Directory containing prompt template overrides.
    ///
    /// When set, system instructions are loaded from markdown files in
    /// this directory, falling back to compiled-in defaults for any
    /// missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    relevance_model: Option<String>,
    extraction_model: Option<String>,
    compilation_model: Option<String>,
    temperature: Option<f32>,
    relevance_max_tokens: Option<u32>,
    extraction_max_tokens: Option<u32>,
    compilation_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("COUNSEL_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("COUNSEL_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("COUNSEL_BASE_URL"))
                .ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("COUNSEL_MODEL").ok();
        }
        if self.relevance_model.is_none() {
            self.relevance_model = std::env::var("COUNSEL_RELEVANCE_MODEL").ok();
        }
        if self.extraction_model.is_none() {
            self.extraction_model = std::env::var("COUNSEL_EXTRACTION_MODEL").ok();
        }
        if self.compilation_model.is_none() {
            self.compilation_model = std::env::var("COUNSEL_COMPILATION_MODEL").ok();
        }
        if self.temperature.is_none() {
            self.temperature = std::env::var("COUNSEL_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("COUNSEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("COUNSEL_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model for every stage without a stage-specific override.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the relevance stage model.
    #[must_use]
    pub fn relevance_model(mut self, model: impl Into<String>) -> Self {
        self.relevance_model = Some(model.into());
        self
    }

    /// Sets the extraction stage model.
    #[must_use]
    pub fn extraction_model(mut self, model: impl Into<String>) -> Self {
        self.extraction_model = Some(model.into());
        self
    }

    /// Sets the compilation stage model.
    #[must_use]
    pub fn compilation_model(mut self, model: impl Into<String>) -> Self {
        self.compilation_model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the relevance stage max tokens.
    #[must_use]
    pub const fn relevance_max_tokens(mut self, n: u32) -> Self {
        self.relevance_max_tokens = Some(n);
        self
    }

    /// Sets the extraction stage max tokens.
    #[must_use]
    pub const fn extraction_max_tokens(mut self, n: u32) -> Self {
        self.extraction_max_tokens = Some(n);
        self
    }

    /// Sets the compilation stage max tokens.
    #[must_use]
    pub const fn compilation_max_tokens(mut self, n: u32) -> Self {
        self.compilation_max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set, and
    /// [`AgentError::Config`] if the temperature is outside `0.0..=2.0`.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(AgentError::Config {
                message: format!("temperature must be within 0.0..={MAX_TEMPERATURE}, got {temperature}"),
            });
        }

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            relevance_model: self.relevance_model.unwrap_or_else(|| model.clone()),
            extraction_model: self.extraction_model.unwrap_or_else(|| model.clone()),
            compilation_model: self.compilation_model.unwrap_or(model),
            temperature,
            relevance_max_tokens: self
                .relevance_max_tokens
                .unwrap_or(DEFAULT_RELEVANCE_MAX_TOKENS),
            extraction_max_tokens: self
                .extraction_max_tokens
                .unwrap_or(DEFAULT_EXTRACTION_MAX_TOKENS),
            compilation_max_tokens: self
                .compilation_max_tokens
                .unwrap_or(DEFAULT_COMPILATION_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}
