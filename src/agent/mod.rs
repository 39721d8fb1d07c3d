//! LLM pipeline for law-firm extraction from agreement text.
//!
//! Uses a pluggable provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! (query, 4 segments) → Orchestrator
//!   ├── RelevanceAgent   → sentinel (stop) | target name
//!   ├── ExtractionAgent  → one six-field analysis block per segment
//!   └── CompilationAgent → JSON record → CompiledRecord::parse
//!                          ├── Success
//!                          └── Failure (compilation-parse-failure)
//! ```

pub mod compiler;
pub mod config;
pub mod extractor;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod relevance;
pub mod traits;

// Re-export key types
pub use compiler::CompilationAgent;
pub use config::{AgentConfig, AgentConfigBuilder};
pub use extractor::ExtractionAgent;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{MAX_QUERY_LEN, Orchestrator, PipelineStage};
pub use prompt::PromptSet;
pub use providers::{OpenAiProvider, create_provider};
pub use provider::LlmProvider;
pub use relevance::RelevanceAgent;
pub use traits::{Agent, AgentResponse};
