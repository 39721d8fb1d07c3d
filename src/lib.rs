//! # counsel-rs
//!
//! Identifies the law firms representing the buyer, the seller, and any
//! third party in four segments of a legal agreement, and whether a named
//! target firm appears among them.
//!
//! A run is three sequential LLM calls:
//!
//! 1. **Relevance**: does the query name a target? If not, stop with a
//!    fixed sentinel message.
//! 2. **Extraction**: one six-field analysis block per segment.
//! 3. **Compilation**: merge the blocks into a four-key JSON record,
//!    validated before it is returned.
//!
//! ```no_run
//! use std::sync::Arc;
//! use counsel_rs::agent::{AgentConfig, Orchestrator, create_provider};
//!
//! # async fn demo() -> counsel_rs::Result<()> {
//! let config = AgentConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let orchestrator = Orchestrator::new(provider, config);
//! let segments = ["...", "...", "...", "..."];
//! let result = orchestrator
//!     .process("Is Kirkland & Ellis present in the agreement?", &segments)
//!     .await?;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::core::{CompiledRecord, PipelineResult, PipelineRun, RelevanceVerdict, Segments};
pub use error::{AgentError, CommandError, Error, Result};
