//! Orchestrator for the three-stage extraction pipeline.
//!
//! Runs relevance → extraction → compilation strictly in sequence, with a
//! short-circuit when the relevance stage answers with the sentinel.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::compiler::CompilationAgent;
use super::config::AgentConfig;
use super::extractor::ExtractionAgent;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::relevance::RelevanceAgent;
use super::traits::AgentResponse;
use crate::core::{
    AnalysisReport, CompiledRecord, FailureCause, PipelineResult, PipelineRun, RelevanceVerdict,
    Segments, TargetName,
};
use crate::error::AgentError;

/// Maximum accepted query length in bytes.
pub const MAX_QUERY_LEN: usize = 10_000;

/// Position of a run within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Waiting on the relevance stage.
    AwaitingRelevance,
    /// Waiting on the extraction stage.
    AwaitingExtraction,
    /// Waiting on the compilation stage.
    AwaitingCompilation,
    /// Terminal.
    Done,
}

impl PipelineStage {
    /// Stage name used in log events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AwaitingRelevance => "relevance",
            Self::AwaitingExtraction => "extraction",
            Self::AwaitingCompilation => "compilation",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend call and token counters for one run.
#[derive(Debug, Default)]
struct RunStats {
    calls: usize,
    tokens: u32,
}

impl RunStats {
    fn record(&mut self, stage: PipelineStage, model: &str, response: &AgentResponse) {
        self.calls += 1;
        self.tokens = self.tokens.saturating_add(response.usage.total_tokens);
        debug!(
            stage = %stage,
            model,
            tokens = response.usage.total_tokens,
            "stage complete"
        );
    }
}

/// Orchestrates the extraction pipeline.
///
/// Holds only immutable state, so one instance can serve concurrent runs.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider and configuration.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in defaults.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            config,
            prompts,
        }
    }

    /// Returns the configuration this orchestrator was built with.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the loaded system instructions.
    #[must_use]
    pub const fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Runs the pipeline and returns only the terminal result.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::run`].
    pub async fn process<S>(&self, query: &str, segments: &[S]) -> Result<PipelineResult, AgentError>
    where
        S: AsRef<str> + Sync,
    {
        self.run(query, segments).await.map(|run| run.result)
    }

    /// Runs the pipeline and returns the terminal result with statistics.
    ///
    /// # Steps
    ///
    /// 1. Check the segment count and the query, before any backend call
    /// 2. Classify the query; stop with the sentinel result if irrelevant
    /// 3. Extract one analysis block per segment
    /// 4. Compile the analyses into a record and validate it
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InputCardinality`] unless exactly four segments
    /// are given, [`AgentError::InvalidQuery`] for an empty or oversized
    /// query, [`AgentError::FormatViolation`] when the relevance answer has
    /// neither accepted shape, and [`AgentError::ApiRequest`] when any
    /// backend call fails. A record that fails validation is not an error;
    /// it yields [`PipelineResult::Failure`].
    pub async fn run<S>(&self, query: &str, segments: &[S]) -> Result<PipelineRun, AgentError>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let segments = Segments::from_slice(segments)?;
        let mut stats = RunStats::default();

        let (verdict, response) = self.classify(query).await?;
        stats.record(
            PipelineStage::AwaitingRelevance,
            &self.config.relevance_model,
            &response,
        );

        let target = match verdict {
            RelevanceVerdict::Irrelevant => {
                debug!(stage = %PipelineStage::Done, "query not relevant, skipping extraction");
                return Ok(PipelineRun {
                    result: PipelineResult::irrelevant(),
                    backend_calls: stats.calls,
                    total_tokens: stats.tokens,
                    extraction_complete: None,
                    elapsed: start.elapsed(),
                });
            }
            RelevanceVerdict::Target(target) => target,
        };
        debug!(stage = %PipelineStage::AwaitingExtraction, target = %target, "target identified");

        let (extraction_text, response) = self.extract(&target, &segments).await?;
        stats.record(
            PipelineStage::AwaitingExtraction,
            &self.config.extraction_model,
            &response,
        );

        let report = AnalysisReport::parse(&extraction_text);
        let extraction_complete = report.is_complete();
        if !extraction_complete {
            warn!(
                problems = ?report.problems(),
                "extraction output is incomplete, compiling anyway"
            );
        }

        debug!(stage = %PipelineStage::AwaitingCompilation, "compiling analyses");
        let (raw_output, response) = self.compile(&[&extraction_text]).await?;
        stats.record(
            PipelineStage::AwaitingCompilation,
            &self.config.compilation_model,
            &response,
        );

        let result = match CompiledRecord::parse(&raw_output) {
            Ok(record) => {
                if !target_flag_agrees(&report, &record) {
                    warn!(
                        contains_target_firm = record.contains_target_firm,
                        affirmed = report.target_affirmed(),
                        "compiled target flag disagrees with the per-segment analyses"
                    );
                }
                PipelineResult::Success {
                    target_company: target.into_inner(),
                    extraction_text,
                    record,
                }
            }
            Err(e) => {
                warn!(error = %e, "compiled output failed validation");
                PipelineResult::Failure {
                    target_company: target.into_inner(),
                    extraction_text,
                    raw_output,
                    cause: FailureCause::CompilationParseFailure,
                }
            }
        };
        debug!(stage = %PipelineStage::Done, status = result.status(), "pipeline finished");

        Ok(PipelineRun {
            result,
            backend_calls: stats.calls,
            total_tokens: stats.tokens,
            extraction_complete: Some(extraction_complete),
            elapsed: start.elapsed(),
        })
    }

    /// Runs the relevance stage alone.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidQuery`] before any backend call for an
    /// empty or oversized query; otherwise as [`RelevanceAgent::classify`].
    pub async fn classify(
        &self,
        query: &str,
    ) -> Result<(RelevanceVerdict, AgentResponse), AgentError> {
        validate_query(query)?;
        let agent = RelevanceAgent::new(&self.config, self.prompts.relevance.clone());
        agent.classify(self.provider.as_ref(), query).await
    }

    /// Runs the extraction stage alone.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    pub async fn extract(
        &self,
        target: &TargetName,
        segments: &Segments,
    ) -> Result<(String, AgentResponse), AgentError> {
        let agent = ExtractionAgent::new(&self.config, self.prompts.extraction.clone());
        agent.extract(self.provider.as_ref(), target, segments).await
    }

    /// Runs the compilation stage alone, returning the unvalidated output.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    pub async fn compile(&self, analyses: &[&str]) -> Result<(String, AgentResponse), AgentError> {
        let agent = CompilationAgent::new(&self.config, self.prompts.compilation.clone());
        agent.compile(self.provider.as_ref(), analyses).await
    }
}

fn validate_query(query: &str) -> Result<(), AgentError> {
    if query.trim().is_empty() {
        return Err(AgentError::InvalidQuery {
            message: "query cannot be empty".to_string(),
        });
    }
    if query.len() > MAX_QUERY_LEN {
        return Err(AgentError::InvalidQuery {
            message: format!(
                "query exceeds maximum length ({} bytes, max {MAX_QUERY_LEN})",
                query.len()
            ),
        });
    }
    Ok(())
}

/// The record's target flag should be set exactly when some analysis block
/// affirms the target. Only checked when the extraction parsed into blocks.
fn target_flag_agrees(report: &AnalysisReport, record: &CompiledRecord) -> bool {
    report.segments.is_empty() || report.target_affirmed() == record.contains_target_firm
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("relevance_model", &self.config.relevance_model)
            .field("extraction_model", &self.config.extraction_model)
            .field("compilation_model", &self.config.compilation_model)
            .field("temperature", &self.config.temperature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IRRELEVANT_MESSAGE;
    use crate::testing::ScriptedProvider;
    use test_case::test_case;

    const SEGMENTS: [&str; 4] = ["one", "two", "three", "four"];

    fn orchestrator(provider: &Arc<ScriptedProvider>) -> Orchestrator {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        Orchestrator::new(provider.clone(), config)
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_calls() {
        let provider = Arc::new(ScriptedProvider::new());
        let result = orchestrator(&provider).process("   ", &SEGMENTS).await;
        assert!(matches!(result, Err(AgentError::InvalidQuery { .. })));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_query_rejected_without_calls() {
        let provider = Arc::new(ScriptedProvider::new());
        let query = "x".repeat(MAX_QUERY_LEN + 1);
        let result = orchestrator(&provider).process(&query, &SEGMENTS).await;
        assert!(matches!(result, Err(AgentError::InvalidQuery { .. })));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cardinality_checked_before_query() {
        let provider = Arc::new(ScriptedProvider::new());
        let result = orchestrator(&provider).process("", &SEGMENTS[..3]).await;
        assert!(matches!(
            result,
            Err(AgentError::InputCardinality {
                expected: 4,
                actual: 3
            })
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_irrelevant_short_circuits() {
        let provider = Arc::new(ScriptedProvider::new().reply_with_usage(IRRELEVANT_MESSAGE, 42));
        let run = orchestrator(&provider)
            .run("What is the weather forecast for tomorrow?", &SEGMENTS)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(run.result, PipelineResult::irrelevant());
        assert_eq!(run.backend_calls, 1);
        assert_eq!(run.total_tokens, 42);
        assert_eq!(run.extraction_complete, None);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_extraction_still_compiles() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply("The target company is Acme.")
                .reply("nothing structured here")
                .reply(
                    r#"{"buyer_firm":"unknown","seller_firm":"unknown","third_party":"unknown","contains_target_firm":false}"#,
                ),
        );
        let run = orchestrator(&provider)
            .run("Is Acme mentioned?", &SEGMENTS)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(run.backend_calls, 3);
        assert_eq!(run.extraction_complete, Some(false));
        assert_eq!(run.result.status(), "success");
    }

    #[test_case("Yes", true, true ; "affirmed and flagged")]
    #[test_case("No", false, true ; "neither")]
    #[test_case("Yes", false, false ; "affirmed but not flagged")]
    #[test_case("No", true, false ; "flagged without affirmation")]
    fn test_target_flag_agreement(mentioned: &str, flagged: bool, agrees: bool) {
        let report = AnalysisReport::parse(&format!(
            "Paragraph 1 Analysis:\nTarget Company Mentioned: {mentioned}\n"
        ));
        let record = CompiledRecord {
            contains_target_firm: flagged,
            ..CompiledRecord::default()
        };
        assert_eq!(target_flag_agrees(&report, &record), agrees);
    }

    #[test]
    fn test_target_flag_ignored_without_blocks() {
        let report = AnalysisReport::parse("nothing structured here");
        let record = CompiledRecord {
            contains_target_firm: true,
            ..CompiledRecord::default()
        };
        assert!(target_flag_agrees(&report, &record));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::AwaitingRelevance.to_string(), "relevance");
        assert_eq!(PipelineStage::AwaitingExtraction.to_string(), "extraction");
        assert_eq!(PipelineStage::AwaitingCompilation.to_string(), "compilation");
        assert_eq!(PipelineStage::Done.to_string(), "done");
    }

    #[test]
    fn test_debug_hides_credentials() {
        let provider = Arc::new(ScriptedProvider::new());
        let debug = format!("{:?}", orchestrator(&provider));
        assert!(debug.contains("Orchestrator"));
        assert!(debug.contains("scripted"));
        assert!(!debug.contains("test\""));
    }
}
