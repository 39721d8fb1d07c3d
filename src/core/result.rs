//! Terminal results of a pipeline run.

use std::time::Duration;

use serde::Serialize;

use super::record::CompiledRecord;
use super::relevance::IRRELEVANT_MESSAGE;

/// Why a run ended in [`PipelineResult::Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCause {
    /// The compilation stage's output was not a valid four-key record.
    CompilationParseFailure,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompilationParseFailure => f.write_str("compilation-parse-failure"),
        }
    }
}

/// Exactly one of these is produced per pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    /// The query did not name a target; no further stages ran.
    Irrelevant {
        /// Always [`IRRELEVANT_MESSAGE`].
        message: String,
    },
    /// All stages ran and the record validated.
    #[serde(rename_all = "camelCase")]
    Success {
        /// Target recovered by the relevance stage.
        target_company: String,
        /// Raw extraction-stage output.
        extraction_text: String,
        /// Validated record.
        record: CompiledRecord,
    },
    /// All stages ran but the compiled output did not validate.
    #[serde(rename_all = "camelCase")]
    Failure {
        /// Target recovered by the relevance stage.
        target_company: String,
        /// Raw extraction-stage output.
        extraction_text: String,
        /// Unparsed compilation-stage output.
        raw_output: String,
        /// Failure classification.
        cause: FailureCause,
    },
}

impl PipelineResult {
    /// The irrelevant-query result with the fixed sentinel message.
    #[must_use]
    pub fn irrelevant() -> Self {
        Self::Irrelevant {
            message: IRRELEVANT_MESSAGE.to_string(),
        }
    }

    /// Returns the compiled record for successful runs.
    #[must_use]
    pub const fn record(&self) -> Option<&CompiledRecord> {
        match self {
            Self::Success { record, .. } => Some(record),
            Self::Irrelevant { .. } | Self::Failure { .. } => None,
        }
    }

    /// Returns the target company, if the relevance stage found one.
    #[must_use]
    pub fn target_company(&self) -> Option<&str> {
        match self {
            Self::Irrelevant { .. } => None,
            Self::Success { target_company, .. } | Self::Failure { target_company, .. } => {
                Some(target_company)
            }
        }
    }

    /// Short status label (`irrelevant`, `success`, `failure`).
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Irrelevant { .. } => "irrelevant",
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
        }
    }
}

/// A [`PipelineResult`] together with run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// The terminal result.
    pub result: PipelineResult,
    /// Backend calls made (1 when short-circuited, otherwise 3).
    pub backend_calls: usize,
    /// Total tokens reported by the backend.
    pub total_tokens: u32,
    /// Whether the extraction text had four complete blocks.
    ///
    /// `None` when the run stopped before extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_complete: Option<bool>,
    /// Wall-clock time for the run.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}
