//! Output formatting for CLI commands.
//!
//! Text output is meant for people; JSON and NDJSON carry the same data
//! for scripts.

use std::fmt::Write as _;

use serde::Serialize;

use crate::agent::AgentResponse;
use crate::core::{AnalysisReport, CompiledRecord, PipelineResult, PipelineRun, RelevanceVerdict};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// One compact JSON object per line.
    Ndjson,
}

impl OutputFormat {
    /// Parses a format name, falling back to text for unknown names.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Serializes `value` in this format's JSON flavour.
    #[must_use]
    pub fn to_json<T: Serialize>(self, value: &T) -> String {
        let rendered = match self {
            Self::Ndjson => serde_json::to_string(value),
            Self::Text | Self::Json => serde_json::to_string_pretty(value),
        };
        let mut out = rendered.unwrap_or_default();
        out.push('\n');
        out
    }
}

/// Formats a full pipeline run.
#[must_use]
pub fn format_run(run: &PipelineRun, format: OutputFormat, verbose: bool) -> String {
    if format != OutputFormat::Text {
        return format.to_json(run);
    }

    let mut out = String::new();
    match &run.result {
        PipelineResult::Irrelevant { message } => {
            let _ = writeln!(out, "{message}");
        }
        PipelineResult::Success {
            target_company,
            extraction_text,
            record,
        } => {
            let _ = writeln!(out, "Target: {target_company}");
            out.push_str(&format_record_text(record));
            if verbose {
                let _ = write!(out, "\nExtraction:\n{}\n", extraction_text.trim_end());
            }
        }
        PipelineResult::Failure {
            target_company,
            extraction_text,
            raw_output,
            cause,
        } => {
            let _ = writeln!(out, "Target: {target_company}");
            let _ = writeln!(out, "Compiled output failed validation ({cause})");
            let _ = writeln!(out, "Raw output:\n{}", raw_output.trim_end());
            if verbose {
                let _ = write!(out, "\nExtraction:\n{}\n", extraction_text.trim_end());
            }
        }
    }

    let complete_hint = match run.extraction_complete {
        Some(false) => " (extraction incomplete)",
        Some(true) | None => "",
    };
    let _ = writeln!(
        out,
        "\n---\nStatus: {}{complete_hint} | Calls: {} | Tokens: {} | Time: {:.1}s",
        run.result.status(),
        run.backend_calls,
        run.total_tokens,
        run.elapsed.as_secs_f64()
    );
    out
}

/// Formats the relevance stage verdict.
#[must_use]
pub fn format_verdict(
    verdict: &RelevanceVerdict,
    response: &AgentResponse,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => match verdict {
            RelevanceVerdict::Irrelevant => format!("{}\n", response.content.trim()),
            RelevanceVerdict::Target(target) => format!("Target: {target}\n"),
        },
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = match verdict {
                RelevanceVerdict::Irrelevant => serde_json::json!({
                    "status": "irrelevant",
                    "response": response.content,
                    "totalTokens": response.usage.total_tokens,
                }),
                RelevanceVerdict::Target(target) => serde_json::json!({
                    "status": "relevant",
                    "targetCompany": target,
                    "response": response.content,
                    "totalTokens": response.usage.total_tokens,
                }),
            };
            format.to_json(&json)
        }
    }
}

/// Formats extraction output together with its structural check.
#[must_use]
pub fn format_extraction(
    target: &str,
    text: &str,
    report: &AnalysisReport,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = format!("{}\n", text.trim_end());
            let problems = report.problems();
            if !problems.is_empty() {
                out.push_str("\nWarnings:\n");
                for problem in &problems {
                    let _ = writeln!(out, "  {problem}");
                }
            }
            out
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "targetCompany": target,
                "extractionText": text,
                "complete": report.is_complete(),
                "problems": report.problems(),
                "segments": report.segments,
            });
            format.to_json(&json)
        }
    }
}

/// Formats a validated record.
#[must_use]
pub fn format_record(record: &CompiledRecord, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_record_text(record),
        OutputFormat::Json | OutputFormat::Ndjson => format.to_json(record),
    }
}

fn format_record_text(record: &CompiledRecord) -> String {
    format!(
        "Buyer firm:           {}\nSeller firm:          {}\nThird party:          {}\nContains target firm: {}\n",
        record.buyer_firm,
        record.seller_firm,
        record.third_party,
        if record.contains_target_firm { "yes" } else { "no" }
    )
}
