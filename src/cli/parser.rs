//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// counsel-rs: find the law firms behind a legal agreement.
///
/// Runs a three-stage LLM pipeline (relevance, extraction, compilation)
/// over four segments of agreement text.
#[derive(Parser, Debug)]
#[command(name = "counsel-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output and debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Model for every stage (stage-specific environment overrides win).
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature for every stage (0.0-2.0).
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Directory containing prompt template overrides.
    ///
    /// Falls back to `COUNSEL_PROMPT_DIR`, then to
    /// `~/.config/counsel-rs/prompts/` when that directory exists.
    #[arg(long, global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Agreement segments, given inline or read from files.
///
/// Inline segments come first, followed by file segments in order.
/// Exactly four are required in total.
#[derive(Args, Debug, Clone, Default)]
pub struct SegmentArgs {
    /// Segment text (repeat for each segment).
    #[arg(short = 's', long = "segment", value_name = "TEXT")]
    pub segments: Vec<String>,

    /// File containing one segment (repeatable).
    #[arg(long = "segment-file", value_name = "PATH")]
    pub segment_files: Vec<PathBuf>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline over a query and four segments.
    #[command(after_help = r#"Examples:
  counsel-rs process "Is Kirkland & Ellis present in the agreement?" \
      -s "$P1" -s "$P2" -s "$P3" -s "$P4"
  counsel-rs process "Find Latham & Watkins" --segment-file p1.txt \
      --segment-file p2.txt --segment-file p3.txt --segment-file p4.txt
  counsel-rs --format json process "Is Wachtell involved?" -s a -s b -s c -s d
"#)]
    Process {
        /// Natural-language query naming the target.
        query: String,

        /// The four segments.
        #[command(flatten)]
        segments: SegmentArgs,
    },

    /// Run only the relevance stage.
    #[command(after_help = r#"Examples:
  counsel-rs classify "Is Kirkland & Ellis present in the agreement?"
  counsel-rs --format json classify "What is the weather forecast for tomorrow?"
"#)]
    Classify {
        /// Natural-language query.
        query: String,
    },

    /// Run only the extraction stage for a known target.
    Extract {
        /// Target entity to look for.
        target: String,

        /// The four segments.
        #[command(flatten)]
        segments: SegmentArgs,
    },

    /// Run only the compilation stage over saved analyses.
    Compile {
        /// File containing extraction output (repeatable).
        #[arg(long = "analysis-file", value_name = "PATH", required = true)]
        analysis_files: Vec<PathBuf>,
    },

    /// Write the default prompt templates to disk for editing.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory for prompt templates.
        ///
        /// Defaults to `~/.config/counsel-rs/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

impl Commands {
    /// Command name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Process { .. } => "process",
            Self::Classify { .. } => "classify",
            Self::Extract { .. } => "extract",
            Self::Compile { .. } => "compile",
            Self::InitPrompts { .. } => "init-prompts",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_with_mixed_segments() {
        let cli = Cli::try_parse_from([
            "counsel-rs",
            "--format",
            "json",
            "process",
            "Is Acme present?",
            "-s",
            "one",
            "--segment",
            "two",
            "--segment-file",
            "three.txt",
            "--segment-file",
            "four.txt",
        ])
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(cli.format, "json");
        assert_eq!(cli.command.name(), "process");
        let Commands::Process { query, segments } = cli.command else {
            unreachable!()
        };
        assert_eq!(query, "Is Acme present?");
        assert_eq!(segments.segments, vec!["one", "two"]);
        assert_eq!(segments.segment_files.len(), 2);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "counsel-rs",
            "classify",
            "query",
            "--temperature",
            "0",
            "--model",
            "gpt-4o",
            "-v",
        ])
        .unwrap_or_else(|_| unreachable!());
        assert!(cli.verbose);
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.temperature, Some(0.0));
    }

    #[test]
    fn test_compile_requires_analysis_file() {
        assert!(Cli::try_parse_from(["counsel-rs", "compile"]).is_err());
    }
}
