//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::agent::{AgentConfig, Orchestrator, PromptSet, create_provider};
use crate::cli::output::{
    OutputFormat, format_extraction, format_record, format_run, format_verdict,
};
use crate::cli::parser::{Cli, Commands, SegmentArgs};
use crate::core::{AnalysisReport, CompiledRecord, Segments, TargetName};
use crate::error::{CommandError, Result};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Process { query, segments } => cmd_process(cli, query, segments, format),
        Commands::Classify { query } => cmd_classify(cli, query, format),
        Commands::Extract { target, segments } => cmd_extract(cli, target, segments, format),
        Commands::Compile { analysis_files } => cmd_compile(cli, analysis_files, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

// ==================== Helpers ====================

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        CommandError::Io {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// Collects inline segments followed by file segments and checks the count.
fn read_segments(args: &SegmentArgs) -> Result<Segments> {
    let mut texts = args.segments.clone();
    for path in &args.segment_files {
        texts.push(read_file(path)?);
    }
    Ok(Segments::try_from(texts)?)
}

/// Resolves the prompt directory: flag, then environment, then the
/// default location if it exists.
fn resolve_prompt_dir(cli: &Cli) -> Option<PathBuf> {
    cli.prompt_dir
        .clone()
        .or_else(|| std::env::var_os("COUNSEL_PROMPT_DIR").map(PathBuf::from))
        .or_else(|| PromptSet::default_dir().filter(|dir| dir.is_dir()))
}

/// Builds the orchestrator from environment plus CLI overrides.
fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let mut builder = AgentConfig::builder();
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(temperature) = cli.temperature {
        builder = builder.temperature(temperature);
    }
    if let Some(dir) = resolve_prompt_dir(cli) {
        builder = builder.prompt_dir(dir);
    }

    let config = builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;

    let provider = create_provider(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;

    Ok(Orchestrator::new(provider, config))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

// ==================== Pipeline Commands ====================

fn cmd_process(
    cli: &Cli,
    query: &str,
    segment_args: &SegmentArgs,
    format: OutputFormat,
) -> Result<String> {
    // Segment count is checked before any configuration is needed.
    let segments = read_segments(segment_args)?;
    let orchestrator = build_orchestrator(cli)?;

    let rt = runtime()?;
    let run = rt.block_on(orchestrator.run(query, segments.as_slice()))?;

    Ok(format_run(&run, format, cli.verbose))
}

fn cmd_classify(cli: &Cli, query: &str, format: OutputFormat) -> Result<String> {
    let orchestrator = build_orchestrator(cli)?;

    let rt = runtime()?;
    let (verdict, response) = rt.block_on(orchestrator.classify(query))?;

    Ok(format_verdict(&verdict, &response, format))
}

fn cmd_extract(
    cli: &Cli,
    target: &str,
    segment_args: &SegmentArgs,
    format: OutputFormat,
) -> Result<String> {
    let target = TargetName::new(target)
        .ok_or_else(|| CommandError::InvalidArgument("target cannot be empty".to_string()))?;
    let segments = read_segments(segment_args)?;
    let orchestrator = build_orchestrator(cli)?;

    let rt = runtime()?;
    let (text, _response) = rt.block_on(orchestrator.extract(&target, &segments))?;
    let report = AnalysisReport::parse(&text);

    Ok(format_extraction(target.as_str(), &text, &report, format))
}

fn cmd_compile(cli: &Cli, analysis_files: &[PathBuf], format: OutputFormat) -> Result<String> {
    let analyses = analysis_files
        .iter()
        .map(|path| read_file(path))
        .collect::<Result<Vec<_>>>()?;
    let orchestrator = build_orchestrator(cli)?;

    let refs: Vec<&str> = analyses.iter().map(String::as_str).collect();
    let rt = runtime()?;
    let (raw, _response) = rt.block_on(orchestrator.compile(&refs))?;

    let record = CompiledRecord::parse(&raw).map_err(|e| {
        CommandError::ExecutionFailed(format!("{e}\nRaw output:\n{}", raw.trim_end()))
    })?;

    Ok(format_record(&record, format))
}

// ==================== Prompt Templates ====================

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    let _ = writeln!(
                        output,
                        "  {}",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    );
                }
                output.push_str("\nEdit these files to customize the stage instructions.\n");
                Ok(output)
            }
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}
