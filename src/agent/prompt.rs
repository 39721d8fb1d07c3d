//! System prompts for the three pipeline stages.
//!
//! The compiled-in instructions are the output contracts each stage relies
//! on and are sent verbatim. A [`PromptSet`] can replace any of them from
//! an explicitly configured template directory.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::core::{Segments, TargetName};

/// System prompt for the relevance stage.
///
/// Constrains the answer to the irrelevant sentinel or a target declaration.
pub const RELEVANCE_SYSTEM_PROMPT: &str = r#"You are tasked with identifying whether a user query mentions any target company that needs to be searched for in legal documents.

Your task:
1. Analyze the user query to determine if it mentions a specific company name that should be treated as a "target company"
2. A target company is typically a specific business entity, law firm, or organization that the user wants to find in legal documents

Response format - FOLLOW EXACTLY:
- If NO target company is found: You MUST respond with EXACTLY this format: <user_message>Query is not relevant to the intended task.</user_message>
- If a target company IS found: You MUST respond with EXACTLY this format: The target company is [COMPANY NAME].

CRITICAL: 
- For irrelevant queries (weather, cooking, general questions, etc.), you MUST use the XML format with <user_message> tags
- For target company queries, do NOT use XML tags, just the plain text format
- Be precise and follow the format exactly
- Look for specific company names, law firms, or business entities in the query"#;

/// System prompt for the extraction stage.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are tasked with analyzing four separate paragraphs from a legal document independently to extract information about law firms and target company presence.

For each of the four paragraphs provided, extract the following information:

1. Buyer's representative law firm (the law firm representing the buyer/purchaser)
2. Seller's representative law firm (the law firm representing the seller)  
3. Any third-party law firm present (law firms representing other parties or serving advisory roles)
4. Whether the target company is mentioned in the paragraph

Instructions:
- Analyze each paragraph independently 
- Look for law firm names (typically ending in LLP, LLC, PC, or similar)
- Identify which party each law firm represents based on context
- A law firm name alone without clear representation context should be considered third-party
- Be precise in identifying the actual law firm names

Output format for each paragraph (follow exactly):
Paragraph 1 Analysis:
Buyer: [Company Name or "Not identified"]
Buyer Representative: [Law Firm Name or "Not stated"]
Seller: [Company Name or "Not identified"] 
Seller Representative: [Law Firm Name or "Not stated"]
Third-Party Representation: [Description and Law Firm Name or "None"]
Target Company Mentioned: [Yes/No]

Paragraph 2 Analysis:
Buyer: [Company Name or "Not identified"]
Buyer Representative: [Law Firm Name or "Not stated"]
Seller: [Company Name or "Not identified"] 
Seller Representative: [Law Firm Name or "Not stated"]
Third-Party Representation: [Description and Law Firm Name or "None"]
Target Company Mentioned: [Yes/No]

Paragraph 3 Analysis:
Buyer: [Company Name or "Not identified"]
Buyer Representative: [Law Firm Name or "Not stated"]
Seller: [Company Name or "Not identified"] 
Seller Representative: [Law Firm Name or "Not stated"]
Third-Party Representation: [Description and Law Firm Name or "None"]
Target Company Mentioned: [Yes/No]

Paragraph 4 Analysis:
Buyer: [Company Name or "Not identified"]
Buyer Representative: [Law Firm Name or "Not stated"]
Seller: [Company Name or "Not identified"] 
Seller Representative: [Law Firm Name or "Not stated"]
Third-Party Representation: [Description and Law Firm Name or "None"]
Target Company Mentioned: [Yes/No]"#;

/// System prompt for the compilation stage.
pub const COMPILATION_SYSTEM_PROMPT: &str = r#"You are tasked with compiling law firm information from multiple paragraph analyses into a single JSON object.

You will receive the analysis results from multiple paragraphs. Your task is to:

1. Identify the most consistent/accurate buyer's representative law firm across all paragraphs
2. Identify the most consistent/accurate seller's representative law firm across all paragraphs  
3. Identify any third-party law firms mentioned
4. Determine if the target company was mentioned in any paragraph

Default values:
- If a law firm is not found or unclear: "unknown"
- If target company presence is unclear: false

Output ONLY a valid JSON object with exactly these keys:
{
  "buyer_firm": "string",
  "seller_firm": "string", 
  "third_party": "string",
  "contains_target_firm": boolean
}

Important:
- Output ONLY the JSON object, no additional text
- Ensure valid JSON formatting (no trailing commas, proper quotes)
- Use "unknown" for missing law firm information
- Use actual law firm names when clearly identified
- For third_party, include the most relevant third-party law firm name"#;

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/counsel-rs/prompts";

/// Filename for the relevance prompt template.
const RELEVANCE_FILENAME: &str = "relevance.md";
/// Filename for the extraction prompt template.
const EXTRACTION_FILENAME: &str = "extraction.md";
/// Filename for the compilation prompt template.
const COMPILATION_FILENAME: &str = "compilation.md";

/// A set of system prompts for all stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// System prompt for the relevance stage.
    pub relevance: String,
    /// System prompt for the extraction stage.
    pub extraction: String,
    /// System prompt for the compilation stage.
    pub compilation: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Each file is loaded independently: a missing or unreadable file uses
    /// its default. With no directory, this is [`PromptSet::defaults`].
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let load_file = |filename: &str, default: &str| -> String {
            prompt_dir
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            relevance: load_file(RELEVANCE_FILENAME, RELEVANCE_SYSTEM_PROMPT),
            extraction: load_file(EXTRACTION_FILENAME, EXTRACTION_SYSTEM_PROMPT),
            compilation: load_file(COMPILATION_FILENAME, COMPILATION_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            relevance: RELEVANCE_SYSTEM_PROMPT.to_string(),
            extraction: EXTRACTION_SYSTEM_PROMPT.to_string(),
            compilation: COMPILATION_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (RELEVANCE_FILENAME, RELEVANCE_SYSTEM_PROMPT),
            (EXTRACTION_FILENAME, EXTRACTION_SYSTEM_PROMPT),
            (COMPILATION_FILENAME, COMPILATION_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Builds the extraction-stage user message: the target followed by each
/// segment under its own `Paragraph N:` heading.
#[must_use]
pub fn build_extraction_prompt(target: &TargetName, segments: &Segments) -> String {
    let mut prompt = format!("Target company to look for: {target}\n\n");
    for (number, segment) in segments.numbered() {
        let _ = write!(prompt, "Paragraph {number}:\n{segment}\n\n");
    }
    prompt
}

/// Builds the compilation-stage user message from one or more analyses.
#[must_use]
pub fn build_compilation_prompt(analyses: &[&str]) -> String {
    format!(
        "Paragraph analyses to compile:\n\n{}",
        analyses.join("\n\n---\n\n")
    )
}
