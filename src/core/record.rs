//! The compiled four-field record and its validation.

use serde::{Deserialize, Serialize};

use super::analysis::is_not_stated_marker;
use crate::error::AgentError;

/// Value used for any firm that could not be identified.
pub const UNKNOWN_FIRM: &str = "unknown";

/// Final structured output of the pipeline.
///
/// Exactly four keys; unknown keys are rejected when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompiledRecord {
    /// Law firm representing the buyer.
    pub buyer_firm: String,
    /// Law firm representing the seller.
    pub seller_firm: String,
    /// Most relevant third-party law firm.
    pub third_party: String,
    /// Whether the target entity appears in any segment.
    pub contains_target_firm: bool,
}

impl Default for CompiledRecord {
    fn default() -> Self {
        Self {
            buyer_firm: UNKNOWN_FIRM.to_string(),
            seller_firm: UNKNOWN_FIRM.to_string(),
            third_party: UNKNOWN_FIRM.to_string(),
            contains_target_firm: false,
        }
    }
}

impl CompiledRecord {
    /// Parses and normalizes the compilation stage's output.
    ///
    /// Accepts the JSON object bare or inside a markdown code fence. All
    /// four keys must be present with the right types; `null` is rejected.
    /// Firm fields that are empty or hold a "not identified" style marker
    /// become [`UNKNOWN_FIRM`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ResponseParse`] when the content is not a JSON
    /// object of exactly that shape.
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        let json_str = strip_code_fence(content);

        serde_json::from_str::<Self>(json_str)
            .map(Self::normalized)
            .map_err(|e| AgentError::ResponseParse {
                message: format!("compiled record is not a valid four-key object: {e}"),
                content: content.to_string(),
            })
    }

    fn normalized(self) -> Self {
        Self {
            buyer_firm: normalize_firm(self.buyer_firm),
            seller_firm: normalize_firm(self.seller_firm),
            third_party: normalize_firm(self.third_party),
            contains_target_firm: self.contains_target_firm,
        }
    }
}

fn normalize_firm(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_not_stated_marker(trimmed) {
        UNKNOWN_FIRM.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Strips an enclosing markdown code fence, if present.
///
/// The fence's info string (`json`, `JSON`, `jsonc`, ...) runs to the end
/// of the opening line and is dropped with it.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = if rest.trim_start().starts_with('{') {
        rest
    } else {
        rest.split_once('\n').map_or(rest, |(_, body)| body)
    };
    body.trim_end().trim_end_matches("```").trim()
}
