//! Relevance verdict for a user query.
//!
//! The relevance stage answers in one of two fixed textual shapes. This
//! module is the only place that inspects those shapes; everything
//! downstream works with [`RelevanceVerdict`].

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Opening tag of the irrelevant-query sentinel.
pub const SENTINEL_TAG: &str = "<user_message>";

/// Message returned for queries that do not name a target entity.
pub const IRRELEVANT_MESSAGE: &str =
    "<user_message>Query is not relevant to the intended task.</user_message>";

/// Fixed prefix of a target declaration.
pub const TARGET_PREFIX: &str = "The target company is ";

/// Words that may end with a period inside a company name.
const NAME_ABBREVIATIONS: &[&str] = &[
    "inc", "co", "corp", "ltd", "llc", "llp", "plc", "bros", "jr", "sr", "st", "no", "mr", "mrs",
    "dr", "cos",
];

/// Name of the entity a query asks to search for.
///
/// Always non-empty; construct with [`TargetName::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetName(String);

impl TargetName {
    /// Creates a target name, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing remains after trimming.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TargetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of the relevance stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelevanceVerdict {
    /// The query does not name a target entity.
    Irrelevant,
    /// The query names the given target entity.
    Target(TargetName),
}

impl RelevanceVerdict {
    /// Interprets a raw relevance-stage response.
    ///
    /// A response opening with [`SENTINEL_TAG`] is irrelevant. A response of
    /// the form `The target company is <NAME>.` yields `<NAME>` with any
    /// trailing periods removed. The declaration is a single sentence on a
    /// single line.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::FormatViolation`] when the response matches
    /// neither shape, declares an empty name, spans several lines, or
    /// carries further sentences after the name.
    pub fn from_response(content: &str) -> Result<Self, AgentError> {
        let trimmed = content.trim();

        if trimmed.starts_with(SENTINEL_TAG) {
            return Ok(Self::Irrelevant);
        }

        trimmed
            .strip_prefix(TARGET_PREFIX)
            .filter(|rest| !rest.contains(['\n', '\r']))
            .map(|rest| rest.trim_end_matches(|c: char| c == '.' || c.is_whitespace()))
            .filter(|name| !continues_past_name(name))
            .and_then(TargetName::new)
            .map(Self::Target)
            .ok_or_else(|| AgentError::FormatViolation {
                content: content.to_string(),
            })
    }

    /// Returns the target name, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&TargetName> {
        match self {
            Self::Irrelevant => None,
            Self::Target(name) => Some(name),
        }
    }

    /// Returns `true` for [`RelevanceVerdict::Irrelevant`].
    #[must_use]
    pub const fn is_irrelevant(&self) -> bool {
        matches!(self, Self::Irrelevant)
    }
}

/// Returns `true` if a sentence ends inside `name` and more text follows.
///
/// A period followed by a space ends a sentence unless the word before it
/// is an initial, a dotted abbreviation (`J.P.`), or a common company
/// abbreviation (`Inc.`).
fn continues_past_name(name: &str) -> bool {
    name.match_indices([' ', '\t']).any(|(idx, _)| {
        let before = &name[..idx];
        if before.ends_with(['!', '?', ';']) {
            return true;
        }
        let Some(word) = before.strip_suffix('.') else {
            return false;
        };
        let word = word.rsplit(char::is_whitespace).next().unwrap_or(word);
        let is_abbreviation = word.chars().count() <= 1
            || word.contains('.')
            || NAME_ABBREVIATIONS
                .iter()
                .any(|abbr| word.trim_end_matches(',').eq_ignore_ascii_case(abbr));
        !is_abbreviation
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_sentinel_is_irrelevant() {
        let verdict = RelevanceVerdict::from_response(IRRELEVANT_MESSAGE);
        assert!(matches!(verdict, Ok(RelevanceVerdict::Irrelevant)));
    }

    #[test]
    fn test_sentinel_prefix_match() {
        let verdict = RelevanceVerdict::from_response(
            "  <user_message>This query is about the weather.</user_message>\n",
        );
        assert!(matches!(verdict, Ok(RelevanceVerdict::Irrelevant)));
    }

    #[test_case("The target company is Kirkland & Ellis.", "Kirkland & Ellis" ; "law firm")]
    #[test_case("The target company is Microsoft.\n", "Microsoft" ; "trailing newline")]
    #[test_case("The target company is Apple Inc.", "Apple Inc" ; "abbreviation period")]
    #[test_case("The target company is Cravath, Swaine & Moore", "Cravath, Swaine & Moore" ; "no period")]
    #[test_case("The target company is J.P. Morgan Securities LLC.", "J.P. Morgan Securities LLC" ; "dotted initials")]
    #[test_case("The target company is Apple Inc. Holdings.", "Apple Inc. Holdings" ; "inner abbreviation")]
    fn test_target_declaration(response: &str, expected: &str) {
        let verdict = RelevanceVerdict::from_response(response)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(verdict.target().map(TargetName::as_str), Some(expected));
    }

    #[test_case("Kirkland & Ellis" ; "bare name")]
    #[test_case("" ; "empty")]
    #[test_case("The target company is ." ; "empty name")]
    #[test_case("the target company is Microsoft." ; "wrong case")]
    #[test_case("Target: Microsoft" ; "other shape")]
    #[test_case("The target company is Kirkland & Ellis.\nNote: the query also mentions the weather." ; "multi line")]
    #[test_case("The target company is Kirkland & Ellis.\r\nThanks" ; "crlf continuation")]
    #[test_case("The target company is Kirkland & Ellis. It is named in the query." ; "trailing commentary")]
    #[test_case("The target company is Microsoft! Let me know if you need more." ; "exclamation")]
    fn test_format_violation(response: &str) {
        let result = RelevanceVerdict::from_response(response);
        assert!(matches!(result, Err(AgentError::FormatViolation { .. })));
    }

    #[test]
    fn test_target_name_rejects_blank() {
        assert!(TargetName::new("   ").is_none());
        assert_eq!(
            TargetName::new("  Ecolab Inc ").map(TargetName::into_inner),
            Some("Ecolab Inc".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_declared_name_is_recovered(name in "[A-Za-z][A-Za-z0-9&,' -]{0,40}[A-Za-z0-9]") {
            let response = format!("{TARGET_PREFIX}{name}.");
            let verdict = RelevanceVerdict::from_response(&response);
            let recovered = verdict.ok().and_then(|v| v.target().cloned());
            prop_assert_eq!(recovered.as_ref().map(TargetName::as_str), Some(name.as_str()));
        }

        #[test]
        fn prop_recovered_name_has_no_prefix_or_period(name in "[^\\s.][^\\n]{0,40}") {
            let response = format!("{TARGET_PREFIX}{name}.");
            if let Ok(RelevanceVerdict::Target(target)) = RelevanceVerdict::from_response(&response) {
                prop_assert!(!target.as_str().is_empty());
                prop_assert!(!target.as_str().starts_with(TARGET_PREFIX));
                prop_assert!(!target.as_str().ends_with('.'));
            }
        }
    }
}
