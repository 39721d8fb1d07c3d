//! Structured view over the extraction stage's free-text output.
//!
//! The extraction stage returns one text with a block per segment:
//!
//! ```text
//! Paragraph 1 Analysis:
//! Buyer: Ecolab Inc.
//! Buyer Representative: Not stated
//! Seller: Purolite Corporation
//! Seller Representative: Not stated
//! Third-Party Representation: Gibson, Dunn & Crutcher LLP
//! Target Company Mentioned: No
//! ```
//!
//! The text itself is what flows to the compilation stage. This parse is
//! used to check the block structure and to render per-segment summaries.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::segment::SEGMENT_COUNT;

#[allow(clippy::expect_used)]
static BLOCK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\s#*]*(?:paragraph|segment)\s+(\d+)\s+analysis[\s*]*:?[\s*]*$")
        .expect("block header pattern is valid")
});

/// Values the extraction stage uses to say a slot has no content.
const NOT_STATED_MARKERS: &[&str] = &[
    "not identified",
    "not stated",
    "not mentioned",
    "not applicable",
    "none",
    "n/a",
    "unknown",
];

/// One of the six labelled fields of a segment analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// `Buyer:`
    Buyer,
    /// `Buyer Representative:`
    BuyerRepresentative,
    /// `Seller:`
    Seller,
    /// `Seller Representative:`
    SellerRepresentative,
    /// `Third-Party Representation:`
    ThirdPartyRepresentation,
    /// `Target Company Mentioned:`
    TargetMentioned,
}

impl Field {
    /// All fields in template order.
    pub const ALL: [Self; 6] = [
        Self::Buyer,
        Self::BuyerRepresentative,
        Self::Seller,
        Self::SellerRepresentative,
        Self::ThirdPartyRepresentation,
        Self::TargetMentioned,
    ];

    /// Label as written in the template.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Buyer => "Buyer",
            Self::BuyerRepresentative => "Buyer Representative",
            Self::Seller => "Seller",
            Self::SellerRepresentative => "Seller Representative",
            Self::ThirdPartyRepresentation => "Third-Party Representation",
            Self::TargetMentioned => "Target Company Mentioned",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace('-', " ");
        match normalized.as_str() {
            "buyer" => Some(Self::Buyer),
            "buyer representative" => Some(Self::BuyerRepresentative),
            "seller" => Some(Self::Seller),
            "seller representative" => Some(Self::SellerRepresentative),
            "third party representation" => Some(Self::ThirdPartyRepresentation),
            "target company mentioned" => Some(Self::TargetMentioned),
            _ => None,
        }
    }
}

/// A text slot that is either populated or explicitly empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Slot {
    /// The slot was not filled in, or was filled with a "none" marker.
    #[default]
    NotStated,
    /// The slot carries a value.
    Stated(String),
}

impl Slot {
    /// Interprets a raw slot value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let cleaned = clean_value(raw);
        if cleaned.is_empty() || is_not_stated_marker(cleaned) {
            Self::NotStated
        } else {
            Self::Stated(cleaned.to_string())
        }
    }

    /// Returns the value, if stated.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::NotStated => None,
            Self::Stated(v) => Some(v),
        }
    }
}

/// Returns `true` if `value` is one of the "nothing here" markers.
#[must_use]
pub fn is_not_stated_marker(value: &str) -> bool {
    let lowered = value.trim().trim_end_matches('.').to_lowercase();
    NOT_STATED_MARKERS.contains(&lowered.as_str())
}

fn clean_value(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| c == '*' || c == '"' || c == '[' || c == ']')
        .trim()
}

/// Parsed analysis of a single segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentAnalysis {
    /// Position of the block as numbered in its header (1-based).
    pub index: usize,
    /// Buying party.
    pub buyer: Slot,
    /// Law firm representing the buyer.
    pub buyer_representative: Slot,
    /// Selling party.
    pub seller: Slot,
    /// Law firm representing the seller.
    pub seller_representative: Slot,
    /// Third-party representation.
    pub third_party_representation: Slot,
    /// Whether the target was mentioned (`None` when unreadable).
    pub target_mentioned: Option<bool>,
    /// Labels found in this block.
    #[serde(skip)]
    present: Vec<Field>,
}

impl SegmentAnalysis {
    fn parse_block(index: usize, body: &str) -> Self {
        let mut analysis = Self {
            index,
            ..Self::default()
        };

        for line in body.lines() {
            let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '•');
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let Some(field) = Field::from_label(label.trim_matches('*')) else {
                continue;
            };
            if analysis.present.contains(&field) {
                continue;
            }
            analysis.present.push(field);
            match field {
                Field::Buyer => analysis.buyer = Slot::parse(value),
                Field::BuyerRepresentative => analysis.buyer_representative = Slot::parse(value),
                Field::Seller => analysis.seller = Slot::parse(value),
                Field::SellerRepresentative => analysis.seller_representative = Slot::parse(value),
                Field::ThirdPartyRepresentation => {
                    analysis.third_party_representation = Slot::parse(value);
                }
                Field::TargetMentioned => analysis.target_mentioned = parse_yes_no(value),
            }
        }

        analysis
    }

    /// Labels of the template that this block did not contain.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.present.contains(f))
            .collect()
    }

    /// Returns `true` when all six labels were present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn parse_yes_no(raw: &str) -> Option<bool> {
    let cleaned = clean_value(raw).trim_end_matches('.').to_lowercase();
    if cleaned.starts_with("yes") {
        Some(true)
    } else if cleaned.starts_with("no") {
        Some(false)
    } else {
        None
    }
}

/// The extraction text together with its parsed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Parsed per-segment blocks, in the order they appear.
    pub segments: Vec<SegmentAnalysis>,
}

impl AnalysisReport {
    /// Splits extraction text on its `Paragraph N Analysis:` headers.
    ///
    /// Text before the first header is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let headers: Vec<(usize, usize, usize)> = BLOCK_HEADER
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let index = caps.get(1)?.as_str().parse().ok()?;
                Some((index, whole.start(), whole.end()))
            })
            .collect();

        let segments = headers
            .iter()
            .enumerate()
            .map(|(i, &(index, _, body_start))| {
                let body_end = headers.get(i + 1).map_or(text.len(), |&(_, start, _)| start);
                SegmentAnalysis::parse_block(index, &text[body_start..body_end])
            })
            .collect();

        Self { segments }
    }

    /// Returns `true` for exactly four blocks each carrying all six labels.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.segments.len() == SEGMENT_COUNT && self.segments.iter().all(SegmentAnalysis::is_complete)
    }

    /// Human-readable list of structural problems, empty when complete.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.segments.len() != SEGMENT_COUNT {
            problems.push(format!(
                "expected {SEGMENT_COUNT} analysis blocks, found {}",
                self.segments.len()
            ));
        }
        for segment in &self.segments {
            let missing = segment.missing_fields();
            if !missing.is_empty() {
                let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
                problems.push(format!(
                    "block {} is missing: {}",
                    segment.index,
                    labels.join(", ")
                ));
            }
        }
        problems
    }

    /// Returns `true` if any block affirms that the target was mentioned.
    #[must_use]
    pub fn target_affirmed(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.target_mentioned == Some(true))
    }
}
