//! Fixed-arity segment input for the extraction stage.

use crate::error::AgentError;

/// Number of segments analysed per pipeline run.
pub const SEGMENT_COUNT: usize = 4;

/// Exactly four text segments, in caller order.
///
/// Order only matters for traceability: each segment is analysed on its
/// own and labelled `Paragraph 1` through `Paragraph 4` in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments([String; SEGMENT_COUNT]);

impl Segments {
    /// Creates segments from any slice of string-like values.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InputCardinality`] unless exactly
    /// [`SEGMENT_COUNT`] segments are given.
    pub fn from_slice<S: AsRef<str>>(segments: &[S]) -> Result<Self, AgentError> {
        match segments {
            [a, b, c, d] => Ok(Self([
                a.as_ref().to_string(),
                b.as_ref().to_string(),
                c.as_ref().to_string(),
                d.as_ref().to_string(),
            ])),
            _ => Err(AgentError::InputCardinality {
                expected: SEGMENT_COUNT,
                actual: segments.len(),
            }),
        }
    }

    /// Iterates segments with their 1-based position.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().enumerate().map(|(i, s)| (i + 1, s.as_str()))
    }

    /// Returns the segments as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for Segments {
    type Error = AgentError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        let actual = segments.len();
        <[String; SEGMENT_COUNT]>::try_from(segments)
            .map(Self)
            .map_err(|_| AgentError::InputCardinality {
                expected: SEGMENT_COUNT,
                actual,
            })
    }
}
