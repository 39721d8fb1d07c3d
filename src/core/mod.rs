//! Core data types of the extraction pipeline.
//!
//! Everything here is pure: parsing and validation of backend text into
//! typed values, with no I/O.

pub mod analysis;
pub mod record;
pub mod relevance;
pub mod result;
pub mod segment;

pub use analysis::{AnalysisReport, Field, SegmentAnalysis, Slot};
pub use record::{CompiledRecord, UNKNOWN_FIRM};
pub use relevance::{IRRELEVANT_MESSAGE, RelevanceVerdict, TargetName};
pub use result::{FailureCause, PipelineResult, PipelineRun};
pub use segment::{SEGMENT_COUNT, Segments};
