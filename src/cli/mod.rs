//! CLI layer for counsel-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! running the whole pipeline or a single stage.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, SegmentArgs};
