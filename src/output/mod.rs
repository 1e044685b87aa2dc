//! Output module for run results
//!
//! This module handles:
//! - Writing output records as JSON lines for downstream ingestion
//! - Recording and printing run statistics

mod jsonl;
pub mod stats;

pub use jsonl::{drain_to_writer, JsonLinesWriter};
pub use stats::{print_statistics, RunStats};
