//! Ranking orchestration
//!
//! The pipeline reads everything up front, derives in memory, and writes only
//! at the end. A failed quality gate therefore leaves every output file and
//! snapshot exactly as the previous run left them.

mod outputs;
mod pipeline;

pub use outputs::write_artifacts;
pub use pipeline::{RankOptions, RankOutcome, rank};
