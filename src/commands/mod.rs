//! Command-line interface and orchestration for repo-rank
//!
//! This module implements the CLI commands and wires the other modules into
//! end-to-end workflows. Three commands exist:
//!
//! - **rank**: load a collection, score/categorize/delta-annotate it, and
//!   write the updated collection plus rendered artifacts and a snapshot
//! - **inject**: splice the rendered ranking table into a Markdown document
//!   between marker comments, or verify it in `--check` mode
//! - **init**: generate a default configuration file
//!
//! The `run` function parses arguments with clap and routes to the handlers.
//! Handlers talk to the host environment through the [`Host`] trait so tests
//! can capture output and exit codes in memory.

mod host;
mod init;
mod inject;
mod rank;
mod run;

pub use host::Host;
pub use init::{InitArgs, init_config};
pub use inject::{InjectArgs, process_inject};
pub use rank::{RankArgs, process_rank};
pub use run::run;
