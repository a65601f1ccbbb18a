use super::Host;
use crate::Result;
use crate::config::Config;
use crate::metrics::MetricRegistry;
use crate::model::RepoCollection;
use crate::ranking::{self, RankOptions};
use crate::snapshot::SnapshotStore;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::{IsTerminal, Write, stdout};

const SNAPSHOT_DIR: &str = "snapshots";

#[derive(Parser, Debug)]
pub struct RankArgs {
    /// Path to the repository collection JSON file
    #[arg(value_name = "INPUT")]
    pub input: Utf8PathBuf,

    /// Path to configuration file (default is `repo-rank.toml` next to the input)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory for rendered artifacts and snapshots
    #[arg(long, default_value = "rankings", value_name = "DIR")]
    pub output_dir: Utf8PathBuf,

    /// Skip writing a snapshot of this run
    #[arg(long)]
    pub no_snapshot: bool,
}

/// Score, categorize, and rank the input collection, then write the updated
/// collection in place along with the Markdown summary, per-category files,
/// and (unless suppressed) a dated snapshot.
///
/// # Errors
///
/// Returns an error if the input or configuration cannot be loaded, if the
/// quality gate fails, or if any output cannot be written.
pub fn process_rank<H: Host>(host: &mut H, args: &RankArgs) -> Result<()> {
    let working_dir = args.input.parent().unwrap_or(Utf8Path::new("."));
    let config = Config::load(working_dir, args.config.as_ref())?;

    let collection = RepoCollection::load(&args.input)?;
    let mut registry = MetricRegistry::with_builtins(config.ranking.weight_profile, Utc::now());
    let store = SnapshotStore::new(args.output_dir.join(SNAPSHOT_DIR));

    let options = RankOptions {
        min_stars: config.ranking.min_stars,
        retention: config.ranking.delta_days,
        write_snapshot: !args.no_snapshot,
        today: Utc::now().date_naive(),
    };

    let outcome = ranking::rank(collection, &mut registry, &store, &options)?;

    outcome.collection.save(&args.input)?;
    ranking::write_artifacts(&outcome.collection, &args.output_dir, config.output.markdown_table_limit)?;

    print_summary(host, &outcome, &args.output_dir);
    Ok(())
}

fn print_summary<H: Host>(host: &mut H, outcome: &ranking::RankOutcome, output_dir: &Utf8Path) {
    let use_colors = stdout().is_terminal();
    let ranked = outcome.collection.repos.len();

    let headline = format!("Ranked {ranked} repositories ({} new, {} filtered out)", outcome.new_count, outcome.filtered_out);
    let headline = if use_colors { headline.green().bold().to_string() } else { headline };
    let _ = writeln!(host.output(), "{headline}");
    let _ = writeln!(host.output(), "Artifacts written to {output_dir}");

    match &outcome.snapshot_path {
        Some(path) => {
            let _ = writeln!(host.output(), "Snapshot saved as {path}");
        }
        None => {
            let _ = writeln!(host.output(), "Snapshot skipped");
        }
    }
}
