use super::Host;
use crate::Result;
use crate::config::Config;
use crate::inject::{MarkerError, MarkerPair, build_document, unified_diff};
use crate::model::RepoCollection;
use crate::reports;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "inject";

#[derive(Parser, Debug)]
pub struct InjectArgs {
    /// Markdown document carrying the injection markers
    #[arg(value_name = "DOCUMENT")]
    pub document: Utf8PathBuf,

    /// Path to the ranked repository collection JSON file
    #[arg(value_name = "INPUT")]
    pub input: Utf8PathBuf,

    /// Path to configuration file (default is `repo-rank.toml` next to the input)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Report drift as a diff and exit non-zero instead of writing
    #[arg(long)]
    pub check: bool,

    /// Write the document even when its content is unchanged
    #[arg(long, conflicts_with = "check")]
    pub force: bool,
}

/// Rebuild the target document from the ranked collection and either write
/// it (default) or report drift (`--check`).
///
/// The ranking table span is mandatory; a missing marker is fatal in write
/// mode and a reported failure (exit 1) in check mode. The category
/// navigation span is optional and silently skipped when its markers are
/// absent. An unchanged document is not rewritten unless `--force` is given.
///
/// # Errors
///
/// Returns an error if the document, input, or configuration cannot be
/// loaded, if a mandatory marker is missing in write mode, or if the
/// document cannot be written.
pub fn process_inject<H: Host>(host: &mut H, args: &InjectArgs) -> Result<()> {
    let working_dir = args.input.parent().unwrap_or(Utf8Path::new("."));
    let config = Config::load(working_dir, args.config.as_ref())?;

    let collection = RepoCollection::load(&args.input)?;
    let source =
        fs::read_to_string(&args.document).into_app_err_with(|| format!("unable to read document '{}'", args.document))?;

    let updated = match rebuild(&source, &collection, &config) {
        Ok(updated) => updated,
        Err(e) if args.check => {
            let _ = writeln!(host.error(), "{}: {e}", args.document);
            host.exit(1);
            return Ok(());
        }
        Err(e) => return Err(e).into_app_err_with(|| format!("unable to update document '{}'", args.document)),
    };

    if args.check {
        if updated == source {
            let _ = writeln!(host.output(), "{} is up to date", args.document);
        } else {
            let diff = unified_diff(&source, &updated, args.document.as_str(), "expected");
            let _ = write!(host.output(), "{diff}");
            let _ = writeln!(host.error(), "{} is out of date", args.document);
            host.exit(1);
        }
        return Ok(());
    }

    if updated == source && !args.force {
        let _ = writeln!(host.output(), "{} already up to date", args.document);
        return Ok(());
    }

    fs::write(&args.document, &updated).into_app_err_with(|| format!("unable to write document '{}'", args.document))?;
    let _ = writeln!(host.output(), "Updated {}", args.document);
    Ok(())
}

/// Splice the rendered table (and, when its markers exist, the category
/// navigation) into the document.
fn rebuild(source: &str, collection: &RepoCollection, config: &Config) -> Result<String, MarkerError> {
    let top_n = config.ranking.top_n;
    let table = reports::render_ranked_table(&collection.repos, top_n);
    let mut updated = build_document(source, &table, &MarkerPair::ranking(top_n))?;

    let nav = reports::render_category_nav(&collection.repos);
    match build_document(&updated, &nav, &MarkerPair::category_nav()) {
        Ok(with_nav) => updated = with_nav,
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Skipping category navigation: {e}");
        }
    }

    Ok(updated)
}
