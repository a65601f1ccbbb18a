use crate::Result;
use crate::deltas;
use crate::metrics::{self, MetricRegistry};
use crate::model::{RepoCollection, categorize};
use crate::snapshot::SnapshotStore;
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use ohno::bail;

const LOG_TARGET: &str = "ranking";

/// Run parameters for [`rank`], resolved from configuration and CLI flags
/// before the pipeline starts.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Repositories below this star count are dropped before scoring.
    pub min_stars: u64,

    /// Number of dated snapshot files kept after pruning.
    pub retention: usize,

    /// Whether to persist a snapshot of this run. Explicit flag; the pipeline
    /// never sniffs the environment to decide.
    pub write_snapshot: bool,

    /// Calendar date the snapshot file is keyed by.
    pub today: NaiveDate,
}

/// The result of a ranking run, ready for the artifact writers.
#[derive(Debug)]
pub struct RankOutcome {
    /// Records scored, categorized, delta-annotated, and deterministically
    /// sorted.
    pub collection: RepoCollection,

    /// Records the `min_stars` filter removed.
    pub filtered_out: usize,

    /// Records with no baseline in the previous snapshot.
    pub new_count: usize,

    /// Path of the snapshot written this run, when snapshotting was enabled.
    pub snapshot_path: Option<Utf8PathBuf>,
}

/// Score, categorize, and delta-annotate a collection, then sort it.
///
/// Phases, in order: filter below `min_stars`, load the previous snapshot,
/// derive per-record fields, check the quality gate, sort, and finally
/// persist the snapshot (the only write this function performs, and only
/// when `write_snapshot` is set). The quality gate fires before that write,
/// so a degenerate scoring run cannot poison the snapshot history.
///
/// Sorting is score-descending with ties broken by case-insensitive identity
/// key ascending, which makes the output byte-identical across runs on
/// identical input.
///
/// # Errors
///
/// Returns an error when the number of zero-score records exceeds
/// `max(1, 2% of n)`, or when the snapshot cannot be persisted.
pub fn rank(
    mut collection: RepoCollection,
    registry: &mut MetricRegistry,
    store: &SnapshotStore,
    options: &RankOptions,
) -> Result<RankOutcome> {
    let before = collection.repos.len();
    collection.repos.retain(|r| r.stars >= options.min_stars);
    let filtered_out = before - collection.repos.len();
    if filtered_out > 0 {
        log::debug!(target: LOG_TARGET, "Filtered {filtered_out} records below {} stars", options.min_stars);
    }

    let previous = store.load_previous();
    let mut new_count = 0;
    let mut zero_scores = 0;

    for record in &mut collection.repos {
        let breakdown = metrics::score(registry, record);

        record.stars_log2 = breakdown.sub_metric("stars_log2");
        record.recency_factor = breakdown.sub_metric("recency_factor");
        record.issue_health = breakdown.sub_metric("issue_health");
        record.doc_completeness = breakdown.sub_metric("doc_completeness");
        record.license_freedom = breakdown.sub_metric("license_freedom");
        record.ecosystem_integration = breakdown.sub_metric("ecosystem_integration");

        record.score = Some(breakdown.score);
        if breakdown.score == 0.0 {
            zero_scores += 1;
        }

        record.category = Some(categorize(record.description.as_deref(), &record.topics));

        let baseline = previous.get(record.identity_key());
        if baseline.is_none() {
            new_count += 1;
        }
        record.stars_delta = Some(deltas::count_delta(baseline.map(|p| p.stars), record.stars));
        record.forks_delta = Some(deltas::count_delta(baseline.map(|p| p.forks_count), record.forks_count));
        record.closed_issues_delta = Some(deltas::count_delta(baseline.map(|p| p.closed_issues), record.closed_issues));
        record.score_delta = Some(deltas::score_delta(baseline.and_then(|p| p.score), breakdown.score));
    }

    // Quality gate: a run where scoring collapsed across the board must not
    // overwrite anything.
    let allowed = (collection.repos.len() / 50).max(1);
    if zero_scores > allowed {
        bail!(
            "quality gate failed: {zero_scores} of {} repositories scored 0.0 (at most {allowed} allowed)",
            collection.repos.len()
        );
    }

    collection.repos.sort_by(|a, b| {
        let score_a = a.score.unwrap_or_default();
        let score_b = b.score.unwrap_or_default();
        score_b
            .total_cmp(&score_a)
            .then_with(|| a.identity_key().to_lowercase().cmp(&b.identity_key().to_lowercase()))
    });

    let snapshot_path = if options.write_snapshot {
        Some(store.persist(&collection, options.retention, options.today)?)
    } else {
        None
    };

    log::debug!(
        target: LOG_TARGET,
        "Ranked {} repositories ({new_count} new, {filtered_out} filtered)",
        collection.repos.len()
    );

    Ok(RankOutcome {
        collection,
        filtered_out,
        new_count,
        snapshot_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deltas::Delta;
    use crate::metrics::{MetricProvider, WeightProfile};
    use crate::model::{Category, RepoRecord};
    use camino::Utf8PathBuf;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn test_today() -> NaiveDate {
        test_now().date_naive()
    }

    fn registry() -> MetricRegistry {
        MetricRegistry::with_builtins(WeightProfile::Reference, test_now())
    }

    fn store() -> (tempfile::TempDir, SnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap());
        (dir, store)
    }

    fn record(name: &str, stars: u64) -> RepoRecord {
        let mut record = RepoRecord::named(name);
        record.stars = stars;
        record.closed_issues = 10;
        record.pushed_at = Some(test_now() - Duration::days(5));
        record.license = Some("MIT".to_string());
        record
    }

    fn collection(repos: Vec<RepoRecord>) -> RepoCollection {
        RepoCollection { schema_version: 3, repos }
    }

    fn options() -> RankOptions {
        RankOptions {
            min_stars: 0,
            retention: 7,
            write_snapshot: true,
            today: test_today(),
        }
    }

    #[test]
    fn test_rank_derives_all_fields() {
        let (_dir, store) = store();
        let mut record = record("alpha", 100);
        record.description = Some("a retrieval toolkit".to_string());

        let outcome = rank(collection(vec![record]), &mut registry(), &store, &options()).unwrap();

        let ranked = &outcome.collection.repos[0];
        assert!(ranked.score.is_some());
        assert_eq!(ranked.category, Some(Category::RagCentric));
        assert!(ranked.stars_log2.is_some());
        assert!(ranked.recency_factor.is_some());
        assert!(ranked.issue_health.is_some());
        assert!(ranked.doc_completeness.is_some());
        assert!(ranked.license_freedom.is_some());
        assert!(ranked.ecosystem_integration.is_some());
        assert_eq!(ranked.stars_delta, Some(Delta::New));
        assert_eq!(ranked.score_delta, Some(Delta::New));
    }

    #[test]
    fn test_rank_sorts_score_descending() {
        let (_dir, store) = store();
        let repos = vec![record("low", 10), record("high", 10_000), record("mid", 500)];

        let outcome = rank(collection(repos), &mut registry(), &store, &options()).unwrap();

        let names: Vec<_> = outcome.collection.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_ties_broken_by_identity_case_insensitive() {
        let (_dir, store) = store();
        let repos = vec![record("Zeta", 100), record("alpha", 100), record("Beta", 100)];

        let outcome = rank(collection(repos), &mut registry(), &store, &options()).unwrap();

        let names: Vec<_> = outcome.collection.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn test_rank_min_stars_filter() {
        let (_dir, store) = store();
        let repos = vec![record("small", 3), record("big", 300)];
        let opts = RankOptions { min_stars: 50, ..options() };

        let outcome = rank(collection(repos), &mut registry(), &store, &opts).unwrap();

        assert_eq!(outcome.filtered_out, 1);
        assert_eq!(outcome.collection.repos.len(), 1);
        assert_eq!(outcome.collection.repos[0].name, "big");
    }

    #[test]
    fn test_rank_deltas_against_previous_run() {
        let (_dir, store) = store();

        let first = rank(collection(vec![record("alpha", 100)]), &mut registry(), &store, &options()).unwrap();
        assert_eq!(first.new_count, 1);

        let mut updated = record("alpha", 103);
        updated.closed_issues = 12;
        let second = rank(collection(vec![updated, record("beta", 50)]), &mut registry(), &store, &options()).unwrap();

        assert_eq!(second.new_count, 1);
        let alpha = second.collection.repos.iter().find(|r| r.name == "alpha").unwrap();
        assert_eq!(alpha.stars_delta, Some(Delta::Int(3)));
        assert_eq!(alpha.closed_issues_delta, Some(Delta::Int(2)));
        let beta = second.collection.repos.iter().find(|r| r.name == "beta").unwrap();
        assert_eq!(beta.stars_delta, Some(Delta::New));
    }

    #[test]
    fn test_rank_unchanged_record_gets_zero_deltas() {
        let (_dir, store) = store();

        let _ = rank(collection(vec![record("alpha", 100)]), &mut registry(), &store, &options()).unwrap();
        let second = rank(collection(vec![record("alpha", 100)]), &mut registry(), &store, &options()).unwrap();

        let alpha = &second.collection.repos[0];
        assert_eq!(alpha.stars_delta, Some(Delta::Int(0)));
        assert_eq!(alpha.score_delta, Some(Delta::Float(0.0)));
    }

    #[test]
    fn test_rank_no_snapshot_flag_skips_persist() {
        let (_dir, store) = store();
        let opts = RankOptions { write_snapshot: false, ..options() };

        let outcome = rank(collection(vec![record("alpha", 100)]), &mut registry(), &store, &opts).unwrap();

        assert!(outcome.snapshot_path.is_none());
        assert!(store.load_previous().is_empty());
    }

    #[test]
    fn test_rank_is_deterministic() {
        let (_dir, store) = store();
        let repos = || collection(vec![record("alpha", 100), record("beta", 100), record("gamma", 50)]);
        let opts = RankOptions { write_snapshot: false, ..options() };

        let first = rank(repos(), &mut registry(), &store, &opts).unwrap();
        let second = rank(repos(), &mut registry(), &store, &opts).unwrap();

        let a = serde_json::to_string(&first.collection).unwrap();
        let b = serde_json::to_string(&second.collection).unwrap();
        assert_eq!(a, b);
    }

    fn zeroed_registry() -> MetricRegistry {
        let mut registry = registry();
        for name in [
            "stars_log2",
            "recency_factor",
            "issue_health",
            "doc_completeness",
            "license_freedom",
            "ecosystem_integration",
        ] {
            registry.register(MetricProvider::new(name, 0.1, |_| Ok(0.0)));
        }
        registry
    }

    #[test]
    fn test_quality_gate_aborts_before_snapshot() {
        let (_dir, store) = store();
        let repos: Vec<_> = (0..10).map(|i| record(&format!("r{i}"), 100)).collect();

        let err = rank(collection(repos), &mut zeroed_registry(), &store, &options()).unwrap_err();

        assert!(err.to_string().contains("quality gate"));
        assert!(store.load_previous().is_empty());
    }

    #[test]
    fn test_quality_gate_tolerates_single_zero() {
        let (_dir, store) = store();
        // A single zero-scoring record is within the allowance even for tiny
        // collections.
        let outcome = rank(collection(vec![record("alpha", 100)]), &mut zeroed_registry(), &store, &options()).unwrap();
        assert_eq!(outcome.collection.repos.len(), 1);
    }
}
