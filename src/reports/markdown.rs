use crate::deltas::Delta;
use crate::model::{Category, RepoRecord};
use core::fmt::Write as _;

/// Render the ranked Markdown table: header, separator, then up to `limit`
/// data rows in collection order.
///
/// The output is a pure function of the records, which is what makes
/// repeated injection runs idempotent. Delta cells follow the rendering
/// rule: empty for zero, sign-prefixed otherwise, `+new` for repositories
/// without a baseline.
#[must_use]
pub fn render_ranked_table(repos: &[RepoRecord], limit: usize) -> String {
    let mut out = String::new();
    out.push_str("| Rank | Repository | Stars | Δ Stars | Score | Δ Score | Category |\n");
    out.push_str("|------|------------|-------|---------|-------|---------|----------|\n");

    for (index, repo) in repos.iter().take(limit).enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            index + 1,
            repo_link(repo),
            repo.stars,
            delta_cell(repo.stars_delta),
            score_cell(repo.score),
            delta_cell(repo.score_delta),
            repo.category.map(|c| c.to_string()).unwrap_or_default(),
        );
    }

    out
}

/// Render the category navigation block: one line per non-empty category
/// with its repository count, in fixed taxonomy order.
#[must_use]
pub fn render_category_nav(repos: &[RepoRecord]) -> String {
    let mut out = String::new();
    for category in Category::ALL {
        let count = repos.iter().filter(|r| r.category == Some(category)).count();
        if count > 0 {
            let _ = writeln!(out, "- **{category}** ({count})");
        }
    }
    out
}

fn repo_link(repo: &RepoRecord) -> String {
    let label = repo.full_name.as_deref().unwrap_or(&repo.name);
    match &repo.html_url {
        Some(url) => format!("[{label}]({url})"),
        None => label.to_string(),
    }
}

fn score_cell(score: Option<f64>) -> String {
    score.map(|s| format!("{s:.2}")).unwrap_or_default()
}

fn delta_cell(delta: Option<Delta>) -> String {
    delta.map(|d| d.render()).unwrap_or_default()
}
