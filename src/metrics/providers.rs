//! Built-in sub-metric formulas
//!
//! These are reference formulas; downstream snapshots and rendered tables
//! depend on their exact shape, so changes here are compatibility breaks.

use chrono::{DateTime, Utc};

/// Licenses treated as fully permissive.
const PERMISSIVE_LICENSES: &[&str] = &["MIT", "Apache-2.0", "BSD-2-Clause", "BSD-3-Clause", "ISC", "Zlib", "MPL-2.0"];

/// Keywords whose presence in topics or README signals ecosystem integration.
const ECOSYSTEM_KEYWORDS: &[&str] = &["langchain", "plugin", "openai", "tool", "extension", "framework"];

/// Minimum README word count for the documentation flag.
const DOC_MIN_WORDS: usize = 300;

/// Log-transformed star count: `log2(stars + 1)`.
///
/// Unbounded by design; the +1 keeps zero-star repositories at 0.0.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "star counts are far below 2^52")]
pub fn stars_log2(stars: u64) -> f64 {
    (stars as f64 + 1.0).log2()
}

/// Freshness of the last push: 1.0 within 30 days, 0.0 beyond 365 days,
/// linear in between.
#[must_use]
pub fn recency_factor(pushed_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = now.signed_duration_since(pushed_at).num_days();
    if days <= 30 {
        1.0
    } else if days >= 365 {
        0.0
    } else {
        #[expect(clippy::cast_precision_loss, reason = "days is in (30, 365)")]
        let age = days as f64;
        (1.0 - (age - 30.0) / 335.0).max(0.0)
    }
}

/// Fraction of issues resolved: `1 - open / (open + closed + ε)`.
///
/// ε avoids division by zero when a repository has no issues at all, which
/// yields ≈1.0 (no issues is treated as healthy).
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "issue counts are far below 2^52")]
pub fn issue_health(open: u64, closed: u64) -> f64 {
    let open = open as f64;
    let closed = closed as f64;
    1.0 - open / (open + closed + 1e-6)
}

/// Binary documentation flag: 1.0 when the README has at least 300 words and
/// a fenced code block, else 0.0. Deliberately not continuous.
#[must_use]
pub fn doc_completeness(readme: &str) -> f64 {
    if readme.split_whitespace().count() >= DOC_MIN_WORDS && readme.contains("```") {
        1.0
    } else {
        0.0
    }
}

/// License permissiveness: 1.0 for the permissive allow-list, 0.5 for
/// copyleft or unknown/missing.
///
/// Scoring unknown the same as copyleft is deliberate; missing metadata
/// should not be penalized more harshly than a GPL license.
#[must_use]
pub fn license_freedom(license: Option<&str>) -> f64 {
    let Some(raw) = license else {
        return 0.5;
    };

    let trimmed = raw.trim();
    // Canonicalize through the SPDX registry so "mit" and "MIT" agree.
    let canonical = spdx::license_id(trimmed).map_or(trimmed, |id| id.name);

    if PERMISSIVE_LICENSES.iter().any(|p| p.eq_ignore_ascii_case(canonical)) {
        1.0
    } else {
        0.5
    }
}

/// Ecosystem keyword flag: 1.0 when any known integration keyword appears in
/// the lower-cased topics + README text, else 0.0.
#[must_use]
pub fn ecosystem_integration(topics: &[String], readme: Option<&str>) -> f64 {
    let mut haystack = topics.join(" ").to_lowercase();
    if let Some(text) = readme {
        haystack.push(' ');
        haystack.push_str(&text.to_lowercase());
    }

    if ECOSYSTEM_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_stars_log2() {
        assert!(stars_log2(0).abs() < f64::EPSILON);
        assert!((stars_log2(1) - 1.0).abs() < f64::EPSILON);
        assert!((stars_log2(100) - 101f64.log2()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stars_log2_monotonic() {
        let mut previous = stars_log2(0);
        for stars in [1, 10, 100, 1_000, 100_000] {
            let current = stars_log2(stars);
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn test_recency_factor_fresh() {
        assert!((recency_factor(now() - Duration::days(10), now()) - 1.0).abs() < f64::EPSILON);
        assert!((recency_factor(now() - Duration::days(30), now()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_factor_stale() {
        assert!(recency_factor(now() - Duration::days(365), now()).abs() < f64::EPSILON);
        assert!(recency_factor(now() - Duration::days(1000), now()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_factor_linear_midpoint() {
        // 30 + 335/2 days old should land halfway down the ramp.
        let pushed = now() - Duration::days(30 + 167);
        let factor = recency_factor(pushed, now());
        assert!((factor - (1.0 - 167.0 / 335.0)).abs() < 1e-9);
    }

    #[test]
    fn test_recency_factor_future_push() {
        // Clock skew: a push "in the future" counts as fresh.
        assert!((recency_factor(now() + Duration::days(2), now()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_issue_health_typical() {
        assert!((issue_health(2, 8) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_issue_health_no_issues() {
        assert!(issue_health(0, 0) > 0.999_999);
    }

    #[test]
    fn test_issue_health_all_open() {
        assert!(issue_health(10, 0) < 0.001);
    }

    #[test]
    fn test_issue_health_bounds() {
        for (open, closed) in [(0, 0), (1, 0), (0, 1), (50, 50), (1000, 1)] {
            let h = issue_health(open, closed);
            assert!((0.0..=1.0).contains(&h), "issue_health({open}, {closed}) = {h}");
        }
    }

    #[test]
    fn test_doc_completeness_requires_both() {
        let long_text = "word ".repeat(300);
        assert!(doc_completeness(&long_text).abs() < f64::EPSILON);

        let with_code = format!("{long_text}\n```rust\nfn main() {{}}\n```");
        assert!((doc_completeness(&with_code) - 1.0).abs() < f64::EPSILON);

        assert!(doc_completeness("short ```code```").abs() < f64::EPSILON);
    }

    #[test]
    fn test_license_freedom_permissive() {
        assert!((license_freedom(Some("MIT")) - 1.0).abs() < f64::EPSILON);
        assert!((license_freedom(Some("Apache-2.0")) - 1.0).abs() < f64::EPSILON);
        assert!((license_freedom(Some("BSD-3-Clause")) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_license_freedom_copyleft_and_unknown() {
        assert!((license_freedom(Some("GPL-3.0-only")) - 0.5).abs() < f64::EPSILON);
        assert!((license_freedom(Some("AGPL-3.0-or-later")) - 0.5).abs() < f64::EPSILON);
        assert!((license_freedom(Some("Proprietary")) - 0.5).abs() < f64::EPSILON);
        assert!((license_freedom(None) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ecosystem_integration_topics() {
        let topics = vec!["LangChain".to_string()];
        assert!((ecosystem_integration(&topics, None) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ecosystem_integration_readme() {
        assert!((ecosystem_integration(&[], Some("an OpenAI plugin")) - 1.0).abs() < f64::EPSILON);
        assert!(ecosystem_integration(&[], Some("a parser")).abs() < f64::EPSILON);
        assert!(ecosystem_integration(&[], None).abs() < f64::EPSILON);
    }
}
