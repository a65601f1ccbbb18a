use crate::deltas::Delta;
use crate::model::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One repository in canonical form.
///
/// Produced by the load-boundary normalization in
/// [`RepoCollection::load`](crate::model::RepoCollection::load); every input
/// schema version maps onto this shape. The `score`, `category`, sub-metric,
/// and `*_delta` fields are written by the ranking pipeline and are absent
/// (`None`) on freshly harvested input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,

    #[serde(default)]
    pub stars: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub open_issues_count: u64,

    #[serde(default)]
    pub closed_issues: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,

    /// SPDX license identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<DateTime<Utc>>,

    /// README text, when the harvester captured it. Feeds the documentation
    /// and ecosystem sub-metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,

    // Derived fields, populated by the ranking pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars_log2: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recency_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_health: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_completeness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_freedom: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem_integration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars_delta: Option<Delta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forks_delta: Option<Delta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_issues_delta: Option<Delta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_delta: Option<Delta>,
}

impl RepoRecord {
    /// The key used to match this record across snapshots: `full_name`,
    /// falling back to `name`. Snapshot writing and delta lookup must agree
    /// on this or every delta silently degrades to `+new`.
    #[must_use]
    pub fn identity_key(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }

    /// Minimal record for tests and fixtures.
    #[cfg(test)]
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: None,
            html_url: None,
            stars: 0,
            forks_count: 0,
            open_issues_count: 0,
            closed_issues: 0,
            description: None,
            topics: Vec::new(),
            license: None,
            language: None,
            pushed_at: None,
            readme: None,
            score: None,
            category: None,
            stars_log2: None,
            recency_factor: None,
            issue_health: None,
            doc_completeness: None,
            license_freedom: None,
            ecosystem_integration: None,
            stars_delta: None,
            forks_delta: None,
            closed_issues_delta: None,
            score_delta: None,
        }
    }
}
