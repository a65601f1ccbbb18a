use super::providers;
use crate::Result;
use crate::model::RepoRecord;
use chrono::{DateTime, Utc};
use core::fmt;
use ohno::app_err;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

const LOG_TARGET: &str = "metrics";

/// Scoring function signature shared by built-ins and plugins.
pub type ScoreFn = Arc<dyn Fn(&RepoRecord) -> Result<f64> + Send + Sync>;

/// A plugin contributes a batch of providers or fails as a whole; there is no
/// partial registration.
pub type MetricPlugin = fn() -> Result<Vec<MetricProvider>>;

/// Which weight vector the built-in providers are registered with.
///
/// The two vectors come from different generations of the scoring formula.
/// They are kept apart by name and version; selecting one is a configuration
/// decision, never an implicit merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WeightProfile {
    /// Canonical formula, version v1: 0.30/0.25/0.20/0.15/0.07/0.03.
    #[default]
    Reference,

    /// Historical alternate, version v0: 0.35/0.20/0.15/0.15/0.10/0.05.
    Legacy,
}

impl WeightProfile {
    /// Explicit formula version tag, recorded alongside scores.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        match self {
            Self::Reference => "v1",
            Self::Legacy => "v0",
        }
    }

    /// Weights in provider order: stars, recency, issue health, docs,
    /// license, ecosystem.
    #[must_use]
    pub const fn weights(&self) -> [f64; 6] {
        match self {
            Self::Reference => [0.30, 0.25, 0.20, 0.15, 0.07, 0.03],
            Self::Legacy => [0.35, 0.20, 0.15, 0.15, 0.10, 0.05],
        }
    }
}

/// A named, weighted scoring function.
#[derive(Clone)]
pub struct MetricProvider {
    name: String,
    weight: f64,
    score_fn: ScoreFn,
}

impl MetricProvider {
    pub fn new<F>(name: impl Into<String>, weight: f64, score_fn: F) -> Self
    where
        F: Fn(&RepoRecord) -> Result<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            weight,
            score_fn: Arc::new(score_fn),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Evaluate this provider against a record.
    ///
    /// # Errors
    ///
    /// Propagates whatever the underlying scoring function reports; the
    /// scoring engine converts this into a zero-contribution fault.
    pub fn evaluate(&self, record: &RepoRecord) -> Result<f64> {
        (self.score_fn)(record)
    }
}

impl fmt::Debug for MetricProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricProvider")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of metric providers with lazy plugin discovery.
///
/// Registration order is evaluation order. Re-registering a name replaces
/// the provider in place, so test overrides keep the original evaluation
/// position while taking full effect.
#[derive(Debug)]
pub struct MetricRegistry {
    profile: WeightProfile,
    now: DateTime<Utc>,
    providers: Vec<MetricProvider>,
    plugins: Vec<MetricPlugin>,
    discovered: bool,
}

impl MetricRegistry {
    /// Create a registry pre-populated with the six built-in providers using
    /// the given weight profile. `now` pins the recency reference point so
    /// scoring stays a pure function of its inputs.
    #[must_use]
    pub fn with_builtins(profile: WeightProfile, now: DateTime<Utc>) -> Self {
        let mut registry = Self {
            profile,
            now,
            providers: Vec::new(),
            plugins: Vec::new(),
            discovered: false,
        };
        registry.register_builtins();
        registry
    }

    /// Queue a plugin for discovery on the next [`Self::providers`] call.
    pub fn add_plugin(&mut self, plugin: MetricPlugin) {
        self.plugins.push(plugin);
        self.discovered = false;
    }

    /// Insert or overwrite a provider; the last registration under a name
    /// wins.
    pub fn register(&mut self, provider: MetricProvider) {
        if let Some(existing) = self.providers.iter_mut().find(|p| p.name == provider.name) {
            *existing = provider;
        } else {
            self.providers.push(provider);
        }
    }

    /// All registered providers, running one-time plugin discovery first.
    ///
    /// A plugin that fails is logged and omitted entirely; its providers are
    /// registered all-or-nothing.
    pub fn providers(&mut self) -> &[MetricProvider] {
        if !self.discovered {
            self.discovered = true;
            for plugin in core::mem::take(&mut self.plugins) {
                match plugin() {
                    Ok(batch) => {
                        for provider in batch {
                            log::debug!(target: LOG_TARGET, "Discovered plugin provider '{}' (weight {})", provider.name, provider.weight);
                            self.register(provider);
                        }
                    }
                    Err(e) => {
                        log::warn!(target: LOG_TARGET, "Skipping failed metric plugin: {e:#}");
                    }
                }
            }
        }

        &self.providers
    }

    /// Restore the built-in providers and clear discovery state. Test seam.
    pub fn reset(&mut self) {
        self.providers.clear();
        self.plugins.clear();
        self.discovered = false;
        self.register_builtins();
    }

    #[must_use]
    pub const fn profile(&self) -> WeightProfile {
        self.profile
    }

    fn register_builtins(&mut self) {
        let [w_stars, w_recency, w_issues, w_docs, w_license, w_eco] = self.profile.weights();
        let now = self.now;

        self.register(MetricProvider::new("stars_log2", w_stars, |r| Ok(providers::stars_log2(r.stars))));
        self.register(MetricProvider::new("recency_factor", w_recency, move |r| {
            let pushed_at = r.pushed_at.ok_or_else(|| app_err!("record has no pushed_at timestamp"))?;
            Ok(providers::recency_factor(pushed_at, now))
        }));
        self.register(MetricProvider::new("issue_health", w_issues, |r| {
            Ok(providers::issue_health(r.open_issues_count, r.closed_issues))
        }));
        self.register(MetricProvider::new("doc_completeness", w_docs, |r| {
            Ok(r.readme.as_deref().map_or(0.0, providers::doc_completeness))
        }));
        self.register(MetricProvider::new("license_freedom", w_license, |r| {
            Ok(providers::license_freedom(r.license.as_deref()))
        }));
        self.register(MetricProvider::new("ecosystem_integration", w_eco, |r| {
            Ok(providers::ecosystem_integration(&r.topics, r.readme.as_deref()))
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_builtins_registered_in_weight_order() {
        let mut registry = MetricRegistry::with_builtins(WeightProfile::Reference, test_now());
        let names: Vec<_> = registry.providers().iter().map(MetricProvider::name).collect();
        assert_eq!(
            names,
            [
                "stars_log2",
                "recency_factor",
                "issue_health",
                "doc_completeness",
                "license_freedom",
                "ecosystem_integration"
            ]
        );
    }

    #[test]
    fn test_reference_weights_sum_to_one() {
        let total: f64 = WeightProfile::Reference.weights().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        let total: f64 = WeightProfile::Legacy.weights().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_profiles_stay_distinguishable() {
        assert_ne!(WeightProfile::Reference.weights(), WeightProfile::Legacy.weights());
        assert_ne!(WeightProfile::Reference.version(), WeightProfile::Legacy.version());
    }

    #[test]
    fn test_register_overwrites_in_place() {
        let mut registry = MetricRegistry::with_builtins(WeightProfile::Reference, test_now());
        registry.register(MetricProvider::new("stars_log2", 0.5, |_| Ok(1.0)));

        let providers = registry.providers();
        assert_eq!(providers.len(), 6);
        assert_eq!(providers[0].name(), "stars_log2");
        assert!((providers[0].weight() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_plugin_discovery_runs_once() {
        fn plugin() -> crate::Result<Vec<MetricProvider>> {
            Ok(vec![MetricProvider::new("custom", 0.1, |_| Ok(0.5))])
        }

        let mut registry = MetricRegistry::with_builtins(WeightProfile::Reference, test_now());
        registry.add_plugin(plugin);

        assert_eq!(registry.providers().len(), 7);
        assert_eq!(registry.providers().len(), 7);
    }

    #[test]
    fn test_failing_plugin_is_omitted() {
        fn bad_plugin() -> crate::Result<Vec<MetricProvider>> {
            Err(app_err!("plugin exploded"))
        }

        let mut registry = MetricRegistry::with_builtins(WeightProfile::Reference, test_now());
        registry.add_plugin(bad_plugin);

        assert_eq!(registry.providers().len(), 6);
    }

    #[test]
    fn test_reset_restores_builtins() {
        let mut registry = MetricRegistry::with_builtins(WeightProfile::Reference, test_now());
        registry.register(MetricProvider::new("extra", 0.1, |_| Ok(1.0)));
        assert_eq!(registry.providers().len(), 7);

        registry.reset();
        assert_eq!(registry.providers().len(), 6);
    }

    #[test]
    fn test_weight_profile_parses_from_config_strings() {
        assert_eq!("reference".parse::<WeightProfile>().unwrap(), WeightProfile::Reference);
        assert_eq!("legacy".parse::<WeightProfile>().unwrap(), WeightProfile::Legacy);
    }
}
