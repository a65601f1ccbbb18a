use super::registry::MetricRegistry;
use crate::model::RepoRecord;

const LOG_TARGET: &str = "scoring";

/// Result of evaluating one provider against one record.
///
/// Faults are captured rather than propagated so a single misbehaving metric
/// cannot abort scoring of a repository; a faulted provider contributes 0.0.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Value(f64),
    Fault(String),
}

/// One provider's weighted contribution to a score.
#[derive(Debug, Clone)]
pub struct MetricContribution {
    pub name: String,
    pub weight: f64,
    pub outcome: MetricOutcome,
}

impl MetricContribution {
    /// The raw metric value, with faults substituted by 0.0.
    #[must_use]
    pub fn value(&self) -> f64 {
        match &self.outcome {
            MetricOutcome::Value(v) => *v,
            MetricOutcome::Fault(_) => 0.0,
        }
    }
}

/// A composite score with its per-provider breakdown.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    /// `round(100 × Σ weightᵢ × valueᵢ, 2)`.
    pub score: f64,
    pub contributions: Vec<MetricContribution>,
}

impl ScoreBreakdown {
    /// Look up a sub-metric value by provider name.
    #[must_use]
    pub fn sub_metric(&self, name: &str) -> Option<f64> {
        self.contributions.iter().find(|c| c.name == name).map(MetricContribution::value)
    }
}

/// Round to 2 decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the composite score for one record.
///
/// Pure with respect to the record and registry state: evaluates every
/// registered provider in registration order, substitutes 0.0 for faults
/// (logged at debug level, never propagated), accumulates the weighted sum,
/// and rounds the 100-scaled result to 2 decimal places.
pub fn score(registry: &mut MetricRegistry, record: &RepoRecord) -> ScoreBreakdown {
    let mut contributions = Vec::new();
    let mut sum = 0.0;

    for provider in registry.providers() {
        let outcome = match provider.evaluate(record) {
            Ok(value) => {
                sum += provider.weight() * value;
                MetricOutcome::Value(value)
            }
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Metric '{}' faulted for '{}', contributing 0.0: {e:#}", provider.name(), record.identity_key());
                MetricOutcome::Fault(e.to_string())
            }
        };

        contributions.push(MetricContribution {
            name: provider.name().to_string(),
            weight: provider.weight(),
            outcome,
        });
    }

    ScoreBreakdown {
        score: round2(100.0 * sum),
        contributions,
    }
}
