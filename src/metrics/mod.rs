//! Weighted metric providers and the scoring engine
//!
//! # Implementation Model
//!
//! The core abstraction is the [`MetricProvider`] type: a named, weighted
//! scoring function from a repository record to a value conventionally in
//! [0, 1] (the stars transform is the deliberate exception). Providers live
//! in an explicit [`MetricRegistry`] passed into the scoring engine; there is
//! no module-level singleton, and `reset()` gives tests a clean slate.
//!
//! The built-in providers implement the canonical scoring formula. Two weight
//! vectors exist historically; they are kept apart as named
//! [`WeightProfile`]s rather than silently reconciled.
//!
//! A provider that fails contributes 0.0 to the weighted sum. One bad metric
//! must never abort scoring of a repository, so per-provider evaluation
//! results are captured as a [`MetricOutcome`] rather than propagated.

pub mod providers;

mod registry;
mod scoring;

pub use registry::{MetricPlugin, MetricProvider, MetricRegistry, WeightProfile};
pub use scoring::{MetricContribution, MetricOutcome, ScoreBreakdown, round2, score};
