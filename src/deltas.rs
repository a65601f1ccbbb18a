//! Field-wise deltas between the current record and the previous snapshot
//!
//! A delta is either a signed numeric difference or the `+new` sentinel for
//! repositories with no baseline in the previous snapshot. The sentinel is a
//! user-visible distinction: a repository with zero change renders an empty
//! cell, while a repository seen for the first time renders `+new`.
//!
//! Deltas are recomputed on every ranking run and embedded into the record's
//! `*_delta` fields before the collection is written; they are never
//! persisted independently.

use core::fmt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel string used when no previous record exists for a key.
pub const NEW_SENTINEL: &str = "+new";

/// A per-field difference against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    /// No previous record existed for this repository.
    New,

    /// Signed integer difference (stars, forks, closed issues).
    Int(i64),

    /// Signed float difference (score), rounded to 2 decimal places.
    Float(f64),
}

impl Delta {
    /// Format for table cells: empty for exact zero, sign-prefixed otherwise,
    /// floats with trailing zeros trimmed (`+1.2`, not `+1.20`).
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::New => NEW_SENTINEL.to_string(),
            Self::Int(0) => String::new(),
            Self::Int(n) => format!("{n:+}"),
            Self::Float(f) if *f == 0.0 => String::new(),
            Self::Float(f) => {
                let formatted = format!("{f:+.2}");
                formatted.trim_end_matches('0').trim_end_matches('.').to_string()
            }
        }
    }
}

/// Delta of an unsigned counter field (stars, forks, closed issues).
#[must_use]
pub fn count_delta(previous: Option<u64>, current: u64) -> Delta {
    match previous {
        None => Delta::New,
        #[expect(clippy::cast_possible_wrap, reason = "star counts are far below i64::MAX")]
        Some(prev) => Delta::Int(current as i64 - prev as i64),
    }
}

/// Delta of the composite score, rounded to 2 decimal places.
#[must_use]
pub fn score_delta(previous: Option<f64>, current: f64) -> Delta {
    match previous {
        None => Delta::New,
        Some(prev) => Delta::Float(((current - prev) * 100.0).round() / 100.0),
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::New => serializer.serialize_str(NEW_SENTINEL),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeltaVisitor;

        impl Visitor<'_> for DeltaVisitor {
            type Value = Delta;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a number or the string \"+new\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Delta, E> {
                if v == NEW_SENTINEL {
                    Ok(Delta::New)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Delta, E> {
                Ok(Delta::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Delta, E> {
                i64::try_from(v)
                    .map(Delta::Int)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Delta, E> {
                Ok(Delta::Float(v))
            }
        }

        deserializer.deserialize_any(DeltaVisitor)
    }
}
