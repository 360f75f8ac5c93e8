//! Airline-to-cohort classification.
//!
//! [`AirlineGroup`] is a static membership list. [`build_classification`]
//! folds an ordered list of groups into a [`ClassificationTable`], recording a
//! [`Conflict`] whenever a later group claims an already-claimed code.
//! [`Classifier`] combines that table with airport-scoped [`NewEntrants`] and
//! is the [`GroupResolver`] the aggregator runs against.

mod classifier;
mod entrants;
pub mod tables;

pub use classifier::{
    Classification, ClassificationTable, Classifier, Conflict, GroupResolver, WithFallback,
    build_classification,
};
pub use entrants::NewEntrants;

use serde::Deserialize;

/// Label under which scoped new entrants are aggregated.
pub const NEW_ENTRANT_LABEL: &str = "New Entrants";

/// Canonical form of an airline or airport code: trimmed and upper-cased.
///
/// Applied at every boundary where codes enter the crate.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A named competitive cohort with a fixed set of airline codes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AirlineGroup {
    pub label: String,
    pub codes: Vec<String>,
}

impl AirlineGroup {
    /// Builds a group, normalizing every code and skipping blank ones.
    pub fn new<S: AsRef<str>>(label: impl Into<String>, codes: impl IntoIterator<Item = S>) -> Self {
        Self {
            label: label.into(),
            codes: codes
                .into_iter()
                .map(|c| normalize_code(c.as_ref()))
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Re-applies code normalization, for groups that came in through serde.
    pub fn normalized(self) -> Self {
        Self::new(self.label, self.codes)
    }
}
