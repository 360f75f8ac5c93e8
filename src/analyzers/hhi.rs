//! Herfindahl-Hirschman Index over group market shares.
//!
//! Shares carry their unit in the type. [`Percent`] is on the 0-100 scale and
//! contributes `share²`; [`Fraction`] is on the 0-1 scale and contributes
//! `share² × 10000`. Both give an index on the 0-10000 scale.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::analyzers::aggregate::Measure;
use crate::analyzers::concentration::{Concentration, classify};

/// Upper bound of the index, a single firm holding the whole market.
pub const HHI_MAX: f64 = 10_000.0;

/// A market share with a fixed unit.
pub trait Share: Copy {
    /// This share's term of the index, on the 0-10000 scale.
    fn hhi_term(self) -> f64;
}

/// Share on the 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percent(pub f64);

/// Share on the 0-1 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Fraction(pub f64);

impl Share for Percent {
    fn hhi_term(self) -> f64 {
        self.0 * self.0
    }
}

impl Share for Fraction {
    fn hhi_term(self) -> f64 {
        self.0 * self.0 * HHI_MAX
    }
}

impl From<Fraction> for Percent {
    fn from(f: Fraction) -> Self {
        Percent(f.0 * 100.0)
    }
}

/// Sum of the shares' index terms.
pub fn compute_hhi<'a, S: Share + 'a>(shares: impl IntoIterator<Item = &'a S>) -> f64 {
    shares.into_iter().map(|s| s.hhi_term()).sum()
}

/// Each group's term of the index.
pub fn contributions<S: Share>(shares: &BTreeMap<String, S>) -> BTreeMap<String, f64> {
    shares
        .iter()
        .map(|(group, s)| (group.clone(), s.hhi_term()))
        .collect()
}

/// Each group's total divided by the sum of all totals.
///
/// A zero (or negative) market total yields zero shares rather than a
/// division by zero.
pub fn shares_from_totals<V: Measure>(totals: &BTreeMap<String, V>) -> BTreeMap<String, Fraction> {
    let market: f64 = totals.values().map(|v| v.to_f64()).sum();
    totals
        .iter()
        .map(|(group, v)| {
            let share = if market > 0.0 { v.to_f64() / market } else { 0.0 };
            (group.clone(), Fraction(share))
        })
        .collect()
}

/// Index and tier for one market-period. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HhiRecord {
    hhi: f64,
    classification: Concentration,
}

impl HhiRecord {
    /// Clamps `hhi` into `[0, 10000]` before classifying it. Only share inputs
    /// that sum past 100% can push the raw value out of range.
    pub fn new(hhi: f64) -> Self {
        let clamped = if hhi.is_nan() { 0.0 } else { hhi.clamp(0.0, HHI_MAX) };
        if clamped != hhi {
            warn!(raw = hhi, clamped, "HHI outside [0, 10000], clamped");
        }
        Self {
            hhi: clamped,
            classification: classify(clamped),
        }
    }

    pub fn from_shares<'a, S: Share + 'a>(shares: impl IntoIterator<Item = &'a S>) -> Self {
        Self::new(compute_hhi(shares))
    }

    pub fn hhi(&self) -> f64 {
        self.hhi
    }

    pub fn classification(&self) -> Concentration {
        self.classification
    }
}
