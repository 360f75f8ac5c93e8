use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::ops::AddAssign;

use crate::analyzers::utility::pct;
use crate::groups::{GroupResolver, normalize_code};

/// A summable observation value: departures (`i64`) or share percentages (`f64`).
pub trait Measure: Copy + Default + AddAssign + PartialEq + Debug {
    fn to_f64(self) -> f64;
}

impl Measure for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Measure for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// One raw per-airline row that can be classified and summed.
pub trait Observed {
    type Value: Measure;

    fn airline(&self) -> &str;

    /// Scope the airline is classified in (the airport new-entrant lists refer to).
    fn scope(&self) -> &str;

    fn value(&self) -> Self::Value;
}

/// Summed values per aggregation key and group label.
///
/// Keys and labels iterate in sorted order. Lookups of a key or group that
/// never received a value return an explicit zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotals<K, V> {
    totals: BTreeMap<K, BTreeMap<String, V>>,
}

impl<K, V> Default for GroupTotals<K, V> {
    fn default() -> Self {
        Self {
            totals: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V: Measure> GroupTotals<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, group: &str, value: V) {
        let groups = self.totals.entry(key).or_default();
        match groups.get_mut(group) {
            Some(total) => *total += value,
            None => {
                groups.insert(group.to_string(), value);
            }
        }
    }

    pub fn total(&self, key: &K, group: &str) -> V {
        self.totals
            .get(key)
            .and_then(|groups| groups.get(group))
            .copied()
            .unwrap_or_default()
    }

    /// Sum over every group under `key`.
    pub fn key_total(&self, key: &K) -> V {
        let mut sum = V::default();
        for v in self.totals.get(key).into_iter().flat_map(BTreeMap::values) {
            sum += *v;
        }
        sum
    }

    pub fn groups(&self, key: &K) -> Option<&BTreeMap<String, V>> {
        self.totals.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.totals.keys()
    }

    /// Inserts zero totals for every `(key, label)` pair not yet present.
    pub fn fill_groups<S: AsRef<str>>(&mut self, keys: impl IntoIterator<Item = K>, labels: &[S]) {
        for key in keys {
            let groups = self.totals.entry(key).or_default();
            for label in labels {
                groups.entry(label.as_ref().to_string()).or_default();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl<K, V> IntoIterator for GroupTotals<K, V> {
    type Item = (K, BTreeMap<String, V>);
    type IntoIter = std::collections::btree_map::IntoIter<K, BTreeMap<String, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.into_iter()
    }
}

/// Row accounting for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub unclassified: BTreeSet<String>,
}

impl Diagnostics {
    pub fn classified_rows(&self) -> usize {
        self.total_rows - self.dropped_rows
    }

    /// Dropped rows as a percentage of all rows.
    pub fn drop_pct(&self) -> f64 {
        pct(self.dropped_rows, self.total_rows)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.total_rows += other.total_rows;
        self.dropped_rows += other.dropped_rows;
        self.unclassified.extend(other.unclassified);
    }
}

/// Output of [`aggregate`].
#[derive(Debug, Clone)]
pub struct Aggregation<K, V> {
    pub totals: GroupTotals<K, V>,
    pub diagnostics: Diagnostics,
}

/// Sums observation values per `key_fn(observation)` and resolved group.
///
/// Observations the resolver cannot place in a group are left out of every
/// total and counted in [`Diagnostics`] instead.
pub fn aggregate<'o, O, K, R, F>(
    observations: impl IntoIterator<Item = &'o O>,
    resolver: &R,
    key_fn: F,
) -> Aggregation<K, O::Value>
where
    O: Observed + 'o,
    K: Ord,
    R: GroupResolver + ?Sized,
    F: Fn(&O) -> K,
{
    let mut totals = GroupTotals::new();
    let mut diagnostics = Diagnostics::default();

    for obs in observations {
        diagnostics.total_rows += 1;

        match resolver.resolve(obs.airline(), obs.scope()) {
            Some(group) => totals.add(key_fn(obs), group, obs.value()),
            None => {
                diagnostics.dropped_rows += 1;
                diagnostics.unclassified.insert(normalize_code(obs.airline()));
            }
        }
    }

    Aggregation {
        totals,
        diagnostics,
    }
}
