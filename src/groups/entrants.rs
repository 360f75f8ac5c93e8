use std::collections::{BTreeMap, BTreeSet};

use super::normalize_code;

/// Airline codes that only count as new entrants within one scope (airport).
///
/// A code listed for `DUS` has no status at `FRA`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntrants {
    by_scope: BTreeMap<String, BTreeSet<String>>,
}

impl NewEntrants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `codes` to the entrant list of `scope`.
    pub fn insert<S: AsRef<str>>(&mut self, scope: &str, codes: impl IntoIterator<Item = S>) {
        let entry = self.by_scope.entry(normalize_code(scope)).or_default();
        entry.extend(
            codes
                .into_iter()
                .map(|c| normalize_code(c.as_ref()))
                .filter(|c| !c.is_empty()),
        );
    }

    pub fn with<S: AsRef<str>>(mut self, scope: &str, codes: impl IntoIterator<Item = S>) -> Self {
        self.insert(scope, codes);
        self
    }

    pub fn contains(&self, scope: &str, code: &str) -> bool {
        self.by_scope
            .get(&normalize_code(scope))
            .is_some_and(|codes| codes.contains(&normalize_code(code)))
    }

    /// Entrant codes for `scope`, in sorted order.
    pub fn codes(&self, scope: &str) -> impl Iterator<Item = &str> {
        self.by_scope
            .get(&normalize_code(scope))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_scope.values().all(BTreeSet::is_empty)
    }

    pub(super) fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        for (scope, codes) in self.by_scope.iter_mut() {
            codes.retain(|c| keep(scope, c));
        }
    }
}
