use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{AirlineGroup, NEW_ENTRANT_LABEL, NewEntrants, normalize_code};

/// A code claimed by more than one group.
///
/// `first` keeps the code; `second` is the claim that was discarded. `scope`
/// is set when the discarded claim was a scoped new-entrant listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub code: String,
    pub scope: Option<String>,
    pub first: String,
    pub second: String,
}

/// Static code -> group mapping plus the conflicts met while building it.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    code_to_group: HashMap<String, String>,
    conflicts: Vec<Conflict>,
}

impl ClassificationTable {
    pub fn group_of(&self, code: &str) -> Option<&str> {
        self.code_to_group
            .get(&normalize_code(code))
            .map(String::as_str)
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.code_to_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_group.is_empty()
    }
}

/// Folds `groups` in order into a [`ClassificationTable`].
///
/// The first group to list a code keeps it; every later listing becomes a
/// [`Conflict`].
pub fn build_classification(groups: &[AirlineGroup]) -> ClassificationTable {
    groups
        .iter()
        .flat_map(|g| g.codes.iter().map(move |code| (g.label.as_str(), code)))
        .fold(ClassificationTable::default(), |mut table, (label, code)| {
            let code = normalize_code(code);
            match table.code_to_group.get(&code) {
                Some(first) => {
                    let conflict = Conflict {
                        code,
                        scope: None,
                        first: first.clone(),
                        second: label.to_string(),
                    };
                    table.conflicts.push(conflict);
                }
                None => {
                    table.code_to_group.insert(code, label.to_string());
                }
            }
            table
        })
}

/// Outcome of classifying one airline code within one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Claimed by a static group, independent of scope.
    Static(&'a str),
    /// Listed as a new entrant for the scope and not claimed statically.
    NewEntrant,
    /// Neither. The observation is excluded from aggregation.
    Unclassified,
}

impl<'a> Classification<'a> {
    pub fn label(self) -> Option<&'a str> {
        match self {
            Classification::Static(label) => Some(label),
            Classification::NewEntrant => Some(NEW_ENTRANT_LABEL),
            Classification::Unclassified => None,
        }
    }
}

/// Maps an airline code seen in `scope` to a group label.
///
/// `None` means the observation does not belong to any group and must not be
/// counted in any group total.
pub trait GroupResolver {
    fn resolve<'a>(&'a self, code: &str, scope: &str) -> Option<&'a str>;

    /// Every label this resolver can return, in reporting order.
    fn labels(&self) -> Vec<String>;
}

/// Static groups plus scope-local new entrants.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: ClassificationTable,
    labels: Vec<String>,
    entrants: NewEntrants,
    entrant_conflicts: Vec<Conflict>,
}

impl Classifier {
    /// Builds the classification table from `groups` and drops every scoped
    /// entrant that a static group already claims, recording it as a conflict.
    pub fn new(groups: &[AirlineGroup], mut entrants: NewEntrants) -> Self {
        let table = build_classification(groups);

        let mut entrant_conflicts = Vec::new();
        entrants.retain(|scope, code| match table.group_of(code) {
            Some(first) => {
                entrant_conflicts.push(Conflict {
                    code: code.to_string(),
                    scope: Some(scope.to_string()),
                    first: first.to_string(),
                    second: NEW_ENTRANT_LABEL.to_string(),
                });
                false
            }
            None => true,
        });

        let mut labels: Vec<String> = Vec::with_capacity(groups.len() + 1);
        for group in groups {
            if !labels.contains(&group.label) {
                labels.push(group.label.clone());
            }
        }
        labels.push(NEW_ENTRANT_LABEL.to_string());

        debug!(
            codes = table.len(),
            groups = groups.len(),
            static_conflicts = table.conflicts().len(),
            entrant_conflicts = entrant_conflicts.len(),
            "Classification table built"
        );

        Self {
            table,
            labels,
            entrants,
            entrant_conflicts,
        }
    }

    pub fn classify(&self, code: &str, scope: &str) -> Classification<'_> {
        if let Some(label) = self.table.group_of(code) {
            return Classification::Static(label);
        }
        if self.entrants.contains(scope, code) {
            return Classification::NewEntrant;
        }
        Classification::Unclassified
    }

    pub fn entrants(&self) -> &NewEntrants {
        &self.entrants
    }

    /// Static conflicts followed by entrant conflicts.
    pub fn conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.table.conflicts().iter().chain(&self.entrant_conflicts)
    }

    /// Logs every conflict at `warn`.
    pub fn report_conflicts(&self) {
        for c in self.conflicts() {
            match &c.scope {
                Some(scope) => warn!(
                    code = %c.code,
                    scope = %scope,
                    kept = %c.first,
                    discarded = %c.second,
                    "New entrant already claimed by a static group"
                ),
                None => warn!(
                    code = %c.code,
                    kept = %c.first,
                    discarded = %c.second,
                    "Airline code listed in more than one group"
                ),
            }
        }
    }
}

impl GroupResolver for Classifier {
    fn resolve<'a>(&'a self, code: &str, scope: &str) -> Option<&'a str> {
        self.classify(code, scope).label()
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

/// Wraps a resolver so that unclassified codes land in an explicit bucket.
#[derive(Debug, Clone)]
pub struct WithFallback<R> {
    inner: R,
    fallback: String,
}

impl<R> WithFallback<R> {
    pub fn new(inner: R, fallback: impl Into<String>) -> Self {
        Self {
            inner,
            fallback: fallback.into(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: GroupResolver> GroupResolver for WithFallback<R> {
    fn resolve<'a>(&'a self, code: &str, scope: &str) -> Option<&'a str> {
        self.inner
            .resolve(code, scope)
            .or(Some(self.fallback.as_str()))
    }

    fn labels(&self) -> Vec<String> {
        let mut labels = self.inner.labels();
        labels.push(self.fallback.clone());
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<AirlineGroup> {
        vec![
            AirlineGroup::new("Incumbent", ["LH", "EW"]),
            AirlineGroup::new("Low Cost", ["FR", "lh"]),
            AirlineGroup::new("Insolvent", ["AB"]),
        ]
    }

    #[test]
    fn test_duplicate_code_records_one_conflict_and_first_wins() {
        let table = build_classification(&groups());

        assert_eq!(table.conflicts().len(), 1);
        let conflict = &table.conflicts()[0];
        assert_eq!(conflict.code, "LH");
        assert_eq!(conflict.first, "Incumbent");
        assert_eq!(conflict.second, "Low Cost");
        assert_eq!(conflict.scope, None);
        assert_eq!(table.group_of("LH"), Some("Incumbent"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = build_classification(&groups());
        assert_eq!(table.group_of(" fr "), Some("Low Cost"));
        assert_eq!(table.group_of("zz"), None);
    }

    #[test]
    fn test_static_outranks_new_entrant() {
        let entrants = NewEntrants::new().with("DUS", ["EW", "W6"]);
        let classifier = Classifier::new(&groups(), entrants);

        assert_eq!(classifier.classify("EW", "DUS"), Classification::Static("Incumbent"));
        assert_eq!(classifier.classify("W6", "DUS"), Classification::NewEntrant);
        // EW is not an entrant anywhere, and W6 only at DUS.
        assert_eq!(classifier.classify("EW", "FRA"), Classification::Static("Incumbent"));
        assert_eq!(classifier.classify("W6", "FRA"), Classification::Unclassified);
        assert!(!classifier.entrants().contains("DUS", "EW"));
    }

    #[test]
    fn test_entrant_conflict_is_reported_with_scope() {
        let entrants = NewEntrants::new().with("DUS", ["EW"]);
        let classifier = Classifier::new(&groups(), entrants);

        let entrant_conflicts: Vec<_> = classifier
            .conflicts()
            .filter(|c| c.scope.is_some())
            .collect();
        assert_eq!(entrant_conflicts.len(), 1);
        assert_eq!(entrant_conflicts[0].scope.as_deref(), Some("DUS"));
        assert_eq!(entrant_conflicts[0].first, "Incumbent");
        assert_eq!(entrant_conflicts[0].second, NEW_ENTRANT_LABEL);
    }

    #[test]
    fn test_resolver_labels_include_new_entrants_once() {
        let classifier = Classifier::new(&groups(), NewEntrants::new());
        assert_eq!(
            classifier.labels(),
            vec!["Incumbent", "Low Cost", "Insolvent", NEW_ENTRANT_LABEL]
        );
        assert_eq!(classifier.resolve("xx", "DUS"), None);
    }

    #[test]
    fn test_fallback_bucket() {
        let resolver = WithFallback::new(Classifier::new(&groups(), NewEntrants::new()), "OTHER");
        assert_eq!(resolver.resolve("AB", "TXL"), Some("Insolvent"));
        assert_eq!(resolver.resolve("U2", "TXL"), Some("OTHER"));
        assert_eq!(resolver.labels().last().map(String::as_str), Some("OTHER"));
    }
}
