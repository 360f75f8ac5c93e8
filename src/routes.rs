//! Route endpoint resolution against focus airports and focus regions.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::groups::normalize_code;

/// Collapses raw region labels into canonical ones before comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionPolicy {
    merges: BTreeMap<String, String>,
}

impl RegionPolicy {
    /// Maps every label in `raw` onto `canonical`.
    pub fn merge<S: AsRef<str>>(mut self, raw: impl IntoIterator<Item = S>, canonical: &str) -> Self {
        let canonical = normalize_region_label(canonical);
        for label in raw {
            self.merges
                .insert(normalize_region_label(label.as_ref()), canonical.clone());
        }
        self
    }

    /// Trimmed, upper-cased and merged form of `raw`.
    pub fn normalize(&self, raw: &str) -> String {
        let label = normalize_region_label(raw);
        self.merges.get(&label).cloned().unwrap_or(label)
    }
}

fn normalize_region_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One end of a route: a focus airport or a focus region.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Airport(String),
    Region(String),
}

impl Endpoint {
    pub fn as_str(&self) -> &str {
        match self {
            Endpoint::Airport(code) => code,
            Endpoint::Region(name) => name,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed route between two resolved endpoints, shown as `ORIGIN->DESTINATION`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey {
    pub origin: Endpoint,
    pub destination: Endpoint,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

/// Resolves an endpoint to a focus airport or, failing that, a focus region.
///
/// `region_name` must already be normalized. The airport match wins when
/// both qualify. `None` means the endpoint is out of scope.
pub fn resolve_endpoint(
    airport_code: Option<&str>,
    region_name: Option<&str>,
    focus_airports: &BTreeSet<String>,
    focus_regions: &BTreeSet<String>,
) -> Option<Endpoint> {
    let airport = airport_code
        .map(normalize_code)
        .filter(|code| focus_airports.contains(code));
    if let Some(code) = airport {
        return Some(Endpoint::Airport(code));
    }

    region_name
        .filter(|r| focus_regions.contains(*r))
        .map(|r| Endpoint::Region(r.to_string()))
}

/// Focus sets plus the region policy they were normalized with.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    policy: RegionPolicy,
    focus_airports: BTreeSet<String>,
    focus_regions: BTreeSet<String>,
}

impl EndpointResolver {
    pub fn new<A, R>(
        policy: RegionPolicy,
        airports: impl IntoIterator<Item = A>,
        regions: impl IntoIterator<Item = R>,
    ) -> Self
    where
        A: AsRef<str>,
        R: AsRef<str>,
    {
        let focus_airports = airports
            .into_iter()
            .map(|a| normalize_code(a.as_ref()))
            .collect();
        let focus_regions = regions
            .into_iter()
            .map(|r| policy.normalize(r.as_ref()))
            .collect();
        Self {
            policy,
            focus_airports,
            focus_regions,
        }
    }

    pub fn normalize_region(&self, raw: &str) -> String {
        self.policy.normalize(raw)
    }

    pub fn is_focus_airport(&self, code: &str) -> bool {
        self.focus_airports.contains(&normalize_code(code))
    }

    /// Normalized region if it is a focus region.
    pub fn focus_region(&self, raw: &str) -> Option<String> {
        let region = self.policy.normalize(raw);
        self.focus_regions.contains(&region).then_some(region)
    }

    pub fn focus_regions(&self) -> impl Iterator<Item = &str> {
        self.focus_regions.iter().map(String::as_str)
    }

    /// Resolves a raw airport/region pair, normalizing the region first.
    pub fn resolve(&self, airport_code: Option<&str>, raw_region: Option<&str>) -> Option<Endpoint> {
        let region = raw_region.map(|r| self.policy.normalize(r));
        resolve_endpoint(
            airport_code,
            region.as_deref(),
            &self.focus_airports,
            &self.focus_regions,
        )
    }

    /// Resolves both ends of a flight; `None` unless both are in scope.
    pub fn route(
        &self,
        origin: (Option<&str>, Option<&str>),
        destination: (Option<&str>, Option<&str>),
    ) -> Option<RouteKey> {
        Some(RouteKey {
            origin: self.resolve(origin.0, origin.1)?,
            destination: self.resolve(destination.0, destination.1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> EndpointResolver {
        let policy = RegionPolicy::default().merge(["GULF", "MIDDLE EAST"], "GULF/MIDDLE EAST");
        EndpointResolver::new(
            policy,
            ["DUS", "FRA", "TXL"],
            ["WESTERN EUROPE", "GULF", "MIDDLE EAST"],
        )
    }

    #[test]
    fn test_region_merge() {
        let r = resolver();
        assert_eq!(r.normalize_region(" middle east"), "GULF/MIDDLE EAST");
        assert_eq!(r.normalize_region("Gulf"), "GULF/MIDDLE EAST");
        assert_eq!(r.normalize_region("North Africa"), "NORTH AFRICA");
        assert_eq!(r.focus_regions().collect::<Vec<_>>(), vec!["GULF/MIDDLE EAST", "WESTERN EUROPE"]);
    }

    #[test]
    fn test_airport_wins_over_region() {
        let r = resolver();
        assert_eq!(
            r.resolve(Some("dus"), Some("Western Europe")),
            Some(Endpoint::Airport("DUS".into()))
        );
    }

    #[test]
    fn test_region_when_airport_not_focused() {
        let r = resolver();
        assert_eq!(
            r.resolve(Some("DXB"), Some("Gulf")),
            Some(Endpoint::Region("GULF/MIDDLE EAST".into()))
        );
        assert_eq!(r.resolve(Some("JFK"), Some("North America")), None);
        assert_eq!(r.resolve(None, None), None);
    }

    #[test]
    fn test_route_requires_both_ends() {
        let r = resolver();
        let route = r
            .route((Some("TXL"), Some("WESTERN EUROPE")), (Some("PMI"), Some("Western Europe")))
            .unwrap();
        assert_eq!(route.to_string(), "TXL->WESTERN EUROPE");
        assert!(r.route((Some("TXL"), None), (Some("JFK"), Some("NORTH AMERICA"))).is_none());
    }

    #[test]
    fn test_resolve_endpoint_free_function() {
        let airports: BTreeSet<String> = ["MUC".to_string()].into();
        let regions: BTreeSet<String> = ["EASTERN EUROPE".to_string()].into();
        assert_eq!(
            resolve_endpoint(Some("muc"), Some("EASTERN EUROPE"), &airports, &regions),
            Some(Endpoint::Airport("MUC".into()))
        );
        assert_eq!(
            resolve_endpoint(Some("WAW"), Some("EASTERN EUROPE"), &airports, &regions),
            Some(Endpoint::Region("EASTERN EUROPE".into()))
        );
    }
}
