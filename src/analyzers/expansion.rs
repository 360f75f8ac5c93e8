//! Lufthansa capacity on the routes Air Berlin served.
//!
//! Both route ends resolve flexibly: a focus airport if the flight touches
//! one, otherwise a focus region. Every airline outside the two tracked
//! groups counts toward an explicit fallback bucket.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

use crate::analyzers::aggregate::{Diagnostics, Observed, aggregate};
use crate::analyzers::types::{AbRouteFrequency, ExpansionRow, Flight};
use crate::analyzers::utility::round_to;
use crate::groups::GroupResolver;
use crate::routes::{EndpointResolver, RouteKey};

/// Bucket for every airline outside the tracked groups.
pub const OTHER_LABEL: &str = "OTHER";

/// Labels the expansion compares.
#[derive(Debug, Clone)]
pub struct TrackedGroups {
    /// The group that left the market.
    pub exiting: String,
    /// The group whose growth is measured.
    pub expanding: String,
}

struct RoutedFlight<'f> {
    route: RouteKey,
    year: i32,
    flight: &'f Flight,
}

impl Observed for RoutedFlight<'_> {
    type Value = i64;

    fn airline(&self) -> &str {
        &self.flight.airline
    }

    fn scope(&self) -> &str {
        self.flight.scope()
    }

    fn value(&self) -> i64 {
        self.flight.departures
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    /// Exiting-group departures for every year of every route it served.
    pub frequencies: Vec<AbRouteFrequency>,
    pub expansion: Vec<ExpansionRow>,
    pub diagnostics: Diagnostics,
    /// Routes with any departures, whoever flew them.
    pub routes_seen: usize,
}

/// Year-over-year change of `current` against `previous`.
///
/// The percentage is absent without a previous value or when it was zero.
fn year_over_year(previous: Option<i64>, current: i64) -> (Option<i64>, Option<f64>) {
    match previous {
        None => (None, None),
        Some(prev) => {
            let delta = current - prev;
            let pct = (prev != 0).then(|| round_to(delta as f64 / prev as f64 * 100.0, 2));
            (Some(delta), pct)
        }
    }
}

/// Builds the frequency and expansion tables from `flights`.
///
/// Flights without a year, or outside `years` when it is non-empty, are
/// skipped, as are flights with an endpoint outside the focus sets. Rows are
/// ordered by route, then year.
#[instrument(skip_all, fields(rows = flights.len()))]
pub fn expansion<R: GroupResolver>(
    flights: &[Flight],
    resolver: &R,
    endpoints: &EndpointResolver,
    tracked: &TrackedGroups,
    years: &BTreeSet<i32>,
) -> ExpansionReport {
    let routed: Vec<RoutedFlight<'_>> = flights
        .iter()
        .filter_map(|flight| {
            let year = flight.year.filter(|y| years.is_empty() || years.contains(y))?;
            let route = endpoints.route(
                (
                    flight.origin_airport.as_deref(),
                    flight.origin_region.as_deref(),
                ),
                (
                    flight.destination_airport.as_deref(),
                    flight.destination_region.as_deref(),
                ),
            )?;
            Some(RoutedFlight {
                route,
                year,
                flight,
            })
        })
        .collect();

    let agg = aggregate(&routed, resolver, |f| (f.route.clone(), f.year));

    let mut by_route: BTreeMap<&RouteKey, Vec<(i32, i64, i64)>> = BTreeMap::new();
    for (route, year) in agg.totals.keys() {
        let key = (route.clone(), *year);
        by_route.entry(route).or_default().push((
            *year,
            agg.totals.total(&key, &tracked.exiting),
            agg.totals.total(&key, &tracked.expanding),
        ));
    }
    let routes_seen = by_route.len();

    let mut frequencies = Vec::new();
    let mut expansion = Vec::new();
    for (route, series) in by_route {
        if series.iter().all(|(_, exiting, _)| *exiting <= 0) {
            continue;
        }

        let mut previous = None;
        for (year, exiting, expanding) in series {
            frequencies.push(AbRouteFrequency {
                year,
                origin: route.origin.to_string(),
                destination: route.destination.to_string(),
                route: route.to_string(),
                ab_departures: exiting,
            });

            let (lh_delta, lh_pct_change) = year_over_year(previous, expanding);
            expansion.push(ExpansionRow {
                year,
                origin: route.origin.to_string(),
                destination: route.destination.to_string(),
                route: route.to_string(),
                ab_departures: exiting,
                lh_departures: expanding,
                lh_delta,
                lh_pct_change,
            });
            previous = Some(expanding);
        }
    }

    let served: BTreeSet<&str> = frequencies.iter().map(|f| f.route.as_str()).collect();
    info!(
        in_scope = routed.len(),
        routes = routes_seen,
        exiting_routes = served.len(),
        "Expansion routes resolved"
    );

    ExpansionReport {
        frequencies,
        expansion,
        diagnostics: agg.diagnostics,
        routes_seen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{AirlineGroup, Classifier, NewEntrants, WithFallback};
    use crate::routes::RegionPolicy;

    fn flight(year: i32, origin: &str, destination: &str, region: &str, airline: &str, departures: i64) -> Flight {
        Flight {
            year: Some(year),
            month: Some(1),
            origin_airport: Some(origin.into()),
            origin_region: Some("WESTERN EUROPE".into()),
            destination_airport: Some(destination.into()),
            destination_region: Some(region.into()),
            airline: airline.into(),
            departures,
        }
    }

    fn setup() -> (WithFallback<Classifier>, EndpointResolver, TrackedGroups) {
        let groups = vec![
            AirlineGroup::new("Air Berlin Group", ["AB", "HG"]),
            AirlineGroup::new("Lufthansa Group", ["LH", "EW"]),
        ];
        let resolver = WithFallback::new(Classifier::new(&groups, NewEntrants::new()), OTHER_LABEL);
        let endpoints = EndpointResolver::new(
            RegionPolicy::default().merge(["GULF", "MIDDLE EAST"], "GULF/MIDDLE EAST"),
            ["DUS", "TXL"],
            ["WESTERN EUROPE", "GULF/MIDDLE EAST"],
        );
        let tracked = TrackedGroups {
            exiting: "Air Berlin Group".into(),
            expanding: "Lufthansa Group".into(),
        };
        (resolver, endpoints, tracked)
    }

    #[test]
    fn test_year_over_year() {
        assert_eq!(year_over_year(None, 50), (None, None));
        assert_eq!(year_over_year(Some(0), 30), (Some(30), None));
        assert_eq!(year_over_year(Some(50), 120), (Some(70), Some(140.0)));
        assert_eq!(year_over_year(Some(3), 2), (Some(-1), Some(-33.33)));
    }

    #[test]
    fn test_expansion_on_exiting_routes_only() {
        let (resolver, endpoints, tracked) = setup();
        let flights = vec![
            flight(2016, "DUS", "PMI", "Western Europe", "AB", 100),
            flight(2016, "DUS", "PMI", "Western Europe", "LH", 50),
            flight(2017, "DUS", "BCN", "western europe", "HG", 40),
            flight(2017, "DUS", "PMI", "Western Europe", "EW", 50),
            flight(2018, "DUS", "PMI", "Western Europe", "LH", 120),
            flight(2018, "DUS", "PMI", "Western Europe", "FR", 80),
            // only the expanding group flies here
            flight(2017, "TXL", "DUS", "Western Europe", "LH", 300),
            // out of scope destination
            flight(2017, "DUS", "JFK", "North America", "AB", 10),
        ];

        let report = expansion(&flights, &resolver, &endpoints, &tracked, &BTreeSet::new());

        assert_eq!(report.routes_seen, 2);
        assert_eq!(report.frequencies.len(), 3);
        assert!(report.frequencies.iter().all(|f| f.route == "DUS->WESTERN EUROPE"));
        assert_eq!(
            report.frequencies.iter().map(|f| f.ab_departures).collect::<Vec<_>>(),
            vec![100, 40, 0]
        );

        let rows = &report.expansion;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].lh_departures, 50);
        assert_eq!(rows[0].lh_delta, None);
        assert_eq!(rows[1].lh_delta, Some(0));
        assert_eq!(rows[1].lh_pct_change, Some(0.0));
        assert_eq!(rows[2].lh_delta, Some(70));
        assert_eq!(rows[2].lh_pct_change, Some(140.0));

        assert_eq!(report.diagnostics.dropped_rows, 0);
    }

    #[test]
    fn test_airport_endpoint_wins_and_years_filter() {
        let (resolver, endpoints, tracked) = setup();
        let flights = vec![
            flight(2016, "DUS", "TXL", "Western Europe", "AB", 10),
            flight(2017, "DUS", "TXL", "Western Europe", "AB", 20),
            Flight {
                year: None,
                ..flight(2017, "DUS", "TXL", "Western Europe", "AB", 20)
            },
        ];

        let report = expansion(&flights, &resolver, &endpoints, &tracked, &[2017].into());
        assert_eq!(report.frequencies.len(), 1);
        assert_eq!(report.frequencies[0].route, "DUS->TXL");
        assert_eq!(report.frequencies[0].ab_departures, 20);
    }
}
