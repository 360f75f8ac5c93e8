//! Route-level HHI: origin airport to destination region, per year.
//!
//! Only summer-season flights from a focus airport into a focus region count.
//! Shares are departures over the market's classified departures, so the
//! index uses the fraction convention.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

use crate::analyzers::aggregate::{Diagnostics, Observed, aggregate};
use crate::analyzers::hhi::{Fraction, HhiRecord, contributions, shares_from_totals};
use crate::analyzers::types::{Flight, MarketShareRow, RouteHhiRow};
use crate::analyzers::utility::{Summary, round_to};
use crate::groups::GroupResolver;
use crate::output::Table;
use crate::routes::{Endpoint, EndpointResolver, RouteKey};

/// Which schedule rows enter the route analysis.
#[derive(Debug, Clone, Default)]
pub struct MarketFilter {
    pub months: BTreeSet<u32>,
    /// Empty means every year.
    pub years: BTreeSet<i32>,
}

impl MarketFilter {
    fn admits_period(&self, year: Option<i32>, month: Option<u32>) -> Option<i32> {
        let month = month?;
        let year = year?;
        if !self.months.contains(&month) {
            return None;
        }
        if !self.years.is_empty() && !self.years.contains(&year) {
            return None;
        }
        Some(year)
    }
}

/// One origin airport -> destination region market in one year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteMarket {
    pub route: RouteKey,
    pub year: i32,
}

impl RouteMarket {
    pub fn origin(&self) -> &str {
        self.route.origin.as_str()
    }

    pub fn region(&self) -> &str {
        self.route.destination.as_str()
    }
}

struct MarketFlight<'f> {
    market: RouteMarket,
    flight: &'f Flight,
}

impl Observed for MarketFlight<'_> {
    type Value = i64;

    fn airline(&self) -> &str {
        &self.flight.airline
    }

    fn scope(&self) -> &str {
        self.market.origin()
    }

    fn value(&self) -> i64 {
        self.flight.departures
    }
}

/// Group departures, shares and index for one market.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketHhi {
    pub market: RouteMarket,
    pub departures: BTreeMap<String, i64>,
    pub shares: BTreeMap<String, Fraction>,
    pub record: HhiRecord,
}

impl MarketHhi {
    pub fn market_departures(&self) -> i64 {
        self.departures.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteSummary {
    pub overall: Summary,
    pub by_year: BTreeMap<i32, Summary>,
    pub by_airport: BTreeMap<String, Summary>,
    pub by_region: BTreeMap<String, Summary>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteHhiReport {
    pub markets: Vec<MarketHhi>,
    pub diagnostics: Diagnostics,
    /// Rows that passed the period and scope filters, before classification.
    pub in_scope_rows: usize,
}

impl RouteHhiReport {
    pub fn hhi_rows(&self) -> Vec<RouteHhiRow> {
        self.markets
            .iter()
            .map(|m| RouteHhiRow {
                origin: m.market.origin().to_string(),
                region: m.market.region().to_string(),
                year: m.market.year,
                route: m.market.route.to_string(),
                hhi: round_to(m.record.hhi(), 4),
                classification: m.record.classification(),
            })
            .collect()
    }

    pub fn market_share_rows(&self) -> Vec<MarketShareRow> {
        let mut rows = Vec::new();
        for m in &self.markets {
            let market_departures = m.market_departures();
            let parts = contributions(&m.shares);
            for (group, departures) in &m.departures {
                rows.push(MarketShareRow {
                    origin: m.market.origin().to_string(),
                    region: m.market.region().to_string(),
                    year: m.market.year,
                    route: m.market.route.to_string(),
                    group: group.clone(),
                    departures: *departures,
                    market_departures,
                    share: round_to(m.shares.get(group).map_or(0.0, |s| s.0), 6),
                    contribution: round_to(parts.get(group).copied().unwrap_or_default(), 4),
                });
            }
        }
        rows
    }

    /// Routes by year, zero where a route has no market that year.
    pub fn pivot(&self) -> Table {
        let years: BTreeSet<i32> = self.markets.iter().map(|m| m.market.year).collect();
        let mut by_route: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
        for m in &self.markets {
            by_route
                .entry(m.market.route.to_string())
                .or_default()
                .insert(m.market.year, m.record.hhi());
        }

        let mut table = Table::new(
            std::iter::once("Route".to_string()).chain(years.iter().map(i32::to_string)),
        );
        for (route, values) in by_route {
            let mut row = vec![route];
            row.extend(years.iter().map(|y| {
                round_to(values.get(y).copied().unwrap_or_default(), 4).to_string()
            }));
            table.push(row);
        }
        table
    }

    /// Departures and share per group, one column pair per group.
    pub fn detailed(&self) -> Table {
        let groups: BTreeSet<&str> = self
            .markets
            .iter()
            .flat_map(|m| m.departures.keys().map(String::as_str))
            .collect();

        let mut header: Vec<String> = ["Origin Airport", "Destination Region", "Year", "Route"]
            .map(String::from)
            .to_vec();
        for g in &groups {
            header.push(format!("{g}_Departures"));
        }
        for g in &groups {
            header.push(format!("{g}_Market_Share"));
        }

        let mut table = Table::new(header);
        for m in &self.markets {
            let mut row = vec![
                m.market.origin().to_string(),
                m.market.region().to_string(),
                m.market.year.to_string(),
                m.market.route.to_string(),
            ];
            row.extend(
                groups
                    .iter()
                    .map(|g| m.departures.get(*g).copied().unwrap_or_default().to_string()),
            );
            row.extend(groups.iter().map(|g| {
                round_to(m.shares.get(*g).map_or(0.0, |s| s.0), 6).to_string()
            }));
            table.push(row);
        }
        table
    }

    pub fn summary(&self) -> RouteSummary {
        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        let mut by_airport: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut by_region: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut all = Vec::with_capacity(self.markets.len());

        for m in &self.markets {
            let hhi = m.record.hhi();
            all.push(hhi);
            by_year.entry(m.market.year).or_default().push(hhi);
            by_airport
                .entry(m.market.origin().to_string())
                .or_default()
                .push(hhi);
            by_region
                .entry(m.market.region().to_string())
                .or_default()
                .push(hhi);
        }

        RouteSummary {
            overall: Summary::of(&all),
            by_year: summarize(by_year),
            by_airport: summarize(by_airport),
            by_region: summarize(by_region),
        }
    }
}

fn summarize<K: Ord>(series: BTreeMap<K, Vec<f64>>) -> BTreeMap<K, Summary> {
    series
        .into_iter()
        .map(|(k, values)| (k, Summary::of(&values)))
        .collect()
}

/// Computes the index for every (origin airport, destination region, year)
/// market found in `flights`.
#[instrument(skip_all, fields(rows = flights.len()))]
pub fn route_hhi<R: GroupResolver>(
    flights: &[Flight],
    resolver: &R,
    endpoints: &EndpointResolver,
    filter: &MarketFilter,
) -> RouteHhiReport {
    let in_scope: Vec<MarketFlight<'_>> = flights
        .iter()
        .filter_map(|flight| {
            let year = filter.admits_period(flight.year, flight.month)?;
            let origin = flight
                .origin_airport
                .as_deref()
                .filter(|a| endpoints.is_focus_airport(a))?;
            let region = endpoints.focus_region(flight.destination_region.as_deref()?)?;
            Some(MarketFlight {
                market: RouteMarket {
                    route: RouteKey {
                        origin: Endpoint::Airport(origin.to_string()),
                        destination: Endpoint::Region(region),
                    },
                    year,
                },
                flight,
            })
        })
        .collect();

    debug!(
        total = flights.len(),
        in_scope = in_scope.len(),
        "Schedule rows filtered to focus markets"
    );

    let agg = aggregate(&in_scope, resolver, |f| f.market.clone());

    let markets: Vec<MarketHhi> = agg
        .totals
        .into_iter()
        .map(|(market, departures)| {
            let shares = shares_from_totals(&departures);
            let record = HhiRecord::from_shares(shares.values());
            MarketHhi {
                market,
                departures,
                shares,
                record,
            }
        })
        .collect();

    let routes: BTreeSet<&RouteKey> = markets.iter().map(|m| &m.market.route).collect();
    info!(
        markets = markets.len(),
        routes = routes.len(),
        dropped = agg.diagnostics.dropped_rows,
        "Route HHI computed"
    );

    RouteHhiReport {
        in_scope_rows: in_scope.len(),
        markets,
        diagnostics: agg.diagnostics,
    }
}
