//! Airport-level HHI from per-airline share percentages.
//!
//! Shares within a group are summed and the index is taken over group totals
//! on the percent scale.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

use crate::analyzers::aggregate::{Diagnostics, aggregate};
use crate::analyzers::concentration::classify;
use crate::analyzers::hhi::{HhiRecord, Percent};
use crate::analyzers::trend::trend;
use crate::analyzers::types::{AirportHhiRow, AirportSummaryRow, SeasonObservation};
use crate::analyzers::utility::{Summary, round_to};
use crate::config::season_name;
use crate::groups::GroupResolver;
use crate::output::Table;

/// Group shares and index for one airport in one season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonHhi {
    pub season: String,
    pub shares: BTreeMap<String, Percent>,
    pub record: HhiRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirportHhi {
    pub airport: String,
    /// Labels in reporting order, matching the keys of every `shares` map.
    pub groups: Vec<String>,
    pub seasons: Vec<SeasonHhi>,
}

impl AirportHhi {
    pub fn hhi_series(&self) -> Vec<f64> {
        self.seasons.iter().map(|s| s.record.hhi()).collect()
    }

    pub fn rows(&self) -> Vec<AirportHhiRow> {
        self.seasons
            .iter()
            .map(|s| AirportHhiRow {
                airport: self.airport.clone(),
                season: s.season.clone(),
                season_name: season_name(&s.season),
                hhi: round_to(s.record.hhi(), 4),
                classification: s.record.classification(),
            })
            .collect()
    }

    /// Group shares per season, followed by the index and its tier.
    pub fn breakdown(&self) -> Table {
        let mut table = Table::new(
            std::iter::once("Airline Group".to_string())
                .chain(self.seasons.iter().map(|s| season_name(&s.season))),
        );
        for group in &self.groups {
            let mut row = vec![group.clone()];
            row.extend(self.seasons.iter().map(|s| {
                let share = s.shares.get(group).map_or(0.0, |p| p.0);
                round_to(share, 2).to_string()
            }));
            table.push(row);
        }

        let mut hhi_row = vec!["HHI".to_string()];
        hhi_row.extend(
            self.seasons
                .iter()
                .map(|s| round_to(s.record.hhi(), 4).to_string()),
        );
        table.push(hhi_row);

        let mut class_row = vec!["Market Classification".to_string()];
        class_row.extend(
            self.seasons
                .iter()
                .map(|s| s.record.classification().to_string()),
        );
        table.push(class_row);
        table
    }

    pub fn summary(&self) -> AirportSummaryRow {
        let series = self.hhi_series();
        let stats = Summary::of(&series);
        AirportSummaryRow {
            airport: self.airport.clone(),
            avg_hhi: round_to(stats.mean, 2),
            min_hhi: round_to(stats.min, 4),
            max_hhi: round_to(stats.max, 4),
            avg_classification: classify(stats.mean),
            trend: trend(&series),
        }
    }
}

/// Computes one [`AirportHhi`] per airport in `airports`, with one entry
/// per season in `seasons` order. Airports without observations get all-zero
/// shares.
#[instrument(skip_all, fields(airports = airports.len(), rows = observations.len(), seasons = seasons.len()))]
pub fn airport_hhi<R: GroupResolver, S: AsRef<str>>(
    airports: &[S],
    observations: &[SeasonObservation<f64>],
    resolver: &R,
    seasons: &[String],
) -> (Vec<AirportHhi>, Diagnostics) {
    let airports: BTreeSet<&str> = airports.iter().map(AsRef::as_ref).collect();
    let labels = resolver.labels();

    let agg = aggregate(observations, resolver, |o| {
        (o.airport.clone(), o.season.clone())
    });

    let results: Vec<AirportHhi> = airports
        .into_iter()
        .map(|airport| {
            let seasons = seasons
                .iter()
                .map(|season| {
                    let key = (airport.to_string(), season.clone());
                    let shares: BTreeMap<String, Percent> = labels
                        .iter()
                        .map(|label| (label.clone(), Percent(agg.totals.total(&key, label))))
                        .collect();
                    let record = HhiRecord::from_shares(shares.values());
                    SeasonHhi {
                        season: season.clone(),
                        shares,
                        record,
                    }
                })
                .collect();
            AirportHhi {
                airport: airport.to_string(),
                groups: labels.clone(),
                seasons,
            }
        })
        .collect();

    for a in &results {
        let summary = a.summary();
        info!(
            airport = %a.airport,
            min = summary.min_hhi,
            max = summary.max_hhi,
            trend = %summary.trend,
            "Airport HHI computed"
        );
    }

    (results, agg.diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::concentration::Concentration;
    use crate::analyzers::trend::Trend;
    use crate::groups::{AirlineGroup, Classifier, NewEntrants};

    fn obs(airline: &str, season: &str, share: f64) -> SeasonObservation<f64> {
        SeasonObservation {
            airport: "HAM".into(),
            airline: airline.into(),
            season: season.into(),
            value: share,
        }
    }

    fn classifier() -> Classifier {
        let groups = vec![
            AirlineGroup::new("A", ["LH", "EW"]),
            AirlineGroup::new("B", ["FR"]),
            AirlineGroup::new("C", ["AB"]),
        ];
        Classifier::new(&groups, NewEntrants::new())
    }

    #[test]
    fn test_group_shares_summed_before_squaring() {
        let seasons = vec!["S17".to_string(), "S18".to_string()];
        let observations = vec![
            obs("LH", "S17", 30.0),
            obs("EW", "S17", 20.0),
            obs("FR", "S17", 30.0),
            obs("AB", "S17", 20.0),
            obs("LH", "S18", 60.0),
            obs("EW", "S18", 40.0),
        ];

        let (results, diagnostics) =
            airport_hhi(&["HAM"], &observations, &classifier(), &seasons);
        assert_eq!(diagnostics.dropped_rows, 0);
        assert_eq!(results.len(), 1);

        let ham = &results[0];
        let s17 = &ham.seasons[0];
        assert_eq!(s17.shares["A"], Percent(50.0));
        assert!((s17.record.hhi() - 3800.0).abs() < 1e-6);
        assert_eq!(s17.record.classification(), Concentration::HighlyConcentrated);

        let s18 = &ham.seasons[1];
        assert!((s18.record.hhi() - 10_000.0).abs() < 1e-6);
        assert_eq!(s18.shares["C"], Percent(0.0));
    }

    #[test]
    fn test_summary_and_rows() {
        let seasons: Vec<String> = ["S15", "S16", "S17", "S18"].map(String::from).to_vec();
        let observations = vec![
            obs("LH", "S15", 10.0),
            obs("FR", "S15", 30.0),
            obs("LH", "S16", 10.0),
            obs("FR", "S16", 30.0),
            obs("LH", "S17", 40.0),
            obs("LH", "S18", 40.0),
            obs("FR", "S18", 0.0),
        ];
        let (results, _) = airport_hhi(&["HAM"], &observations, &classifier(), &seasons);

        // 1000, 1000, 1600, 1600
        let summary = results[0].summary();
        assert_eq!(summary.avg_hhi, 1300.0);
        assert_eq!(summary.min_hhi, 1000.0);
        assert_eq!(summary.max_hhi, 1600.0);
        assert!(matches!(summary.trend, Trend::Increasing(p) if (p - 60.0).abs() < 1e-9));

        let rows = results[0].rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].season_name, "Summer 2017");
        assert_eq!(rows[2].classification, Concentration::ModeratelyConcentrated);

        let table = results[0].breakdown();
        assert_eq!(table.header[1], "Summer 2015");
        assert_eq!(table.rows[0], vec!["A", "10", "10", "40", "40"]);
        // A, B, C, New Entrants, then the index rows
        assert_eq!(table.rows[4], vec!["HHI", "1000", "1000", "1600", "1600"]);
        assert_eq!(table.rows[5][3], "Moderately Concentrated");
    }

    #[test]
    fn test_airport_without_rows_reports_zero_index() {
        let seasons = vec!["S17".to_string(), "S18".to_string()];
        let observations = vec![obs("LH", "S17", 100.0)];

        let (results, _) = airport_hhi(&["HAM", "TXL"], &observations, &classifier(), &seasons);

        assert_eq!(results.len(), 2);
        let txl = &results[1];
        assert_eq!(txl.airport, "TXL");
        assert_eq!(txl.hhi_series(), vec![0.0, 0.0]);
        assert_eq!(txl.seasons[0].record.classification(), Concentration::Unconcentrated);
        assert_eq!(txl.summary().trend, Trend::Stable(0.0));
    }
}
