//! Departures per airline group and season at each airport.

use std::collections::BTreeSet;
use tracing::{info, instrument};

use crate::analyzers::aggregate::{Diagnostics, aggregate};
use crate::analyzers::types::SeasonObservation;
use crate::groups::GroupResolver;
use crate::output::Table;

/// Group-by-season departure counts for one airport.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotTable {
    pub airport: String,
    pub seasons: Vec<String>,
    /// One row per group label, values aligned with `seasons`.
    pub rows: Vec<(String, Vec<i64>)>,
}

impl SlotTable {
    pub fn row(&self, group: &str) -> Option<&[i64]> {
        self.rows
            .iter()
            .find(|(label, _)| label == group)
            .map(|(_, values)| values.as_slice())
    }

    /// Groups as rows, seasons as columns.
    pub fn to_table(&self) -> Table {
        let mut table =
            Table::new(std::iter::once("GROUP".to_string()).chain(self.seasons.iter().cloned()));
        for (label, values) in &self.rows {
            let mut row = vec![label.clone()];
            row.extend(values.iter().map(i64::to_string));
            table.push(row);
        }
        table
    }
}

/// Builds one [`SlotTable`] per airport in `airports`, even one with no
/// observations at all.
///
/// Every resolver label gets a row, with zeros where the group has no
/// departures, so tables line up across airports.
#[instrument(skip_all, fields(airports = airports.len(), rows = observations.len(), seasons = seasons.len()))]
pub fn slot_allocation<R: GroupResolver, S: AsRef<str>>(
    airports: &[S],
    observations: &[SeasonObservation<i64>],
    resolver: &R,
    seasons: &[String],
) -> (Vec<SlotTable>, Diagnostics) {
    let airports: BTreeSet<&str> = airports.iter().map(AsRef::as_ref).collect();
    let labels = resolver.labels();

    let mut agg = aggregate(observations, resolver, |o| {
        (o.airport.clone(), o.season.clone())
    });
    agg.totals.fill_groups(
        airports
            .iter()
            .flat_map(|a| seasons.iter().map(move |s| (a.to_string(), s.clone()))),
        &labels,
    );

    let tables = airports
        .into_iter()
        .map(|airport| {
            let rows = labels
                .iter()
                .map(|label| {
                    let values = seasons
                        .iter()
                        .map(|s| agg.totals.total(&(airport.to_string(), s.clone()), label))
                        .collect();
                    (label.clone(), values)
                })
                .collect();
            SlotTable {
                airport: airport.to_string(),
                seasons: seasons.to_vec(),
                rows,
            }
        })
        .collect::<Vec<_>>();

    info!(
        airports = tables.len(),
        dropped = agg.diagnostics.dropped_rows,
        "Slot allocation aggregated"
    );

    (tables, agg.diagnostics)
}
