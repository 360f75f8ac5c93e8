use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::analyzers::aggregate::Diagnostics;
use crate::analyzers::airport::airport_hhi;
use crate::analyzers::expansion::{OTHER_LABEL, TrackedGroups, expansion};
use crate::analyzers::route::route_hhi;
use crate::analyzers::slots::slot_allocation;
use crate::config::AnalysisConfig;
use crate::groups::tables::{AIR_BERLIN_LABEL, LUFTHANSA_LABEL};
use crate::groups::{Classifier, Conflict, NewEntrants, WithFallback};
use crate::loader::{load_new_entrants, load_slot_sheets, read_schedule};
use crate::output::OutputDir;

/// Row accounting and classification conflicts of one run, written next to its results.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    generated_at: DateTime<Utc>,
    diagnostics: &'a Diagnostics,
    conflicts: Vec<&'a Conflict>,
}

fn log_diagnostics(stage: &str, diagnostics: &Diagnostics) {
    info!(
        stage,
        total = diagnostics.total_rows,
        classified = diagnostics.classified_rows(),
        dropped = diagnostics.dropped_rows,
        drop_pct = %format!("{:.1}", diagnostics.drop_pct()),
        "Rows classified"
    );
    if !diagnostics.unclassified.is_empty() {
        let codes: Vec<&str> = diagnostics.unclassified.iter().map(String::as_str).collect();
        warn!(stage, codes = %codes.join(","), "Airlines in no group, excluded from totals");
    }
}

fn classifier(config: &AnalysisConfig, entrants_dir: &Path) -> Result<Classifier> {
    let entrants = load_new_entrants(entrants_dir, &config.airports)?;
    let classifier = Classifier::new(&config.groups(), entrants);
    classifier.report_conflicts();
    Ok(classifier)
}

fn write_report(
    out: &OutputDir,
    classifier: &Classifier,
    diagnostics: &Diagnostics,
) -> Result<PathBuf> {
    out.write_json(
        "diagnostics.json",
        &RunReport {
            generated_at: Utc::now(),
            diagnostics,
            conflicts: classifier.conflicts().collect(),
        },
    )
}

/// Departures per group and season, one table per airport.
///
/// New-entrant lists are read from the slot directory alongside the sheets.
#[instrument(skip(config, out), fields(out = %out.root().display()))]
pub fn run_slots(config: &AnalysisConfig, slots_dir: &Path, out: &OutputDir) -> Result<Vec<PathBuf>> {
    let classifier = classifier(config, slots_dir)?;
    let sheets = load_slot_sheets(slots_dir, &config.airports)?;
    let observations: Vec<_> = sheets
        .iter()
        .flat_map(|s| s.departures(&config.seasons))
        .collect();

    let airports: Vec<&str> = sheets.iter().map(|s| s.airport.as_str()).collect();
    let (tables, diagnostics) =
        slot_allocation(&airports, &observations, &classifier, &config.seasons);
    log_diagnostics("slots", &diagnostics);

    let mut written = Vec::with_capacity(tables.len() + 1);
    for table in &tables {
        written.push(out.write_table(&format!("{}.csv", table.airport), &table.to_table())?);
    }
    written.push(write_report(out, &classifier, &diagnostics)?);

    info!(files = written.len(), "Slot allocation written");
    Ok(written)
}

/// Share-based HHI per airport and season, with per-airport summaries.
#[instrument(skip(config, out), fields(out = %out.root().display()))]
pub fn run_airport_hhi(
    config: &AnalysisConfig,
    slots_dir: &Path,
    out: &OutputDir,
) -> Result<Vec<PathBuf>> {
    let classifier = classifier(config, slots_dir)?;
    let sheets = load_slot_sheets(slots_dir, &config.airports)?;
    let observations: Vec<_> = sheets
        .iter()
        .flat_map(|s| s.shares(&config.seasons, config.decimal_separator))
        .collect();

    let loaded: Vec<&str> = sheets.iter().map(|s| s.airport.as_str()).collect();
    let (airports, diagnostics) =
        airport_hhi(&loaded, &observations, &classifier, &config.seasons);
    log_diagnostics("airport-hhi", &diagnostics);

    let mut written = Vec::new();
    for airport in &airports {
        written.push(out.write_table(
            &format!("{}_hhi_breakdown.csv", airport.airport),
            &airport.breakdown(),
        )?);
    }

    let combined: Vec<_> = airports.iter().flat_map(|a| a.rows()).collect();
    written.push(out.write_records("combined_hhi_summary.csv", &combined)?);

    let summaries: Vec<_> = airports.iter().map(|a| a.summary()).collect();
    written.push(out.write_records("airport_summary.csv", &summaries)?);
    written.push(write_report(out, &classifier, &diagnostics)?);

    info!(airports = airports.len(), files = written.len(), "Airport HHI written");
    Ok(written)
}

/// Route-level HHI over the summer schedule.
#[instrument(skip(config, out), fields(out = %out.root().display()))]
pub fn run_route_hhi(
    config: &AnalysisConfig,
    schedule: &Path,
    entrants_dir: &Path,
    out: &OutputDir,
) -> Result<Vec<PathBuf>> {
    let classifier = classifier(config, entrants_dir)?;
    let flights = read_schedule(schedule)?;

    let report = route_hhi(
        &flights,
        &classifier,
        &config.endpoint_resolver(),
        &config.market_filter(),
    );
    log_diagnostics("route-hhi", &report.diagnostics);

    let summary = report.summary();
    info!(
        markets = summary.overall.count,
        mean = %format!("{:.2}", summary.overall.mean),
        median = %format!("{:.2}", summary.overall.median),
        min = summary.overall.min,
        max = summary.overall.max,
        std_dev = %format!("{:.2}", summary.overall.std_dev),
        "Route HHI statistics"
    );

    let written = vec![
        out.write_records("hhi_results.csv", &report.hhi_rows())?,
        out.write_table("detailed_market_shares.csv", &report.detailed())?,
        out.write_records("market_shares_by_group.csv", &report.market_share_rows())?,
        out.write_table("hhi_pivot_table.csv", &report.pivot())?,
        out.write_json("summary_statistics.json", &summary)?,
        write_report(out, &classifier, &report.diagnostics)?,
    ];

    info!(files = written.len(), "Route HHI written");
    Ok(written)
}

/// Lufthansa year-over-year capacity on every route Air Berlin served.
#[instrument(skip(config, out), fields(out = %out.root().display()))]
pub fn run_expansion(
    config: &AnalysisConfig,
    schedule: &Path,
    out: &OutputDir,
) -> Result<Vec<PathBuf>> {
    let exiting = config
        .group(AIR_BERLIN_LABEL)
        .ok_or_else(|| anyhow!("no airline group labelled {AIR_BERLIN_LABEL:?}"))?;
    let expanding = config
        .group(LUFTHANSA_LABEL)
        .ok_or_else(|| anyhow!("no airline group labelled {LUFTHANSA_LABEL:?}"))?;
    let tracked = TrackedGroups {
        exiting: exiting.label.clone(),
        expanding: expanding.label.clone(),
    };

    let inner = Classifier::new(&[exiting, expanding], NewEntrants::new());
    inner.report_conflicts();
    let resolver = WithFallback::new(inner, OTHER_LABEL);

    let flights = read_schedule(schedule)?;
    let report = expansion(
        &flights,
        &resolver,
        &config.endpoint_resolver(),
        &tracked,
        &config.year_set(),
    );
    log_diagnostics("expansion", &report.diagnostics);

    let written = vec![
        out.write_records("ab_routes_frequency_per_year.csv", &report.frequencies)?,
        out.write_records("lufthansa_on_ab_routes_with_increase.csv", &report.expansion)?,
        write_report(out, resolver.inner(), &report.diagnostics)?,
    ];

    info!(
        routes = report.routes_seen,
        rows = report.expansion.len(),
        "Expansion written"
    );
    Ok(written)
}
