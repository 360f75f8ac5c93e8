//! CSV inputs: per-airport slot sheets, new-entrant lists and the schedule.
//!
//! Slot sheets are hand-maintained, so column names are matched loosely and a
//! missing sheet or list is a warning rather than an error.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzers::types::{Flight, ScheduleRecord, SeasonObservation};
use crate::groups::{NewEntrants, normalize_code};
use crate::parser::{DecimalSeparator, parse_number, parse_percent_with};

/// Header names (lower-cased, spaces removed) that hold the airline code.
const SLOT_CODE_COLUMNS: [&str; 4] = ["airlinecode", "iata", "airline_iata", "code"];

/// Header names (upper-cased) that hold a new entrant's code, in preference order.
const ENTRANT_CODE_COLUMNS: [&str; 5] = [
    "AIRLINE_CODE",
    "AIRLINE",
    "AIRLINE_IATA",
    "IATA",
    "AIRLINECODE",
];

fn reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file))
}

/// One airport's slot sheet: one row per airline, one or more columns per season.
#[derive(Debug, Clone)]
pub struct SlotSheet {
    pub airport: String,
    header: Vec<String>,
    /// Airline code and its row; a later row for the same code replaces an earlier one.
    rows: BTreeMap<String, StringRecord>,
}

impl SlotSheet {
    pub fn read(path: &Path, airport: &str) -> Result<Self> {
        let mut rdr = reader(path)?;
        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let code_col = header
            .iter()
            .position(|h| {
                let key = h.to_lowercase().replace(' ', "");
                SLOT_CODE_COLUMNS.contains(&key.as_str())
            })
            .unwrap_or(0);

        let airport = normalize_code(airport);
        let mut rows = BTreeMap::new();
        for record in rdr.records() {
            let record = record.with_context(|| format!("reading {}", path.display()))?;
            let code = normalize_code(record.get(code_col).unwrap_or_default());
            if code.is_empty() {
                continue;
            }
            if rows.insert(code.clone(), record).is_some() {
                warn!(airport = %airport, code = %code, "Airline listed twice in slot sheet, keeping the later row");
            }
        }

        debug!(
            airport = %airport,
            airlines = rows.len(),
            code_column = %header.get(code_col).map(String::as_str).unwrap_or_default(),
            "Read slot sheet"
        );
        Ok(Self {
            airport,
            header,
            rows,
        })
    }

    pub fn airlines(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Column holding departures for `season`: an exact header match, else
    /// the first header starting with the season code.
    pub fn departure_column(&self, season: &str) -> Option<usize> {
        let season_u = season.to_uppercase();
        self.header.iter().position(|h| h == season).or_else(|| {
            self.header
                .iter()
                .position(|h| h.to_uppercase().starts_with(&season_u))
        })
    }

    /// Column holding market share for `season`, by the usual spellings, else
    /// the first header mentioning both the season and "SHARE".
    pub fn share_column(&self, season: &str) -> Option<usize> {
        let candidates = [
            format!("Share_{season}"),
            format!("Share {season}"),
            season.to_string(),
            format!("Share_{season}%"),
        ];
        candidates
            .iter()
            .find_map(|c| self.header.iter().position(|h| h == c))
            .or_else(|| {
                let season_u = season.to_uppercase();
                self.header.iter().position(|h| {
                    let h = h.to_uppercase();
                    h.contains(&season_u) && h.contains("SHARE")
                })
            })
    }

    fn observations<V>(
        &self,
        seasons: &[String],
        column: impl Fn(&str) -> Option<usize>,
        parse: impl Fn(Option<&str>) -> V,
    ) -> Vec<SeasonObservation<V>> {
        let columns: Vec<(&String, Option<usize>)> =
            seasons.iter().map(|s| (s, column(s.as_str()))).collect();
        for (season, col) in &columns {
            if col.is_none() {
                warn!(airport = %self.airport, season = %season, "No column for season, reading as zero");
            }
        }

        let mut observations = Vec::with_capacity(self.rows.len() * columns.len());
        for (code, record) in &self.rows {
            for (season, col) in &columns {
                observations.push(SeasonObservation {
                    airport: self.airport.clone(),
                    airline: code.clone(),
                    season: season.to_string(),
                    value: parse(col.and_then(|c| record.get(c))),
                });
            }
        }
        observations
    }

    /// Departure counts, one observation per airline and season.
    pub fn departures(&self, seasons: &[String]) -> Vec<SeasonObservation<i64>> {
        self.observations(seasons, |s| self.departure_column(s), parse_number)
    }

    /// Share percentages, one observation per airline and season.
    pub fn shares(
        &self,
        seasons: &[String],
        separator: DecimalSeparator,
    ) -> Vec<SeasonObservation<f64>> {
        self.observations(
            seasons,
            |s| self.share_column(s),
            |raw| parse_percent_with(raw, separator),
        )
    }
}

/// Reads `<AIRPORT>.csv` from `dir` for every airport; missing sheets are skipped.
pub fn load_slot_sheets<S: AsRef<str>>(dir: &Path, airports: &[S]) -> Result<Vec<SlotSheet>> {
    let mut sheets = Vec::new();
    for airport in airports {
        let airport = airport.as_ref();
        let path = dir.join(format!("{airport}.csv"));
        if !path.is_file() {
            warn!(airport, path = %path.display(), "Slot sheet not found, skipping airport");
            continue;
        }
        sheets.push(SlotSheet::read(&path, airport)?);
    }
    info!(airports = sheets.len(), dir = %dir.display(), "Loaded slot sheets");
    Ok(sheets)
}

/// Codes from a new-entrant list. A missing file yields an empty list.
///
/// The code column is the first of `AIRLINE_CODE`, `AIRLINE`, `AIRLINE_IATA`,
/// `IATA`, `AIRLINECODE` present (case-insensitive), else the second column,
/// else the only one.
pub fn read_new_entrants(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        warn!(path = %path.display(), "New entrant list not found");
        return Ok(Vec::new());
    }

    let mut rdr = reader(path)?;
    let header: Vec<String> = rdr.headers()?.iter().map(str::to_uppercase).collect();
    let Some(code_col) = ENTRANT_CODE_COLUMNS
        .iter()
        .find_map(|name| header.iter().position(|h| h == name))
        .or_else(|| match header.len() {
            0 => None,
            1 => Some(0),
            _ => Some(1),
        })
    else {
        return Ok(Vec::new());
    };

    let mut codes = Vec::new();
    for record in rdr.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let code = normalize_code(record.get(code_col).unwrap_or_default());
        if !code.is_empty() {
            codes.push(code);
        }
    }
    Ok(codes)
}

/// New entrants for every airport from `<AIRPORT>_NEW_ENTRANT.csv` files in `dir`.
pub fn load_new_entrants<S: AsRef<str>>(dir: &Path, airports: &[S]) -> Result<NewEntrants> {
    let mut entrants = NewEntrants::new();
    for airport in airports {
        let airport = normalize_code(airport.as_ref());
        let codes = read_new_entrants(&dir.join(format!("{airport}_NEW_ENTRANT.csv")))?;
        debug!(airport = %airport, count = codes.len(), "New entrants loaded");
        entrants.insert(&airport, codes);
    }
    Ok(entrants)
}

/// Every row of a schedule CSV, normalized.
pub fn read_schedule(path: &Path) -> Result<Vec<Flight>> {
    let mut rdr = reader(path)?;
    let mut flights = Vec::new();
    for (i, result) in rdr.deserialize::<ScheduleRecord>().enumerate() {
        match result {
            Ok(record) => flights.push(Flight::from(record)),
            Err(e) => warn!(row = i + 1, error = %e, "Skipping unreadable schedule row"),
        }
    }
    info!(rows = flights.len(), path = %path.display(), "Loaded schedule");
    Ok(flights)
}
