//! Observation rows fed into the pipelines and the records they emit.

use serde::{Deserialize, Serialize};

use crate::analyzers::aggregate::{Measure, Observed};
use crate::analyzers::concentration::Concentration;
use crate::analyzers::trend::Trend;
use crate::groups::normalize_code;
use crate::parser::parse_number;

/// One airline's value for one season at one airport.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonObservation<V> {
    pub airport: String,
    pub airline: String,
    pub season: String,
    pub value: V,
}

impl<V: Measure> Observed for SeasonObservation<V> {
    type Value = V;

    fn airline(&self) -> &str {
        &self.airline
    }

    fn scope(&self) -> &str {
        &self.airport
    }

    fn value(&self) -> V {
        self.value
    }
}

/// A schedule row as it appears in the CSV file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleRecord {
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Month", default)]
    pub month: Option<String>,
    #[serde(rename = "Origin Airport", default)]
    pub origin_airport: Option<String>,
    #[serde(rename = "Origin Region Name", default)]
    pub origin_region: Option<String>,
    #[serde(rename = "Destination Airport", default)]
    pub destination_airport: Option<String>,
    #[serde(rename = "Destination Region Name", default)]
    pub destination_region: Option<String>,
    #[serde(rename = "Operating Airline", default)]
    pub operating_airline: Option<String>,
    #[serde(rename = "Departures", default)]
    pub departures: Option<String>,
}

/// A schedule row with codes normalized and numbers parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub origin_airport: Option<String>,
    pub origin_region: Option<String>,
    pub destination_airport: Option<String>,
    pub destination_region: Option<String>,
    pub airline: String,
    pub departures: i64,
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl From<ScheduleRecord> for Flight {
    fn from(r: ScheduleRecord) -> Self {
        Self {
            year: non_blank(r.year).and_then(|s| s.parse().ok()),
            month: non_blank(r.month).and_then(|s| s.parse().ok()),
            origin_airport: non_blank(r.origin_airport).map(|s| normalize_code(&s)),
            origin_region: non_blank(r.origin_region),
            destination_airport: non_blank(r.destination_airport).map(|s| normalize_code(&s)),
            destination_region: non_blank(r.destination_region),
            airline: r
                .operating_airline
                .map(|s| normalize_code(&s))
                .unwrap_or_default(),
            departures: parse_number(r.departures.as_deref()),
        }
    }
}

impl Observed for Flight {
    type Value = i64;

    fn airline(&self) -> &str {
        &self.airline
    }

    /// New entrants are listed per origin airport.
    fn scope(&self) -> &str {
        self.origin_airport.as_deref().unwrap_or_default()
    }

    fn value(&self) -> i64 {
        self.departures
    }
}

/// HHI of one airport in one season.
#[derive(Debug, Clone, Serialize)]
pub struct AirportHhiRow {
    #[serde(rename = "Airport")]
    pub airport: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Season Name")]
    pub season_name: String,
    #[serde(rename = "HHI")]
    pub hhi: f64,
    #[serde(rename = "Market Classification")]
    pub classification: Concentration,
}

/// HHI range and trend of one airport across all seasons.
#[derive(Debug, Clone, Serialize)]
pub struct AirportSummaryRow {
    #[serde(rename = "Airport")]
    pub airport: String,
    #[serde(rename = "Avg HHI")]
    pub avg_hhi: f64,
    #[serde(rename = "Min HHI")]
    pub min_hhi: f64,
    #[serde(rename = "Max HHI")]
    pub max_hhi: f64,
    #[serde(rename = "Avg Classification")]
    pub avg_classification: Concentration,
    #[serde(rename = "Trend")]
    pub trend: Trend,
}

/// HHI of one origin airport -> destination region market in one year.
#[derive(Debug, Clone, Serialize)]
pub struct RouteHhiRow {
    #[serde(rename = "Origin Airport")]
    pub origin: String,
    #[serde(rename = "Destination Region")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "HHI")]
    pub hhi: f64,
    #[serde(rename = "Market Classification")]
    pub classification: Concentration,
}

/// One group's departures, share and index contribution in a route market.
#[derive(Debug, Clone, Serialize)]
pub struct MarketShareRow {
    #[serde(rename = "Origin Airport")]
    pub origin: String,
    #[serde(rename = "Destination Region")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "Airline Group")]
    pub group: String,
    #[serde(rename = "Departures")]
    pub departures: i64,
    #[serde(rename = "Total Market Departures")]
    pub market_departures: i64,
    #[serde(rename = "Market Share")]
    pub share: f64,
    #[serde(rename = "HHI Contribution")]
    pub contribution: f64,
}

/// Air Berlin departures on a route in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbRouteFrequency {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "AB_Departures")]
    pub ab_departures: i64,
}

/// Lufthansa capacity on an Air Berlin route, with change from the previous year on record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "AB_Departures")]
    pub ab_departures: i64,
    #[serde(rename = "LH_Departures")]
    pub lh_departures: i64,
    #[serde(rename = "LH_Delta")]
    pub lh_delta: Option<i64>,
    #[serde(rename = "LH_Pct_Change")]
    pub lh_pct_change: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_from_record_normalizes() {
        let record = ScheduleRecord {
            year: Some(" 2018 ".into()),
            month: Some("7".into()),
            origin_airport: Some("txl".into()),
            origin_region: Some("Western Europe".into()),
            destination_airport: Some(" pmi".into()),
            destination_region: Some("  ".into()),
            operating_airline: Some("ew ".into()),
            departures: Some("1,204".into()),
        };

        let flight = Flight::from(record);
        assert_eq!(flight.year, Some(2018));
        assert_eq!(flight.month, Some(7));
        assert_eq!(flight.origin_airport.as_deref(), Some("TXL"));
        assert_eq!(flight.destination_airport.as_deref(), Some("PMI"));
        assert_eq!(flight.destination_region, None);
        assert_eq!(flight.airline, "EW");
        assert_eq!(flight.departures, 1204);
    }

    #[test]
    fn test_flight_with_bad_numbers() {
        let flight = Flight::from(ScheduleRecord {
            year: Some("n/a".into()),
            departures: Some("".into()),
            ..Default::default()
        });
        assert_eq!(flight.year, None);
        assert_eq!(flight.departures, 0);
        assert_eq!(flight.airline, "");
    }
}
