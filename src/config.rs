//! Analysis parameters shared by every pipeline.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::route::MarketFilter;
use crate::groups::{AirlineGroup, tables};
use crate::parser::DecimalSeparator;
use crate::routes::{EndpointResolver, RegionPolicy};

/// Raw region labels collapsed into one canonical label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionMerge {
    pub from: Vec<String>,
    pub into: String,
}

/// Loaded from a JSON file; every field falls back to its default when absent.
///
/// ```json
/// {
///   "airports": ["DUS", "TXL"],
///   "seasons": ["S17", "S18"],
///   "decimal_separator": "comma",
///   "groups": [{ "label": "Lufthansa Group", "codes": ["LH", "EW"] }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub airports: Vec<String>,
    pub seasons: Vec<String>,
    /// Schedule years to keep; empty keeps every year.
    pub years: Vec<i32>,
    pub summer_months: Vec<u32>,
    pub focus_regions: Vec<String>,
    pub region_merges: Vec<RegionMerge>,
    pub decimal_separator: DecimalSeparator,
    /// Replaces the built-in group tables, in priority order.
    pub groups: Option<Vec<AirlineGroup>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            airports: ["DUS", "FRA", "HAM", "MUC", "STR", "SXF", "TXL"]
                .map(String::from)
                .to_vec(),
            seasons: ["S15", "S16", "S17", "S18", "S19"].map(String::from).to_vec(),
            years: Vec::new(),
            summer_months: (4..=10).collect(),
            focus_regions: [
                "WESTERN EUROPE",
                "EASTERN EUROPE",
                "NORTH AFRICA",
                "GULF/MIDDLE EAST",
            ]
            .map(String::from)
            .to_vec(),
            region_merges: vec![RegionMerge {
                from: vec!["GULF".into(), "MIDDLE EAST".into()],
                into: "GULF/MIDDLE EAST".into(),
            }],
            decimal_separator: DecimalSeparator::default(),
            groups: None,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "Loaded analysis config");
        Ok(config)
    }

    /// Loads `path` if given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Configured groups, or the built-in tables.
    pub fn groups(&self) -> Vec<AirlineGroup> {
        match &self.groups {
            Some(groups) => groups.iter().cloned().map(AirlineGroup::normalized).collect(),
            None => tables::default_groups(),
        }
    }

    /// The configured group labelled `label`, falling back to the built-in one.
    pub fn group(&self, label: &str) -> Option<AirlineGroup> {
        self.groups()
            .into_iter()
            .find(|g| g.label == label)
            .or_else(|| {
                tables::default_groups()
                    .into_iter()
                    .find(|g| g.label == label)
            })
    }

    pub fn region_policy(&self) -> RegionPolicy {
        self.region_merges
            .iter()
            .fold(RegionPolicy::default(), |policy, m| policy.merge(&m.from, &m.into))
    }

    pub fn endpoint_resolver(&self) -> EndpointResolver {
        EndpointResolver::new(self.region_policy(), &self.airports, &self.focus_regions)
    }

    pub fn market_filter(&self) -> MarketFilter {
        MarketFilter {
            months: self.summer_months.iter().copied().collect(),
            years: self.year_set(),
        }
    }

    pub fn year_set(&self) -> BTreeSet<i32> {
        self.years.iter().copied().collect()
    }
}

/// Readable form of an IATA season code: `S17` is "Summer 2017", `W16` is
/// "Winter 2016". Codes that do not fit the pattern are returned unchanged.
pub fn season_name(code: &str) -> String {
    let code = code.trim();
    let mut chars = code.chars();
    let half = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('S') => "Summer",
        Some('W') => "Winter",
        _ => return code.to_string(),
    };
    let digits = chars.as_str();
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return code.to_string();
    }
    format!("{half} 20{digits}")
}
