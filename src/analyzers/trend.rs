use serde::{Serialize, Serializer};
use std::fmt;

use crate::analyzers::utility::mean;

/// Relative change below which a series counts as stable, in percent.
const STABLE_BAND_PCT: f64 = 5.0;

/// Direction of an HHI series, comparing its first half to its second half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    InsufficientData,
    Stable(f64),
    Increasing(f64),
    Decreasing(f64),
}

impl Trend {
    /// Signed percentage change, if there was enough data.
    pub fn pct_change(&self) -> Option<f64> {
        match *self {
            Trend::InsufficientData => None,
            Trend::Stable(p) | Trend::Increasing(p) | Trend::Decreasing(p) => Some(p),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::InsufficientData => f.write_str("Insufficient data"),
            Trend::Stable(p) => write!(f, "Stable (±{:.1}%)", p.abs()),
            Trend::Increasing(p) => write!(f, "Increasing Concentration (+{:.1}%)", p),
            Trend::Decreasing(p) => write!(f, "Decreasing Concentration ({:.1}%)", p),
        }
    }
}

impl Serialize for Trend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Compares the mean of the first half of `values` with the mean of the
/// second half. Odd lengths put the middle value in the second half.
///
/// A first-half mean of zero is reported as a 0% change.
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::InsufficientData;
    }

    let (first, second) = values.split_at(values.len() / 2);
    let first_mean = mean(first);
    let second_mean = mean(second);

    let pct = if first_mean > 0.0 {
        (second_mean - first_mean) / first_mean * 100.0
    } else {
        0.0
    };

    if pct.abs() < STABLE_BAND_PCT {
        Trend::Stable(pct)
    } else if pct > 0.0 {
        Trend::Increasing(pct)
    } else {
        Trend::Decreasing(pct)
    }
}
