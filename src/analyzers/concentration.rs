use serde::Serialize;
use std::fmt;

/// Market concentration tier of an HHI value.
///
/// | HHI                 | Tier                    |
/// |---------------------|-------------------------|
/// | < 1500              | Unconcentrated          |
/// | 1500 ..= 2500       | Moderately Concentrated |
/// | > 2500              | Highly Concentrated     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Concentration {
    #[serde(rename = "Unconcentrated (Competitive)")]
    Unconcentrated,
    #[serde(rename = "Moderately Concentrated")]
    ModeratelyConcentrated,
    #[serde(rename = "Highly Concentrated")]
    HighlyConcentrated,
}

impl fmt::Display for Concentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Concentration::Unconcentrated => "Unconcentrated (Competitive)",
            Concentration::ModeratelyConcentrated => "Moderately Concentrated",
            Concentration::HighlyConcentrated => "Highly Concentrated",
        })
    }
}

/// Classifies an HHI value. Both 1500 and 2500 are moderately concentrated.
pub fn classify(hhi: f64) -> Concentration {
    match hhi {
        h if h < 1500.0 => Concentration::Unconcentrated,
        h if h <= 2500.0 => Concentration::ModeratelyConcentrated,
        _ => Concentration::HighlyConcentrated,
    }
}
