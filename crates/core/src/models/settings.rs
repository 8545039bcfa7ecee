use serde::{Deserialize, Serialize};

/// How unit counts are derived from `diff_value / price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPolicy {
    /// Whole-unit trading: round half away from zero (2.5 → 3, -2.5 → -3).
    #[default]
    Whole,
    /// Fractional trading: the exact ratio is kept.
    Fractional,
}

impl UnitPolicy {
    /// Convert a raw unit ratio into a tradable unit count.
    #[must_use]
    pub fn units(self, raw: f64) -> f64 {
        match self {
            UnitPolicy::Whole => raw.round(),
            UnitPolicy::Fractional => raw,
        }
    }
}

impl std::fmt::Display for UnitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitPolicy::Whole => write!(f, "whole"),
            UnitPolicy::Fractional => write!(f, "fractional"),
        }
    }
}

impl std::str::FromStr for UnitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whole" => Ok(UnitPolicy::Whole),
            "fractional" => Ok(UnitPolicy::Fractional),
            other => Err(format!(
                "unknown unit policy '{other}' (expected 'whole' or 'fractional')"
            )),
        }
    }
}

/// User-configurable engine settings. Held in memory only; the portfolio
/// file stores assets and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub unit_policy: UnitPolicy,
}
