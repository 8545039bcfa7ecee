use serde::{Deserialize, Serialize};

use super::asset::AssetId;

/// Snapshot of the portfolio's current versus target allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of all holding values
    pub total_value: f64,

    /// Sum of all target percentages
    pub total_target_percent: f64,

    /// Whether the targets sum to 100% (within tolerance)
    pub allocation_valid: bool,

    /// Per-asset breakdown, in ledger order
    pub holdings: Vec<HoldingSummary>,
}

/// Summary of a single held asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub id: AssetId,
    pub name: String,
    pub quantity: f64,
    pub price: f64,

    /// `quantity * price`
    pub value: f64,

    /// This asset's value / total portfolio value × 100 (0 for an empty portfolio)
    pub allocation_pct: f64,

    /// Target percentage
    pub target_pct: f64,

    /// `allocation_pct - target_pct`; positive means overweight
    pub drift_pct: f64,
}
