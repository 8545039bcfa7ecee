use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::allocation::TargetAllocations;
use super::ledger::Ledger;

/// The main data container: the asset ledger plus the target allocations
/// that shadow it, one entry per asset.
///
/// Cloned wholesale for undo snapshots and for all-or-nothing loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Assets in insertion order
    pub ledger: Ledger,

    /// Target percentages keyed by asset id
    pub targets: TargetAllocations,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a ledger with a 0% target for every asset, in ledger order.
    pub fn from_ledger(ledger: Ledger) -> Self {
        let mut targets = TargetAllocations::new();
        for asset in &ledger {
            targets.insert(asset.id);
        }
        Self { ledger, targets }
    }
}

/// A point-in-time copy of the portfolio, kept for single-level undo.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub portfolio: Portfolio,
    pub taken_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    pub fn capture(portfolio: &Portfolio) -> Self {
        Self {
            portfolio: portfolio.clone(),
            taken_at: Utc::now(),
        }
    }
}
