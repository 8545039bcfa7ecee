use crate::models::portfolio::Portfolio;
use crate::models::summary::{HoldingSummary, PortfolioSummary};

/// Computes the allocation breakdown: each asset's current share of the
/// portfolio next to its target share.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, portfolio: &Portfolio) -> PortfolioSummary {
        let total_value = portfolio.ledger.total_value();

        let holdings = portfolio
            .ledger
            .iter()
            .map(|asset| {
                let value = asset.value();
                let allocation_pct = if total_value > 0.0 {
                    value / total_value * 100.0
                } else {
                    0.0
                };
                let target_pct = portfolio.targets.get(asset.id).unwrap_or(0.0);

                HoldingSummary {
                    id: asset.id,
                    name: asset.name.clone(),
                    quantity: asset.quantity,
                    price: asset.price,
                    value,
                    allocation_pct,
                    target_pct,
                    drift_pct: allocation_pct - target_pct,
                }
            })
            .collect();

        PortfolioSummary {
            total_value,
            total_target_percent: portfolio.targets.total_percent(),
            allocation_valid: portfolio.targets.is_valid(),
            holdings,
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
