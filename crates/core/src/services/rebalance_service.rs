use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::action::{RebalanceAction, RebalancePlan};
use crate::models::allocation::TargetAllocations;
use crate::models::ledger::Ledger;
use crate::models::settings::UnitPolicy;

/// Proportional rebalance engine.
///
/// Moves every holding toward its target share of the current total value.
/// Lot sizes, fees and taxes are ignored. The computation is stateless:
/// the same ledger, targets and policy always produce the same plan.
pub struct RebalanceService;

impl RebalanceService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the actions needed to reach the target allocation.
    ///
    /// Refuses with [`CoreError::InvalidAllocation`] unless the targets sum
    /// to 100% within tolerance; no partial plan is produced in that case.
    /// Targets whose asset is missing from the ledger are skipped.
    pub fn compute(
        &self,
        ledger: &Ledger,
        targets: &TargetAllocations,
        policy: UnitPolicy,
    ) -> Result<RebalancePlan, CoreError> {
        let total_value = ledger.total_value();

        if !targets.is_valid() {
            let total = targets.total_percent();
            warn!("Refusing to rebalance: targets sum to {total:.2}%");
            return Err(CoreError::InvalidAllocation { total });
        }

        let mut actions = Vec::with_capacity(targets.len());
        let mut extra_capital = 0.0;

        for target in targets {
            let Some(asset) = ledger.get(target.asset_id) else {
                debug!("Target {} has no backing asset, skipping", target.asset_id);
                continue;
            };

            let current_value = asset.value();
            let target_value = total_value * (target.percent / 100.0);
            let diff_value = target_value - current_value;
            let units = policy.units(diff_value / asset.price);

            actions.push(RebalanceAction {
                asset_id: asset.id,
                name: asset.name.clone(),
                current_value,
                target_value,
                diff_value,
                units,
                unit_policy: policy,
            });
            extra_capital += diff_value;
        }

        Ok(RebalancePlan {
            actions,
            extra_capital,
            total_value,
            unit_policy: policy,
        })
    }
}

impl Default for RebalanceService {
    fn default() -> Self {
        Self::new()
    }
}
