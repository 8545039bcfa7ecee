use serde::{Deserialize, Serialize};

use super::asset::AssetId;
use super::settings::UnitPolicy;

/// Below this magnitude a fractional unit count is treated as "no trade".
pub const FRACTIONAL_HOLD_EPSILON: f64 = 1e-9;

/// Direction of a rebalance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    /// Acquire more units
    Buy,
    /// Dispose of units
    Sell,
    /// Already at target (within unit resolution)
    Hold,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Buy => write!(f, "Buy"),
            ActionType::Sell => write!(f, "Sell"),
            ActionType::Hold => write!(f, "Hold"),
        }
    }
}

/// Buy/sell instruction for one asset, computed against its target value.
///
/// Ephemeral: produced fresh by every rebalance and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceAction {
    /// Asset this action applies to
    pub asset_id: AssetId,

    /// Asset name at the time the action was computed
    pub name: String,

    /// `quantity * price` before rebalancing
    pub current_value: f64,

    /// `total_value * target_percent / 100`
    pub target_value: f64,

    /// `target_value - current_value`; positive means buy
    pub diff_value: f64,

    /// Signed unit count to trade; whole numbers under [`UnitPolicy::Whole`]
    pub units: f64,

    /// Rounding policy the units were computed under
    pub unit_policy: UnitPolicy,
}

impl RebalanceAction {
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        let hold = match self.unit_policy {
            UnitPolicy::Whole => self.units == 0.0,
            UnitPolicy::Fractional => self.units.abs() < FRACTIONAL_HOLD_EPSILON,
        };
        if hold {
            ActionType::Hold
        } else if self.units > 0.0 {
            ActionType::Buy
        } else {
            ActionType::Sell
        }
    }
}

/// Output of one rebalance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancePlan {
    /// One action per target with a backing asset, in target order
    pub actions: Vec<RebalanceAction>,

    /// Net signed sum of all `diff_value`s.
    /// Positive: capital must be added. Negative: capital is freed.
    pub extra_capital: f64,

    /// Portfolio value the targets were computed against
    pub total_value: f64,

    pub unit_policy: UnitPolicy,
}

impl RebalancePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions that actually trade (everything except Hold).
    pub fn trades(&self) -> impl Iterator<Item = &RebalanceAction> {
        self.actions
            .iter()
            .filter(|a| a.action_type() != ActionType::Hold)
    }
}
