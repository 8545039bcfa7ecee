use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::action::RebalanceAction;
use super::asset::{Asset, AssetId};

/// Ordered collection of assets. Insertion order is preserved and is the
/// order used for display, rebalancing and persistence.
///
/// This type does not validate its input; use
/// [`PortfolioService`](crate::services::portfolio_service::PortfolioService)
/// for checked mutations that keep targets in lockstep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    assets: Vec<Asset>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from already-validated assets.
    pub fn from_assets(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    /// Sum of `value()` over all assets. Zero for an empty ledger.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.assets.iter().map(Asset::value).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.assets.iter()
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    #[must_use]
    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AssetId) -> Option<&mut Asset> {
        self.assets.iter_mut().find(|a| a.id == id)
    }

    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&Asset> {
        self.assets.get(index)
    }

    /// Find an asset by display name (case-insensitive).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.has_name(name))
    }

    /// Position of the asset with the given id.
    #[must_use]
    pub fn position(&self, id: AssetId) -> Option<usize> {
        self.assets.iter().position(|a| a.id == id)
    }

    pub(crate) fn push(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Asset> {
        if index < self.assets.len() {
            Some(self.assets.remove(index))
        } else {
            None
        }
    }

    /// Adjust quantities by each action's signed unit count.
    ///
    /// Quantities are floored at zero: selling more than is held empties the
    /// position instead of failing. Actions whose asset no longer exists are
    /// skipped. Returns the number of actions that touched an asset.
    pub fn apply_actions(&mut self, actions: &[RebalanceAction]) -> usize {
        let mut applied = 0;
        for action in actions {
            let Some(asset) = self.get_mut(action.asset_id) else {
                debug!("Skipping action for missing asset '{}'", action.name);
                continue;
            };

            let new_quantity = asset.quantity + action.units;
            if new_quantity < 0.0 {
                warn!(
                    "Sell of {} units of '{}' exceeds holding of {}; clamping to 0",
                    -action.units, asset.name, asset.quantity
                );
                asset.quantity = 0.0;
            } else {
                asset.quantity = new_quantity;
            }
            applied += 1;
        }
        applied
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}
