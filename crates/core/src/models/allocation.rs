use serde::{Deserialize, Serialize};

use super::asset::AssetId;

/// Maximum distance from 100% at which a target set is still accepted.
pub const ALLOCATION_TOLERANCE: f64 = 0.01;

/// Desired share of total portfolio value for one asset, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetAllocation {
    pub asset_id: AssetId,
    pub percent: f64,
}

/// Target percentages keyed by asset id, in insertion order.
///
/// Entries are created at 0% when an asset is added and dropped when the
/// asset is removed. Individual percentages are only clamped below at zero;
/// whether the set as a whole is usable is decided by [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAllocations {
    entries: Vec<TargetAllocation>,
}

impl TargetAllocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset with a 0% target. Re-inserting a known id is a no-op.
    pub fn insert(&mut self, asset_id: AssetId) {
        if !self.contains(asset_id) {
            self.entries.push(TargetAllocation {
                asset_id,
                percent: 0.0,
            });
        }
    }

    pub fn remove(&mut self, asset_id: AssetId) -> Option<TargetAllocation> {
        let idx = self.entries.iter().position(|t| t.asset_id == asset_id)?;
        Some(self.entries.remove(idx))
    }

    /// Set the target for `asset_id`, clamping negative values to zero.
    /// Returns the stored value, or `None` if the id is unknown.
    pub fn set_percent(&mut self, asset_id: AssetId, percent: f64) -> Option<f64> {
        let entry = self.entries.iter_mut().find(|t| t.asset_id == asset_id)?;
        entry.percent = percent.max(0.0);
        Some(entry.percent)
    }

    #[must_use]
    pub fn get(&self, asset_id: AssetId) -> Option<f64> {
        self.entries
            .iter()
            .find(|t| t.asset_id == asset_id)
            .map(|t| t.percent)
    }

    #[must_use]
    pub fn contains(&self, asset_id: AssetId) -> bool {
        self.entries.iter().any(|t| t.asset_id == asset_id)
    }

    #[must_use]
    pub fn total_percent(&self) -> f64 {
        self.entries.iter().map(|t| t.percent).sum()
    }

    /// `true` when the targets sum to 100% within [`ALLOCATION_TOLERANCE`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (self.total_percent() - 100.0).abs() <= ALLOCATION_TOLERANCE
    }

    /// Zero every target.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.percent = 0.0;
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetAllocation> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a TargetAllocations {
    type Item = &'a TargetAllocation;
    type IntoIter = std::slice::Iter<'a, TargetAllocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
