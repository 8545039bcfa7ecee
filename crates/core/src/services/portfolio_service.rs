use log::debug;

use crate::errors::CoreError;
use crate::models::asset::{Asset, AssetId};
use crate::models::portfolio::Portfolio;

/// Manages the asset ledger and keeps the target allocations in lockstep
/// with it: every asset has exactly one target entry, keyed by its id.
///
/// No I/O; every operation works on a borrowed `Portfolio`.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Add a new asset with a 0% target.
    ///
    /// Rules:
    /// - Name must be non-empty after trimming and not already in use
    /// - Quantity and price must be finite and strictly positive
    pub fn add_asset(
        &self,
        portfolio: &mut Portfolio,
        name: &str,
        quantity: f64,
        price: f64,
    ) -> Result<AssetId, CoreError> {
        Self::validate_name(portfolio, name, None)?;
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        Self::validate_price(price)?;

        let asset = Asset::new(name, quantity, price);
        let id = asset.id;
        debug!("Adding asset '{}' ({} @ {})", asset.name, quantity, price);
        portfolio.ledger.push(asset);
        portfolio.targets.insert(id);
        Ok(id)
    }

    /// Remove the asset at `index` together with its target entry.
    pub fn remove_asset_at(
        &self,
        portfolio: &mut Portfolio,
        index: usize,
    ) -> Result<Asset, CoreError> {
        let asset = portfolio.ledger.remove_at(index).ok_or_else(|| {
            CoreError::AssetNotFound(format!(
                "index {index} (portfolio holds {} assets)",
                portfolio.ledger.len()
            ))
        })?;
        portfolio.targets.remove(asset.id);
        Ok(asset)
    }

    /// Remove an asset by id together with its target entry.
    pub fn remove_asset(&self, portfolio: &mut Portfolio, id: AssetId) -> Result<Asset, CoreError> {
        let index = portfolio
            .ledger
            .position(id)
            .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))?;
        self.remove_asset_at(portfolio, index)
    }

    /// Rename an asset. The target entry follows automatically since it is
    /// keyed by id. Changing only the case of the current name is allowed.
    pub fn rename_asset(
        &self,
        portfolio: &mut Portfolio,
        id: AssetId,
        new_name: &str,
    ) -> Result<(), CoreError> {
        if portfolio.ledger.get(id).is_none() {
            return Err(CoreError::AssetNotFound(id.to_string()));
        }
        Self::validate_name(portfolio, new_name, Some(id))?;

        if let Some(asset) = portfolio.ledger.get_mut(id) {
            asset.name = new_name.trim().to_string();
        }
        Ok(())
    }

    /// Overwrite an asset's quantity and unit price.
    /// Unlike [`add_asset`](Self::add_asset), a zero quantity is accepted.
    pub fn update_asset(
        &self,
        portfolio: &mut Portfolio,
        id: AssetId,
        quantity: f64,
        price: f64,
    ) -> Result<(), CoreError> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity must not be negative, got {quantity}"
            )));
        }
        Self::validate_price(price)?;

        let asset = portfolio
            .ledger
            .get_mut(id)
            .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))?;
        asset.quantity = quantity;
        asset.price = price;
        Ok(())
    }

    /// Set the target percentage for an asset. Negative values are clamped
    /// to zero; there is no upper clamp, the sum is checked at rebalance time.
    /// Returns the stored percentage.
    pub fn set_target(
        &self,
        portfolio: &mut Portfolio,
        id: AssetId,
        percent: f64,
    ) -> Result<f64, CoreError> {
        if !percent.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Target percent must be a finite number, got {percent}"
            )));
        }
        portfolio
            .targets
            .set_percent(id, percent)
            .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))
    }

    /// Name must be non-empty and unused by any asset other than `exclude`.
    fn validate_name(
        portfolio: &Portfolio,
        name: &str,
        exclude: Option<AssetId>,
    ) -> Result<(), CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError(
                "Asset name must not be empty".into(),
            ));
        }
        if let Some(existing) = portfolio.ledger.find_by_name(trimmed) {
            if Some(existing.id) != exclude {
                return Err(CoreError::DuplicateAsset(existing.name.clone()));
            }
        }
        Ok(())
    }

    fn validate_price(price: f64) -> Result<(), CoreError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Price must be positive, got {price}"
            )));
        }
        Ok(())
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
