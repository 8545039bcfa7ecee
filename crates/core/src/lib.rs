pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use models::{
    action::{RebalanceAction, RebalancePlan},
    allocation::TargetAllocations,
    asset::{Asset, AssetId},
    ledger::Ledger,
    portfolio::{Portfolio, PortfolioSnapshot},
    settings::{Settings, UnitPolicy},
    summary::PortfolioSummary,
};
use services::{
    portfolio_service::PortfolioService, rebalance_service::RebalanceService,
    summary_service::SummaryService,
};
use storage::manager::StorageManager;

use errors::CoreError;

/// Main entry point for the Portfolio Rebalancer core library.
///
/// Owns the business data (ledger and targets), the most recent rebalance
/// plan, the carried extra-capital figure and a single-slot undo buffer.
/// A presentation layer holds one of these and calls into it; it keeps only
/// transient UI state of its own.
#[must_use]
pub struct PortfolioManager {
    portfolio: Portfolio,
    settings: Settings,
    portfolio_service: PortfolioService,
    rebalance_service: RebalanceService,
    summary_service: SummaryService,
    /// Last successful plan; discarded whenever the inputs change.
    plan: Option<RebalancePlan>,
    /// Extra capital of the last successful rebalance. Survives refusals.
    extra_capital: f64,
    undo: Option<PortfolioSnapshot>,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for PortfolioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioManager")
            .field("assets", &self.portfolio.ledger.len())
            .field("settings", &self.settings)
            .field("planned_actions", &self.actions().len())
            .field("extra_capital", &self.extra_capital)
            .field("can_rollback", &self.undo.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PortfolioManager {
    /// Create a brand new empty portfolio with default settings.
    pub fn create_new() -> Self {
        Self::build(Portfolio::default(), Settings::default())
    }

    /// Create an empty portfolio with explicit settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self::build(Portfolio::default(), settings)
    }

    /// Load a portfolio from JSON bytes. Every target starts at 0%.
    pub fn load_from_bytes(data: &[u8], settings: Settings) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_from_bytes(data)?;
        Ok(Self::build(portfolio, settings))
    }

    /// Load a portfolio from a JSON file on disk.
    pub fn load_from_file(path: impl AsRef<Path>, settings: Settings) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_from_file(path)?;
        Ok(Self::build(portfolio, settings))
    }

    /// Serialize the ledger to JSON bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.portfolio.ledger)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Save the ledger to a JSON file on disk.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.portfolio.ledger, path)?;
        self.dirty = false;
        Ok(())
    }

    /// Replace the current portfolio with one parsed from JSON bytes.
    ///
    /// All-or-nothing: on any parse or validation error the current state is
    /// left untouched. On success the plan and undo buffer are discarded.
    pub fn replace_from_bytes(&mut self, data: &[u8]) -> Result<(), CoreError> {
        let portfolio = StorageManager::load_from_bytes(data)?;
        self.replace(portfolio);
        Ok(())
    }

    /// File variant of [`replace_from_bytes`](Self::replace_from_bytes).
    pub fn replace_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let portfolio = StorageManager::load_from_file(path)?;
        self.replace(portfolio);
        Ok(())
    }

    // ── Asset Management ────────────────────────────────────────────

    /// Add an asset with a 0% target. Rejects empty or duplicate names and
    /// non-positive quantity or price.
    pub fn add_asset(&mut self, name: &str, quantity: f64, price: f64) -> Result<AssetId, CoreError> {
        let id = self
            .portfolio_service
            .add_asset(&mut self.portfolio, name, quantity, price)?;
        self.touch();
        Ok(id)
    }

    /// Remove the asset at `index` and its target.
    pub fn remove_asset_at(&mut self, index: usize) -> Result<Asset, CoreError> {
        let asset = self
            .portfolio_service
            .remove_asset_at(&mut self.portfolio, index)?;
        self.touch();
        Ok(asset)
    }

    /// Remove an asset by id and its target.
    pub fn remove_asset(&mut self, id: AssetId) -> Result<Asset, CoreError> {
        let asset = self.portfolio_service.remove_asset(&mut self.portfolio, id)?;
        self.touch();
        Ok(asset)
    }

    pub fn rename_asset(&mut self, id: AssetId, new_name: &str) -> Result<(), CoreError> {
        self.portfolio_service
            .rename_asset(&mut self.portfolio, id, new_name)?;
        self.touch();
        Ok(())
    }

    /// Overwrite quantity and unit price of an existing asset.
    pub fn update_asset(&mut self, id: AssetId, quantity: f64, price: f64) -> Result<(), CoreError> {
        self.portfolio_service
            .update_asset(&mut self.portfolio, id, quantity, price)?;
        self.touch();
        Ok(())
    }

    /// Set the target percentage for an asset (negative values clamp to 0).
    /// Returns the stored value.
    pub fn set_target(&mut self, id: AssetId, percent: f64) -> Result<f64, CoreError> {
        let stored = self
            .portfolio_service
            .set_target(&mut self.portfolio, id, percent)?;
        self.plan = None;
        Ok(stored)
    }

    /// Reset every target to 0%.
    pub fn reset_targets(&mut self) {
        self.portfolio.targets.reset();
        self.plan = None;
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        self.portfolio.ledger.assets()
    }

    #[must_use]
    pub fn get_asset(&self, id: AssetId) -> Option<&Asset> {
        self.portfolio.ledger.get(id)
    }

    /// Id of the asset at a ledger position.
    #[must_use]
    pub fn asset_id_at(&self, index: usize) -> Option<AssetId> {
        self.portfolio.ledger.get_at(index).map(|a| a.id)
    }

    #[must_use]
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.portfolio.ledger.find_by_name(name)
    }

    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.portfolio.ledger.len()
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.portfolio.ledger
    }

    #[must_use]
    pub fn targets(&self) -> &TargetAllocations {
        &self.portfolio.targets
    }

    #[must_use]
    pub fn target_percent(&self, id: AssetId) -> Option<f64> {
        self.portfolio.targets.get(id)
    }

    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.portfolio.ledger.total_value()
    }

    #[must_use]
    pub fn total_target_percent(&self) -> f64 {
        self.portfolio.targets.total_percent()
    }

    #[must_use]
    pub fn is_allocation_valid(&self) -> bool {
        self.portfolio.targets.is_valid()
    }

    // ── Rebalancing ─────────────────────────────────────────────────

    /// Compute a rebalance plan and keep it as the current plan.
    ///
    /// If the targets do not sum to 100%, the current action list is cleared,
    /// the previous extra-capital figure is kept and the error is returned
    /// for the caller to surface.
    pub fn rebalance(&mut self) -> Result<&RebalancePlan, CoreError> {
        self.plan = None;
        let plan = self.rebalance_service.compute(
            &self.portfolio.ledger,
            &self.portfolio.targets,
            self.settings.unit_policy,
        )?;
        info!(
            "Computed {} rebalance actions, extra capital {:.2}",
            plan.actions.len(),
            plan.extra_capital
        );
        self.extra_capital = plan.extra_capital;
        Ok(&*self.plan.insert(plan))
    }

    /// Compute a plan without storing it.
    pub fn preview_rebalance(&self) -> Result<RebalancePlan, CoreError> {
        self.rebalance_service.compute(
            &self.portfolio.ledger,
            &self.portfolio.targets,
            self.settings.unit_policy,
        )
    }

    #[must_use]
    pub fn plan(&self) -> Option<&RebalancePlan> {
        self.plan.as_ref()
    }

    /// Actions of the current plan; empty when there is none.
    #[must_use]
    pub fn actions(&self) -> &[RebalanceAction] {
        self.plan.as_ref().map(|p| p.actions.as_slice()).unwrap_or(&[])
    }

    /// Extra capital from the last successful rebalance (0 before the first).
    #[must_use]
    pub fn extra_capital(&self) -> f64 {
        self.extra_capital
    }

    // ── Apply / Rollback ────────────────────────────────────────────

    /// Apply the current plan to the ledger quantities.
    ///
    /// The portfolio is snapshotted into the undo slot first, replacing any
    /// earlier snapshot. Over-sells clamp the quantity to 0. The plan is
    /// consumed. Returns the number of actions applied.
    pub fn apply_plan(&mut self) -> Result<usize, CoreError> {
        let plan = match self.plan.take() {
            Some(plan) if !plan.is_empty() => plan,
            _ => return Err(CoreError::NothingToApply),
        };

        self.undo = Some(PortfolioSnapshot::capture(&self.portfolio));
        let applied = self.portfolio.ledger.apply_actions(&plan.actions);
        self.dirty = true;
        info!("Applied {applied} rebalance actions");
        Ok(applied)
    }

    /// Restore the portfolio as it was before the last apply.
    /// Returns when the snapshot was taken, or `None` if there is nothing to undo.
    pub fn rollback(&mut self) -> Option<DateTime<Utc>> {
        let snapshot = self.undo.take()?;
        self.portfolio = snapshot.portfolio;
        self.plan = None;
        self.dirty = true;
        info!("Rolled back to snapshot taken at {}", snapshot.taken_at);
        Some(snapshot.taken_at)
    }

    #[must_use]
    pub fn can_rollback(&self) -> bool {
        self.undo.is_some()
    }

    /// When the pending undo snapshot was taken.
    #[must_use]
    pub fn undo_taken_at(&self) -> Option<DateTime<Utc>> {
        self.undo.as_ref().map(|s| s.taken_at)
    }

    // ── Summary ─────────────────────────────────────────────────────

    /// Current versus target allocation per asset.
    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        self.summary_service.summarize(&self.portfolio)
    }

    // ── Settings & Dirty State ──────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Switch between whole and fractional units. Discards the current plan.
    pub fn set_unit_policy(&mut self, policy: UnitPolicy) {
        if self.settings.unit_policy != policy {
            self.settings.unit_policy = policy;
            self.plan = None;
        }
    }

    /// Returns `true` if the portfolio has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export the current plan as a JSON string (`null` when there is none).
    pub fn export_plan_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.plan)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize plan to JSON: {e}")))
    }

    /// Export the current plan as a CSV string.
    /// Columns: name, action, current_value, target_value, diff_value, units
    #[must_use]
    pub fn export_plan_to_csv(&self) -> String {
        let mut csv = String::from("name,action,current_value,target_value,diff_value,units\n");
        for action in self.actions() {
            let escaped_name = if action.name.contains(',') || action.name.contains('"') {
                format!("\"{}\"", action.name.replace('"', "\"\""))
            } else {
                action.name.clone()
            };
            csv.push_str(&format!(
                "{},{},{:.2},{:.2},{:.2},{}\n",
                escaped_name,
                action.action_type(),
                action.current_value,
                action.target_value,
                action.diff_value,
                action.units,
            ));
        }
        csv
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio, settings: Settings) -> Self {
        Self {
            portfolio,
            settings,
            portfolio_service: PortfolioService::new(),
            rebalance_service: RebalanceService::new(),
            summary_service: SummaryService::new(),
            plan: None,
            extra_capital: 0.0,
            undo: None,
            dirty: false,
        }
    }

    fn replace(&mut self, portfolio: Portfolio) {
        self.portfolio = portfolio;
        self.plan = None;
        self.undo = None;
        self.dirty = false;
    }

    /// Record a ledger mutation: the current plan no longer matches the inputs.
    fn touch(&mut self) {
        self.plan = None;
        self.dirty = true;
    }
}
