//! Plain-text tables for the session output.

use std::io::{self, Write};

use portfolio_rebalancer_core::models::action::RebalancePlan;
use portfolio_rebalancer_core::models::summary::PortfolioSummary;
use portfolio_rebalancer_core::PortfolioManager;

/// Asset table: position, name, quantity, price, value, target.
pub fn assets(out: &mut impl Write, manager: &PortfolioManager) -> io::Result<()> {
    if manager.asset_count() == 0 {
        return writeln!(out, "No assets. Use `add <name> <quantity> <price>`.");
    }

    writeln!(
        out,
        "{:>3}  {:<20} {:>12} {:>12} {:>14} {:>8}",
        "#", "Name", "Quantity", "Price", "Value", "Target"
    )?;
    for (i, asset) in manager.assets().iter().enumerate() {
        let target = manager.target_percent(asset.id).unwrap_or(0.0);
        writeln!(
            out,
            "{:>3}  {:<20} {:>12.4} {:>12.2} {:>14.2} {:>7.2}%",
            i + 1,
            asset.name,
            asset.quantity,
            asset.price,
            asset.value(),
            target
        )?;
    }
    writeln!(out, "Total value: {:.2}", manager.total_value())?;

    let total = manager.total_target_percent();
    if manager.is_allocation_valid() {
        writeln!(out, "Targets: {total:.2}%")
    } else {
        writeln!(out, "Targets: {total:.2}% (must sum to 100% to rebalance)")
    }
}

/// Rebalance actions with the extra-capital line.
pub fn plan(out: &mut impl Write, plan: &RebalancePlan) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>6} {:>14} {:>14} {:>14} {:>12}",
        "Name", "Action", "Current", "Target", "Diff", "Units"
    )?;
    for action in &plan.actions {
        writeln!(
            out,
            "{:<20} {:>6} {:>14.2} {:>14.2} {:>+14.2} {:>12}",
            action.name,
            action.action_type().to_string(),
            action.current_value,
            action.target_value,
            action.diff_value,
            format_units(action.units),
        )?;
    }
    extra_capital(out, plan.extra_capital)
}

pub fn extra_capital(out: &mut impl Write, amount: f64) -> io::Result<()> {
    if amount > 0.0 {
        writeln!(out, "Extra capital needed: {amount:.2}")
    } else if amount < 0.0 {
        writeln!(out, "Capital freed: {:.2}", -amount)
    } else {
        writeln!(out, "Extra capital: 0.00")
    }
}

/// Current versus target allocation per asset.
pub fn summary(out: &mut impl Write, summary: &PortfolioSummary) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>14} {:>9} {:>9} {:>9}",
        "Name", "Value", "Current", "Target", "Drift"
    )?;
    for h in &summary.holdings {
        writeln!(
            out,
            "{:<20} {:>14.2} {:>8.2}% {:>8.2}% {:>+8.2}%",
            h.name, h.value, h.allocation_pct, h.target_pct, h.drift_pct
        )?;
    }
    writeln!(
        out,
        "Total value: {:.2}  Targets: {:.2}%{}",
        summary.total_value,
        summary.total_target_percent,
        if summary.allocation_valid { "" } else { " (invalid)" }
    )
}

/// Whole numbers print without decimals; fractional ones keep four.
fn format_units(units: f64) -> String {
    // -0.0 from rounding small sells
    let units = if units == 0.0 { 0.0 } else { units };
    if units.fract() == 0.0 {
        format!("{units:+.0}")
    } else {
        format!("{units:+.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_formatting() {
        assert_eq!(format_units(4.0), "+4");
        assert_eq!(format_units(-2.0), "-2");
        assert_eq!(format_units(0.0), "+0");
        assert_eq!(format_units(-0.0), "+0");
        assert_eq!(format_units(1.25), "+1.2500");
    }

    #[test]
    fn extra_capital_wording() {
        let mut buf = Vec::new();
        extra_capital(&mut buf, 12.5).unwrap();
        extra_capital(&mut buf, -3.0).unwrap();
        extra_capital(&mut buf, 0.0).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Extra capital needed: 12.50"));
        assert!(text.contains("Capital freed: 3.00"));
        assert!(text.contains("Extra capital: 0.00"));
    }

    #[test]
    fn empty_ledger_hint() {
        let manager = PortfolioManager::create_new();
        let mut buf = Vec::new();
        assets(&mut buf, &manager).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("No assets."));
    }
}
