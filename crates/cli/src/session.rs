//! Interactive command loop.
//!
//! The session owns the [`PortfolioManager`] and only transient UI state
//! (default file path, pending-quit flag). Each input line is parsed with
//! clap and dispatched to the manager; errors are printed and the loop
//! continues.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use portfolio_rebalancer_core::errors::CoreError;
use portfolio_rebalancer_core::models::asset::AssetId;
use portfolio_rebalancer_core::models::settings::UnitPolicy;
use portfolio_rebalancer_core::PortfolioManager;

use crate::error::{Error, Result};
use crate::render;

/// One session input line.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum SessionCommand {
    /// Add an asset (quote names containing spaces)
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Remove the asset at a position (1-based)
    #[command(alias = "rm")]
    Remove { index: usize },
    /// Rename the asset at a position
    Rename { index: usize, name: String },
    /// Overwrite quantity and price of the asset at a position
    Update {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Set the target percentage of the asset at a position
    Target {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },
    /// Show assets and targets
    #[command(alias = "ls")]
    List,
    /// Show current versus target allocation
    Summary,
    /// Compute rebalance actions
    Rebalance,
    /// Apply the last computed actions to the quantities
    Apply,
    /// Undo the last apply
    #[command(alias = "undo")]
    Rollback,
    /// Switch between whole and fractional units
    Units { policy: UnitPolicy },
    /// Save the portfolio (default file when no path is given)
    Save { path: Option<PathBuf> },
    /// Load a portfolio, replacing the current one
    Load { path: Option<PathBuf> },
    /// Print the last plan as CSV or JSON
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
    },
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session<W: Write> {
    manager: PortfolioManager,
    default_path: PathBuf,
    /// Set after a quit was refused because of unsaved changes.
    quit_warned: bool,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(manager: PortfolioManager, default_path: PathBuf, out: W) -> Self {
        Self {
            manager,
            default_path,
            quit_warned: false,
            out,
        }
    }

    #[cfg(test)]
    pub fn manager(&self) -> &PortfolioManager {
        &self.manager
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Read commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, prompt: bool) -> Result<()> {
        if prompt {
            self.show_prompt()?;
        }
        for line in input.lines() {
            let line = line?;
            if self.execute_line(&line)? == Flow::Exit {
                break;
            }
            if prompt {
                self.show_prompt()?;
            }
        }
        Ok(())
    }

    /// Parse and run one input line. Command failures are reported to the
    /// output; only terminal I/O errors are returned.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let args = match split_args(line) {
            Ok(args) => args,
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                return Ok(Flow::Continue);
            }
        };
        if args.is_empty() {
            return Ok(Flow::Continue);
        }

        let command = match Line::try_parse_from(&args) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // clap renders help and usage errors alike
                write!(self.out, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
        };
        debug!("Session command: {command:?}");

        if command != SessionCommand::Quit {
            self.quit_warned = false;
        }

        match self.dispatch(command) {
            Ok(flow) => Ok(flow),
            Err(Error::Io(e)) => Err(Error::Io(e)),
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, command: SessionCommand) -> Result<Flow> {
        match command {
            SessionCommand::Add {
                name,
                quantity,
                price,
            } => {
                self.manager.add_asset(&name, quantity, price)?;
                writeln!(self.out, "Added {}", name.trim())?;
            }
            SessionCommand::Remove { index } => {
                let removed = self.manager.remove_asset_at(to_position(index)?)?;
                writeln!(self.out, "Removed {}", removed.name)?;
            }
            SessionCommand::Rename { index, name } => {
                let id = self.id_at(index)?;
                self.manager.rename_asset(id, &name)?;
                writeln!(self.out, "Renamed #{index} to {}", name.trim())?;
            }
            SessionCommand::Update {
                index,
                quantity,
                price,
            } => {
                let id = self.id_at(index)?;
                self.manager.update_asset(id, quantity, price)?;
                writeln!(self.out, "Updated #{index}")?;
            }
            SessionCommand::Target { index, percent } => {
                let id = self.id_at(index)?;
                let stored = self.manager.set_target(id, percent)?;
                writeln!(
                    self.out,
                    "Target #{index} set to {stored:.2}% (total {:.2}%)",
                    self.manager.total_target_percent()
                )?;
            }
            SessionCommand::List => render::assets(&mut self.out, &self.manager)?,
            SessionCommand::Summary => {
                let summary = self.manager.summary();
                render::summary(&mut self.out, &summary)?;
            }
            SessionCommand::Rebalance => match self.manager.rebalance() {
                Ok(plan) => render::plan(&mut self.out, plan)?,
                Err(e @ CoreError::InvalidAllocation { .. }) => {
                    writeln!(self.out, "Error: {e}")?;
                    render::extra_capital(&mut self.out, self.manager.extra_capital())?;
                }
                Err(e) => return Err(e.into()),
            },
            SessionCommand::Apply => {
                let applied = self.manager.apply_plan()?;
                writeln!(self.out, "Applied {applied} actions (use `rollback` to undo)")?;
            }
            SessionCommand::Rollback => match self.manager.rollback() {
                Some(taken_at) => writeln!(
                    self.out,
                    "Restored portfolio from {}",
                    taken_at.format("%Y-%m-%d %H:%M:%S UTC")
                )?,
                None => writeln!(self.out, "Nothing to roll back")?,
            },
            SessionCommand::Units { policy } => {
                self.manager.set_unit_policy(policy);
                writeln!(self.out, "Unit policy: {policy}")?;
            }
            SessionCommand::Save { path } => {
                let path = path.unwrap_or_else(|| self.default_path.clone());
                self.manager.save_to_file(&path)?;
                writeln!(self.out, "Saved to {}", path.display())?;
            }
            SessionCommand::Load { path } => {
                let path = path.unwrap_or_else(|| self.default_path.clone());
                self.manager.replace_from_file(&path)?;
                writeln!(
                    self.out,
                    "Loaded {} assets from {} (targets reset to 0%)",
                    self.manager.asset_count(),
                    path.display()
                )?;
            }
            SessionCommand::Export { format } => match format {
                ExportFormat::Csv => write!(self.out, "{}", self.manager.export_plan_to_csv())?,
                ExportFormat::Json => writeln!(self.out, "{}", self.manager.export_plan_to_json()?)?,
            },
            SessionCommand::Quit => {
                if self.manager.has_unsaved_changes() && !self.quit_warned {
                    self.quit_warned = true;
                    writeln!(
                        self.out,
                        "Unsaved changes. Use `save`, or `quit` again to discard them."
                    )?;
                } else {
                    return Ok(Flow::Exit);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn id_at(&self, index: usize) -> Result<AssetId> {
        let position = to_position(index)?;
        self.manager.asset_id_at(position).ok_or_else(|| {
            Error::Usage(format!(
                "no asset #{index} (portfolio holds {})",
                self.manager.asset_count()
            ))
        })
    }

    fn show_prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Convert a 1-based UI index into a ledger position.
fn to_position(index: usize) -> Result<usize> {
    index
        .checked_sub(1)
        .ok_or_else(|| Error::Usage("asset numbers start at 1".into()))
}

/// Split a line on whitespace, keeping double-quoted runs together.
fn split_args(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".into());
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<Vec<u8>> {
        Session::new(
            PortfolioManager::create_new(),
            PathBuf::from("portfolio.json"),
            Vec::new(),
        )
    }

    fn run_script(session: &mut Session<Vec<u8>>, script: &str) {
        session.run(script.as_bytes(), false).unwrap();
    }

    fn output(session: Session<Vec<u8>>) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn split_args_handles_quotes() {
        assert_eq!(
            split_args(r#"add "Gold ETF" 3 150"#).unwrap(),
            vec!["add", "Gold ETF", "3", "150"]
        );
        assert_eq!(split_args("  list  ").unwrap(), vec!["list"]);
        assert_eq!(split_args(r#"rename 1 """#).unwrap(), vec!["rename", "1", ""]);
        assert!(split_args(r#"add "open 1 2"#).is_err());
        assert!(split_args("").unwrap().is_empty());
    }

    #[test]
    fn parses_negative_target() {
        let line = Line::try_parse_from(["target", "2", "-5"]).unwrap();
        assert_eq!(
            line.command,
            SessionCommand::Target {
                index: 2,
                percent: -5.0
            }
        );
    }

    #[test]
    fn parses_units_policy() {
        let line = Line::try_parse_from(["units", "fractional"]).unwrap();
        assert_eq!(
            line.command,
            SessionCommand::Units {
                policy: UnitPolicy::Fractional
            }
        );
    }

    #[test]
    fn full_rebalance_flow() {
        let mut s = session();
        run_script(
            &mut s,
            "add A 10 10\nadd B 5 20\ntarget 1 70\ntarget 2 30\nrebalance\napply\n",
        );
        let assets = s.manager().assets();
        assert_eq!(assets[0].quantity, 14.0);
        assert_eq!(assets[1].quantity, 3.0);
        let text = output(s);
        assert!(text.contains("Extra capital: 0.00"));
        assert!(text.contains("Applied 2 actions"));
    }

    #[test]
    fn invalid_targets_report_error_and_keep_going() {
        let mut s = session();
        run_script(&mut s, "add A 10 10\ntarget 1 99\nrebalance\nlist\n");
        assert!(s.manager().actions().is_empty());
        let text = output(s);
        assert!(text.contains("Target allocations sum to 99.00%"));
        assert!(text.contains("Total value: 100.00"));
    }

    #[test]
    fn zero_index_is_a_usage_error() {
        let mut s = session();
        run_script(&mut s, "add A 1 1\nremove 0\n");
        assert_eq!(s.manager().asset_count(), 1);
        assert!(output(s).contains("asset numbers start at 1"));
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut s = session();
        run_script(&mut s, "add A 1 1\nadd a 2 2\n");
        assert_eq!(s.manager().asset_count(), 1);
        assert!(output(s).contains("already exists"));
    }

    #[test]
    fn rollback_restores_quantities() {
        let mut s = session();
        run_script(
            &mut s,
            "add A 10 10\nadd B 5 20\ntarget 1 70\ntarget 2 30\nrebalance\napply\nrollback\n",
        );
        assert_eq!(s.manager().assets()[0].quantity, 10.0);
        assert_eq!(s.manager().assets()[1].quantity, 5.0);
        assert!(output(s).contains("Restored portfolio from"));
    }

    #[test]
    fn quit_with_unsaved_changes_needs_confirmation() {
        let mut s = session();
        assert_eq!(s.execute_line("add A 1 1").unwrap(), Flow::Continue);
        assert_eq!(s.execute_line("quit").unwrap(), Flow::Continue);
        assert_eq!(s.execute_line("exit").unwrap(), Flow::Exit);
    }

    #[test]
    fn quit_on_clean_session_exits() {
        let mut s = session();
        assert_eq!(s.execute_line("quit").unwrap(), Flow::Exit);
    }

    #[test]
    fn save_and_load_through_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut s = Session::new(PortfolioManager::create_new(), path.clone(), Vec::new());
        run_script(&mut s, "add \"Gold ETF\" 3 150\ntarget 1 100\nsave\nremove 1\nload\n");
        let assets = s.manager().assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "Gold ETF");
        assert_eq!(s.manager().target_percent(assets[0].id), Some(0.0));
        assert!(!s.manager().has_unsaved_changes());
    }

    #[test]
    fn failed_load_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ \"assets\": 5 }").unwrap();
        let mut s = session();
        run_script(&mut s, &format!("add A 1 1\nload {}\n", bad.display()));
        assert_eq!(s.manager().asset_count(), 1);
        assert!(output(s).contains("Error:"));
    }

    #[test]
    fn unknown_command_prints_usage() {
        let mut s = session();
        assert_eq!(s.execute_line("frobnicate").unwrap(), Flow::Continue);
        assert!(!output(s).is_empty());
    }
}
