use std::path::Path;

use log::info;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::portfolio::Portfolio;

use super::format;

/// High-level storage operations: save/load a portfolio to/from JSON bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Serialize the ledger to JSON bytes.
    ///
    /// Flow: Ledger → PortfolioDocument → indented JSON
    pub fn save_to_bytes(ledger: &Ledger) -> Result<Vec<u8>, CoreError> {
        format::write_document(ledger)
    }

    /// Parse JSON bytes into a fresh portfolio.
    ///
    /// Flow: JSON → PortfolioDocument → validated Ledger → Portfolio (all targets 0%)
    pub fn load_from_bytes(data: &[u8]) -> Result<Portfolio, CoreError> {
        let ledger = format::read_document(data)?;
        Ok(Portfolio::from_ledger(ledger))
    }

    /// Save the ledger to a JSON file on disk.
    pub fn save_to_file(ledger: &Ledger, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = Self::save_to_bytes(ledger)?;
        std::fs::write(path, bytes)?;
        info!("Saved {} assets to {}", ledger.len(), path.display());
        Ok(())
    }

    /// Load a portfolio from a JSON file on disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Portfolio, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let portfolio = Self::load_from_bytes(&bytes)?;
        info!(
            "Loaded {} assets from {}",
            portfolio.ledger.len(),
            path.display()
        );
        Ok(portfolio)
    }
}
