use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::ledger::Ledger;

/// Indentation used for saved documents.
pub const INDENT: &[u8] = b"    ";

/// On-disk representation of a portfolio.
///
/// Layout:
/// ```text
/// { "assets": [ { "name": "VTI", "quantity": 10.0, "price": 250.0 }, ... ] }
/// ```
///
/// Only the ledger is stored. Asset ids are regenerated and targets reset
/// to zero on every load. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    pub assets: Vec<AssetRecord>,
}

/// One persisted asset. All three fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

impl From<&Asset> for AssetRecord {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            quantity: asset.quantity,
            price: asset.price,
        }
    }
}

impl PortfolioDocument {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            assets: ledger.iter().map(AssetRecord::from).collect(),
        }
    }

    /// Validate every record and build a ledger with fresh asset ids.
    ///
    /// Rules per record: non-empty name, finite `quantity >= 0`,
    /// finite `price > 0`, name not repeated (case-insensitive).
    pub fn into_ledger(self) -> Result<Ledger, CoreError> {
        let mut assets: Vec<Asset> = Vec::with_capacity(self.assets.len());

        for (i, record) in self.assets.into_iter().enumerate() {
            let name = record.name.trim();
            if name.is_empty() {
                return Err(CoreError::InvalidFileFormat(format!(
                    "Asset #{} has an empty name",
                    i + 1
                )));
            }
            if !record.quantity.is_finite() || record.quantity < 0.0 {
                return Err(CoreError::InvalidFileFormat(format!(
                    "Asset '{name}' has invalid quantity {}",
                    record.quantity
                )));
            }
            if !record.price.is_finite() || record.price <= 0.0 {
                return Err(CoreError::InvalidFileFormat(format!(
                    "Asset '{name}' has invalid price {}",
                    record.price
                )));
            }
            if assets.iter().any(|a| a.has_name(name)) {
                return Err(CoreError::InvalidFileFormat(format!(
                    "Asset name '{name}' appears more than once"
                )));
            }
            assets.push(Asset::new(name, record.quantity, record.price));
        }

        Ok(Ledger::from_assets(assets))
    }
}

/// Encode a ledger as an indented JSON document.
pub fn write_document(ledger: &Ledger) -> Result<Vec<u8>, CoreError> {
    let document = PortfolioDocument::from_ledger(ledger);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))?;
    buf.push(b'\n');
    Ok(buf)
}

/// Decode and validate a JSON document into a ledger.
pub fn read_document(data: &[u8]) -> Result<Ledger, CoreError> {
    let document: PortfolioDocument = serde_json::from_slice(data)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse portfolio: {e}")))?;
    document.into_ledger()
}
