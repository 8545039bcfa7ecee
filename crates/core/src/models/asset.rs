use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an asset, generated when the asset is created.
///
/// Target allocations and rebalance actions refer to assets through this id,
/// never through the display name, so renaming an asset is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named holding: how many units are held and what one unit is worth.
///
/// Invariants (enforced by the ledger, not by this struct):
/// - `name` is non-empty and unique within its ledger (case-insensitive)
/// - `quantity >= 0`
/// - `price > 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: AssetId,

    /// Display name (e.g., "VTI", "Gold ETF", "Cash")
    pub name: String,

    /// Units held
    pub quantity: f64,

    /// Price of a single unit
    pub price: f64,
}

impl Asset {
    pub fn new(name: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            id: AssetId::new(),
            name: name.into().trim().to_string(),
            quantity,
            price,
        }
    }

    /// Market value of the holding: `quantity * price`.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }

    /// Case-insensitive name comparison used for duplicate detection.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}
