//! Domain models for the pharmafind system.

mod inventory;
mod pharmacy;
mod ranking;

pub use inventory::*;
pub use pharmacy::*;
pub use ranking::*;

use serde::{Deserialize, Serialize};

/// Everything the record store persists, read and written as one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreState {
    /// Owner-registered pharmacies (pre-seeded ones come from configuration)
    #[serde(default)]
    pub registry: Vec<Pharmacy>,
    /// Medicine key → per-pharmacy stock entries
    #[serde(default)]
    pub index: InventoryIndex,
}

impl StoreState {
    /// True when nothing has been registered or uploaded yet.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.index.is_empty()
    }
}
