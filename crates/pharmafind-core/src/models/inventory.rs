//! Inventory index models.
//!
//! The index maps a medicine key (see [`medicine_key`]) to the stock entries
//! of every pharmacy carrying that medicine. Two invariants hold for every
//! [`InventoryIndex`] value, including ones read back from storage:
//!
//! - a medicine's collection holds at most one entry per pharmacy
//! - no medicine key maps to an empty collection

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Availability of a medicine at one pharmacy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum StockStatus {
    #[default]
    Available,
    Unavailable,
}

impl StockStatus {
    pub fn is_available(self) -> bool {
        matches!(self, StockStatus::Available)
    }
}

/// A pharmacy's price and availability for one medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockEntry {
    /// Registry id of the pharmacy
    pub pharmacy_id: i64,
    /// Price per strip, non-negative
    pub price: f64,
    /// Current availability
    pub stock: StockStatus,
}

/// One row of an owner's inventory upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub medicine_name: String,
    pub price: f64,
    /// Missing means the owner did not say; treated as available
    #[serde(default)]
    pub stock: Option<StockStatus>,
}

impl InventoryItem {
    pub fn new(medicine_name: impl Into<String>, price: f64) -> Self {
        Self {
            medicine_name: medicine_name.into(),
            price,
            stock: None,
        }
    }

    pub fn with_stock(mut self, stock: StockStatus) -> Self {
        self.stock = Some(stock);
        self
    }
}

/// Fold a medicine name into its index key. Every read and write of the
/// index goes through this, which is the same folding as pharmacy names.
pub use super::pharmacy::name_key as medicine_key;

type RawIndex = BTreeMap<String, Vec<StockEntry>>;

/// Medicine key → stock entries, one per pharmacy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawIndex", into = "RawIndex")]
pub struct InventoryIndex {
    medicines: RawIndex,
}

impl From<RawIndex> for InventoryIndex {
    /// Rebuild the invariants over an arbitrary map: keys are folded,
    /// colliding keys merged, duplicate pharmacy entries collapsed (later
    /// wins) and empty collections dropped.
    fn from(raw: RawIndex) -> Self {
        let mut index = InventoryIndex::default();
        for (name, entries) in raw {
            for entry in entries {
                index.upsert(entry.pharmacy_id, &name, entry.price, entry.stock);
            }
        }
        index
    }
}

impl From<InventoryIndex> for RawIndex {
    fn from(index: InventoryIndex) -> Self {
        index.medicines
    }
}

impl InventoryIndex {
    /// Number of distinct medicines in the index.
    pub fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
    }

    /// Stock entries for a medicine, empty if the medicine is unknown.
    pub fn entries(&self, medicine: &str) -> &[StockEntry] {
        self.medicines
            .get(&medicine_key(medicine))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over medicine keys in sorted order.
    pub fn medicines(&self) -> impl Iterator<Item = &str> {
        self.medicines.keys().map(String::as_str)
    }

    /// Create or overwrite the pharmacy's entry for a medicine.
    pub fn upsert(&mut self, pharmacy_id: i64, medicine: &str, price: f64, stock: StockStatus) {
        let entries = self.medicines.entry(medicine_key(medicine)).or_default();
        match entries.iter_mut().find(|e| e.pharmacy_id == pharmacy_id) {
            Some(entry) => {
                entry.price = price;
                entry.stock = stock;
            }
            None => entries.push(StockEntry {
                pharmacy_id,
                price,
                stock,
            }),
        }
    }

    /// Change the stock status of an existing entry.
    ///
    /// Returns false (and creates nothing) when the pair is unknown.
    pub fn set_status(&mut self, pharmacy_id: i64, medicine: &str, stock: StockStatus) -> bool {
        let entry = self
            .medicines
            .get_mut(&medicine_key(medicine))
            .and_then(|entries| entries.iter_mut().find(|e| e.pharmacy_id == pharmacy_id));

        match entry {
            Some(entry) => {
                entry.stock = stock;
                true
            }
            None => false,
        }
    }

    /// Remove the pharmacy's entry for a medicine, dropping the medicine key
    /// when its collection becomes empty.
    ///
    /// Returns false when there was nothing to remove.
    pub fn remove(&mut self, pharmacy_id: i64, medicine: &str) -> bool {
        let key = medicine_key(medicine);
        let Some(entries) = self.medicines.get_mut(&key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|e| e.pharmacy_id != pharmacy_id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            self.medicines.remove(&key);
        }
        removed
    }

    /// True iff at least one pharmacy has an entry for the medicine.
    pub fn has_medicine(&self, medicine: &str) -> bool {
        !self.entries(medicine).is_empty()
    }

    /// The pharmacy's entry for a medicine, if any.
    pub fn entry_for(&self, pharmacy_id: i64, medicine: &str) -> Option<&StockEntry> {
        self.entries(medicine)
            .iter()
            .find(|e| e.pharmacy_id == pharmacy_id)
    }

    /// Every medicine a pharmacy carries, sorted by medicine key.
    pub fn medicines_for(&self, pharmacy_id: i64) -> Vec<(String, StockEntry)> {
        self.medicines
            .iter()
            .filter_map(|(key, entries)| {
                entries
                    .iter()
                    .find(|e| e.pharmacy_id == pharmacy_id)
                    .map(|e| (key.clone(), e.clone()))
            })
            .collect()
    }
}
