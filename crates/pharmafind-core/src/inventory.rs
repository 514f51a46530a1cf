//! Inventory index manager.
//!
//! Each operation is one load → mutate → save cycle over the record store.
//! Inputs are assumed validated (see [`crate::validation`]).

use crate::db::RecordStore;
use crate::models::{InventoryItem, StockEntry, StockStatus};

/// Inventory manager over a record store.
pub struct InventoryManager<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> InventoryManager<'a> {
    /// Create a new inventory manager.
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Merge a batch of uploaded items into the index for one pharmacy.
    ///
    /// Items without a stock status are recorded as available. The store is
    /// written once for the whole batch.
    pub fn upsert_many(&self, pharmacy_id: i64, items: &[InventoryItem]) {
        let mut state = self.store.load();
        for item in items {
            state.index.upsert(
                pharmacy_id,
                &item.medicine_name,
                item.price,
                item.stock.unwrap_or_default(),
            );
        }
        self.store.save(&state);

        tracing::info!(pharmacy_id, items = items.len(), "inventory updated");
    }

    /// Change the stock status of an existing entry; unknown pairs are left
    /// alone. Returns whether an entry was updated.
    pub fn set_status(&self, pharmacy_id: i64, medicine_name: &str, stock: StockStatus) -> bool {
        let mut state = self.store.load();
        let updated = state.index.set_status(pharmacy_id, medicine_name, stock);
        if updated {
            self.store.save(&state);
        } else {
            tracing::debug!(pharmacy_id, medicine = medicine_name, "no entry to update");
        }
        updated
    }

    /// Drop the pharmacy's entry for a medicine. Returns whether anything
    /// was removed.
    pub fn remove(&self, pharmacy_id: i64, medicine_name: &str) -> bool {
        let mut state = self.store.load();
        let removed = state.index.remove(pharmacy_id, medicine_name);
        if removed {
            self.store.save(&state);
        }
        removed
    }

    /// True iff some pharmacy lists the medicine.
    pub fn has_medicine(&self, medicine_name: &str) -> bool {
        self.store.load().index.has_medicine(medicine_name)
    }

    /// The pharmacy's entry for a medicine, if any.
    pub fn entry_for(&self, pharmacy_id: i64, medicine_name: &str) -> Option<StockEntry> {
        self.store
            .load()
            .index
            .entry_for(pharmacy_id, medicine_name)
            .cloned()
    }

    /// All entries for a medicine, in upload order.
    pub fn entries(&self, medicine_name: &str) -> Vec<StockEntry> {
        self.store.load().index.entries(medicine_name).to_vec()
    }

    /// Every medicine the pharmacy lists, as (medicine key, entry) pairs.
    pub fn medicines_for(&self, pharmacy_id: i64) -> Vec<(String, StockEntry)> {
        self.store.load().index.medicines_for(pharmacy_id)
    }
}
