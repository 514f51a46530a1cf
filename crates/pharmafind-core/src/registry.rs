//! Pharmacy registry.
//!
//! Pharmacies are identified by name, compared case-insensitively.
//! Registration is find-or-create: the first registration of a name decides
//! its id, address, phone and coordinates.

use std::collections::HashMap;

use crate::db::RecordStore;
use crate::models::{Coordinate, Pharmacy, PharmacyDetails};

/// Registry manager over a record store plus the configured seed pharmacies.
pub struct RegistryManager<'a> {
    store: &'a dyn RecordStore,
    seeds: &'a [Pharmacy],
    id_baseline: i64,
}

impl<'a> RegistryManager<'a> {
    /// Create a new registry manager.
    pub fn new(store: &'a dyn RecordStore, seeds: &'a [Pharmacy], id_baseline: i64) -> Self {
        Self {
            store,
            seeds,
            id_baseline,
        }
    }

    /// Return the pharmacy registered under `details.name`, registering it
    /// at `location` if the name is new.
    pub fn find_or_create(&self, details: PharmacyDetails, location: Coordinate) -> Pharmacy {
        let mut state = self.store.load();

        if let Some(existing) = find_by_name(self.seeds, &state.registry, &details.name) {
            tracing::debug!(id = existing.id, name = %existing.name, "pharmacy already registered");
            return existing.clone();
        }

        let id = next_id(self.seeds, &state.registry, self.id_baseline);
        let pharmacy = Pharmacy::from_details(id, details, location);
        state.registry.push(pharmacy.clone());
        self.store.save(&state);

        tracing::info!(id, name = %pharmacy.name, "registered pharmacy");
        pharmacy
    }

    /// All pharmacies, one per name, sorted by name.
    pub fn list(&self) -> Vec<Pharmacy> {
        let state = self.store.load();
        dedup_by_name(self.seeds, &state.registry)
    }

    /// Look up a pharmacy by id.
    pub fn get(&self, id: i64) -> Option<Pharmacy> {
        let state = self.store.load();
        self.seeds
            .iter()
            .chain(state.registry.iter())
            .rev()
            .find(|p| p.id == id)
            .cloned()
    }
}

/// Find a pharmacy by name across seeds and registered entries.
///
/// Registered entries are searched first so they shadow a seed of the same
/// name, matching [`dedup_by_name`].
pub fn find_by_name<'p>(
    seeds: &'p [Pharmacy],
    registry: &'p [Pharmacy],
    name: &str,
) -> Option<&'p Pharmacy> {
    registry
        .iter()
        .chain(seeds.iter())
        .find(|p| p.has_name(name))
}

/// Next free id: one above every known id and above the baseline.
pub fn next_id(seeds: &[Pharmacy], registry: &[Pharmacy], id_baseline: i64) -> i64 {
    seeds
        .iter()
        .chain(registry.iter())
        .map(|p| p.id)
        .fold(id_baseline, i64::max)
        + 1
}

/// Merge seeds and registered entries into one list, keeping the later entry
/// for each case-folded name, sorted by name for display.
pub fn dedup_by_name(seeds: &[Pharmacy], registry: &[Pharmacy]) -> Vec<Pharmacy> {
    let mut by_name: HashMap<String, &Pharmacy> = HashMap::new();
    for pharmacy in seeds.iter().chain(registry.iter()) {
        by_name.insert(pharmacy.name_key(), pharmacy);
    }

    let mut pharmacies: Vec<Pharmacy> = by_name.into_values().cloned().collect();
    pharmacies.sort_by(|a, b| {
        a.name_key()
            .cmp(&b.name_key())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    pharmacies
}
