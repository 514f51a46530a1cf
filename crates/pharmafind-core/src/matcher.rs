//! Nearby-match engine.
//!
//! Given a location and a medicine, every known pharmacy is projected with
//! its distance and its listing for the medicine, then:
//!
//! 1. pharmacies with the medicine available are always returned
//! 2. the rest are sorted by distance and appended until the result cap
//! 3. the available pharmacy with the lowest `distance * weight + price` is
//!    flagged as the best option (ties go to the first encountered)
//!
//! The returned list is not sorted further; presentation order is up to the
//! caller.

use std::collections::HashMap;

use crate::db::RecordStore;
use crate::geo::{distance_km, round_to_tenth};
use crate::models::{Coordinate, Pharmacy, RankedPharmacy, StockEntry, StockStatus};
use crate::registry::dedup_by_name;
use crate::settings::MatchConfig;

/// Nearby-match engine over a record store plus the configured seeds.
pub struct NearbyMatcher<'a> {
    store: &'a dyn RecordStore,
    seeds: &'a [Pharmacy],
    config: &'a MatchConfig,
}

impl<'a> NearbyMatcher<'a> {
    /// Create a new matcher.
    pub fn new(store: &'a dyn RecordStore, seeds: &'a [Pharmacy], config: &'a MatchConfig) -> Self {
        Self {
            store,
            seeds,
            config,
        }
    }

    /// Rank pharmacies near `location` for `medicine_name`.
    pub fn find_nearby(&self, location: Coordinate, medicine_name: &str) -> Vec<RankedPharmacy> {
        let state = self.store.load();
        let pharmacies = dedup_by_name(self.seeds, &state.registry);
        let entries = state.index.entries(medicine_name);

        let results = rank_pharmacies(pharmacies, entries, location, self.config);
        tracing::debug!(
            medicine = medicine_name,
            results = results.len(),
            available = results.iter().filter(|r| r.is_available()).count(),
            "nearby match"
        );
        results
    }
}

/// Project, partition, truncate and pick the best option.
pub fn rank_pharmacies(
    pharmacies: Vec<Pharmacy>,
    entries: &[StockEntry],
    location: Coordinate,
    config: &MatchConfig,
) -> Vec<RankedPharmacy> {
    let listings: HashMap<i64, &StockEntry> =
        entries.iter().map(|e| (e.pharmacy_id, e)).collect();

    let (mut available, mut other): (Vec<RankedPharmacy>, Vec<RankedPharmacy>) = pharmacies
        .into_iter()
        .map(|pharmacy| {
            let listing = listings.get(&pharmacy.id).copied();
            project(pharmacy, listing, location, config)
        })
        .partition(RankedPharmacy::is_available);

    // Stable, so equidistant pharmacies keep name order
    other.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    if let Some(best) = best_option_index(&available, config.distance_weight) {
        available[best].is_best_option = true;
    }

    let room = config.result_cap.saturating_sub(available.len());
    other.truncate(room);

    available.extend(other);
    available
}

/// Index of the lowest-scoring entry; the first one wins ties.
pub fn best_option_index(available: &[RankedPharmacy], distance_weight: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in available.iter().enumerate() {
        let score = candidate.score(distance_weight);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

fn project(
    pharmacy: Pharmacy,
    listing: Option<&StockEntry>,
    location: Coordinate,
    config: &MatchConfig,
) -> RankedPharmacy {
    let distance = round_to_tenth(distance_km(location, pharmacy.location()));

    let (price, price_unit, stock) = match listing {
        Some(entry) => (entry.price, config.listed_price_unit.clone(), entry.stock),
        None => (0.0, config.unlisted_price_unit.clone(), StockStatus::Unavailable),
    };

    RankedPharmacy {
        pharmacy,
        distance,
        price,
        price_unit,
        stock,
        is_best_option: false,
    }
}
