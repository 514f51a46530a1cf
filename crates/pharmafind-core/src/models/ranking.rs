//! Nearby-match result models.

use serde::{Deserialize, Serialize};

use super::{Pharmacy, StockStatus};

/// A pharmacy projected for one nearby-match query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedPharmacy {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    /// Distance from the query point in km, rounded to one decimal
    pub distance: f64,
    /// Price per strip, 0 when the pharmacy does not list the medicine
    pub price: f64,
    /// "per strip" for listed medicines, "-" otherwise
    pub price_unit: String,
    pub stock: StockStatus,
    /// Set on at most one entry per result set
    pub is_best_option: bool,
}

impl RankedPharmacy {
    pub fn is_available(&self) -> bool {
        self.stock.is_available()
    }

    /// Combined distance/price score; lower is better.
    pub fn score(&self, distance_weight: f64) -> f64 {
        self.distance * distance_weight + self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score() {
        let ranked = RankedPharmacy {
            pharmacy: Pharmacy {
                id: 1,
                name: "A".into(),
                address: String::new(),
                phone: String::new(),
                lat: 0.0,
                lon: 0.0,
            },
            distance: 2.0,
            price: 50.0,
            price_unit: "per strip".into(),
            stock: StockStatus::Available,
            is_best_option: false,
        };
        assert_eq!(ranked.score(10.0), 70.0);
        assert_eq!(ranked.score(0.0), 50.0);
    }
}
