//! Pharmacy registry models.

use serde::{Deserialize, Serialize};

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A pharmacy known to the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pharmacy {
    /// Registry-assigned identifier, never reused or changed
    pub id: i64,
    /// Display name; also the dedup key (compared case-insensitively)
    pub name: String,
    /// Street address as entered by the owner
    pub address: String,
    /// Contact phone number
    pub phone: String,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

/// Contact details supplied when an owner registers a pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PharmacyDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl PharmacyDetails {
    pub fn new(name: impl Into<String>, address: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
        }
    }
}

impl Pharmacy {
    /// Build a registry entry from registration details.
    pub fn from_details(id: i64, details: PharmacyDetails, location: Coordinate) -> Self {
        Self {
            id,
            name: details.name,
            address: details.address,
            phone: details.phone,
            lat: location.lat,
            lon: location.lon,
        }
    }

    /// The pharmacy's position.
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Case-folded name used for identity comparisons.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    /// Check whether this pharmacy answers to the given name.
    pub fn has_name(&self, name: &str) -> bool {
        self.name_key() == name_key(name)
    }
}

/// Fold a pharmacy name for identity comparisons.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
