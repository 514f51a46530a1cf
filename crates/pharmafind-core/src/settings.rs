//! Runtime configuration.
//!
//! Loaded from an optional TOML file, then overridden by `PHARMAFIND_*`
//! environment variables (nested keys separated by `__`, e.g.
//! `PHARMAFIND_MATCHING__RESULT_CAP=20`). Every field has a default, so an
//! absent file yields [`CoreConfig::default`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Pharmacy, PharmacyDetails};
use crate::validation;

/// Ids at or below this value are reserved for pre-seeded pharmacies.
pub const DEFAULT_ID_BASELINE: i64 = 1000;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables of the nearby-match engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Result size the nearest unavailable pharmacies are truncated to
    pub result_cap: usize,
    /// Score weight per km; a pharmacy's score is `distance * weight + price`
    pub distance_weight: f64,
    /// Price label for pharmacies listing the medicine
    pub listed_price_unit: String,
    /// Price label for pharmacies without the medicine
    pub unlisted_price_unit: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            result_cap: 15,
            distance_weight: 10.0,
            listed_price_unit: "per strip".into(),
            unlisted_price_unit: "-".into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    pub matching: MatchConfig,
    /// Newly registered pharmacies always get ids above this
    pub id_baseline: i64,
    /// Pharmacies known before any owner registers; never persisted
    pub seed_pharmacies: Vec<Pharmacy>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            id_baseline: DEFAULT_ID_BASELINE,
            seed_pharmacies: Vec::new(),
        }
    }
}

impl CoreConfig {
    /// Load from `path` (if given and present) plus the environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("PHARMAFIND")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let cfg: CoreConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document directly.
    pub fn from_toml(toml: &str) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let cfg: CoreConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.matching.result_cap == 0 {
            return Err(ConfigError::Invalid("matching.result_cap must be positive".into()));
        }
        let weight = self.matching.distance_weight;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "matching.distance_weight must be finite and non-negative, got {weight}"
            )));
        }
        if self.id_baseline < 0 {
            return Err(ConfigError::Invalid("id_baseline must not be negative".into()));
        }
        self.validate_seeds()
    }

    /// Seeds obey the same rules as registered pharmacies: unique ids, unique
    /// case-folded names, valid details and coordinates, ids within the
    /// reserved range.
    fn validate_seeds(&self) -> ConfigResult<()> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();

        for seed in &self.seed_pharmacies {
            let invalid = |reason: String| {
                ConfigError::Invalid(format!("seed pharmacy '{}' (id {}): {}", seed.name, seed.id, reason))
            };

            if seed.id > self.id_baseline {
                return Err(invalid(format!("id above the baseline {}", self.id_baseline)));
            }
            if !ids.insert(seed.id) {
                return Err(invalid("duplicate id".into()));
            }
            if !names.insert(seed.name_key()) {
                return Err(invalid("duplicate name".into()));
            }

            let details = PharmacyDetails::new(
                seed.name.as_str(),
                seed.address.as_str(),
                seed.phone.as_str(),
            );
            validation::validate_details(&details).map_err(|e| invalid(e.to_string()))?;
            validation::validate_coordinate(seed.location()).map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }
}
