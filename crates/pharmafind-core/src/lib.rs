//! PharmaFind Core Library
//!
//! Local-first pharmacy inventory registry and nearby medicine matching.
//!
//! # Architecture
//!
//! ```text
//!   Owner app                                   Patient app
//!      │                                             │
//!  register / upload / set status / remove      find nearby (location, medicine)
//!      │                                             │
//!      ▼                                             ▼
//!  ┌───────────────────┐  ┌────────────────────┐  ┌──────────────────────┐
//!  │ RegistryManager   │  │ InventoryManager   │  │ NearbyMatcher        │
//!  │ find-or-create    │  │ medicine → entries │  │ distance, partition, │
//!  │ by folded name    │  │ keyed by folded    │  │ cap, best option     │
//!  └─────────┬─────────┘  └─────────┬──────────┘  └──────────┬───────────┘
//!            │   load → mutate → save                        │ load
//!            └──────────────────────┼────────────────────────┘
//!                                   ▼
//!                     ┌──────────────────────────┐
//!                     │  RecordStore (SQLite)    │
//!                     │  { registry, index }     │
//!                     └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite record store holding the state document
//! - [`models`]: Domain types (Pharmacy, StockEntry, InventoryIndex, RankedPharmacy)
//! - [`geo`]: Haversine distance
//! - [`registry`]: Pharmacy registry with case-insensitive dedup
//! - [`inventory`]: Inventory index updates and lookups
//! - [`matcher`]: Nearby-match ranking
//! - [`settings`]: Configuration loading
//! - [`validation`]: Input checks applied at the FFI boundary

pub mod db;
pub mod geo;
pub mod inventory;
pub mod matcher;
pub mod models;
pub mod registry;
pub mod settings;
pub mod validation;

// Re-export commonly used types
pub use db::{Database, RecordStore};
pub use inventory::InventoryManager;
pub use matcher::NearbyMatcher;
pub use models::{
    Coordinate, InventoryIndex, InventoryItem, Pharmacy, PharmacyDetails, RankedPharmacy,
    StockEntry, StockStatus, StoreState,
};
pub use registry::RegistryManager;
pub use settings::{CoreConfig, MatchConfig};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PharmaFindError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<db::DbError> for PharmaFindError {
    fn from(e: db::DbError) -> Self {
        PharmaFindError::DatabaseError(e.to_string())
    }
}

impl From<settings::ConfigError> for PharmaFindError {
    fn from(e: settings::ConfigError) -> Self {
        PharmaFindError::ConfigError(e.to_string())
    }
}

impl From<validation::ValidationError> for PharmaFindError {
    fn from(e: validation::ValidationError) -> Self {
        PharmaFindError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PharmaFindError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PharmaFindError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with default settings.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PharmaFindCore>, PharmaFindError> {
    let db = Database::open(&path)?;
    Ok(PharmaFindCore::new(db, CoreConfig::default()))
}

/// Open or create a database, reading settings from an optional TOML file
/// and `PHARMAFIND_*` environment variables.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_path: Option<String>,
) -> Result<Arc<PharmaFindCore>, PharmaFindError> {
    let config = CoreConfig::load(config_path.as_deref().map(Path::new))?;
    let db = Database::open(&path)?;
    Ok(PharmaFindCore::new(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PharmaFindCore>, PharmaFindError> {
    let db = Database::open_in_memory()?;
    Ok(PharmaFindCore::new(db, CoreConfig::default()))
}

/// Install a global `tracing` subscriber.
///
/// `filter` uses `EnvFilter` directive syntax; when absent, `RUST_LOG` is
/// read and the level defaults to `info`. Returns false if a subscriber was
/// already installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let env_filter = match filter {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Every call holds the database lock for its whole load → mutate → save
/// cycle, so calls through one handle never interleave.
#[derive(uniffi::Object)]
pub struct PharmaFindCore {
    db: Arc<Mutex<Database>>,
    config: Arc<CoreConfig>,
}

impl PharmaFindCore {
    /// Wrap an open database (Rust callers).
    pub fn new(db: Database, config: CoreConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn registry<'a>(&'a self, db: &'a Database) -> RegistryManager<'a> {
        RegistryManager::new(db, &self.config.seed_pharmacies, self.config.id_baseline)
    }

    /// Stock entries may only reference seeded or registered pharmacies.
    fn require_pharmacy(&self, db: &Database, pharmacy_id: i64) -> Result<(), PharmaFindError> {
        match self.registry(db).get(pharmacy_id) {
            Some(_) => Ok(()),
            None => Err(PharmaFindError::InvalidInput(format!(
                "unknown pharmacy id {pharmacy_id}"
            ))),
        }
    }
}

#[uniffi::export]
impl PharmaFindCore {
    // =========================================================================
    // Registry Operations
    // =========================================================================

    /// Register a pharmacy, or return the existing one with the same name.
    pub fn register_pharmacy(
        &self,
        details: FfiPharmacyDetails,
        location: FfiCoordinate,
    ) -> Result<FfiPharmacy, PharmaFindError> {
        let details: PharmacyDetails = details.into();
        let location: Coordinate = location.into();
        validation::validate_details(&details)?;
        validation::validate_coordinate(location)?;

        let db = self.db.lock()?;
        let registry = self.registry(&db);
        Ok(registry.find_or_create(details, location).into())
    }

    /// All pharmacies, deduplicated by name and sorted by name.
    pub fn list_pharmacies(&self) -> Result<Vec<FfiPharmacy>, PharmaFindError> {
        let db = self.db.lock()?;
        let registry = self.registry(&db);
        Ok(registry.list().into_iter().map(|p| p.into()).collect())
    }

    /// Get a pharmacy by id.
    pub fn get_pharmacy(&self, id: i64) -> Result<Option<FfiPharmacy>, PharmaFindError> {
        let db = self.db.lock()?;
        let registry = self.registry(&db);
        Ok(registry.get(id).map(|p| p.into()))
    }

    // =========================================================================
    // Inventory Operations
    // =========================================================================

    /// Upload a batch of price/stock rows for a pharmacy.
    ///
    /// The whole batch is rejected if any row is invalid.
    pub fn upload_inventory(
        &self,
        pharmacy_id: i64,
        items: Vec<FfiInventoryItem>,
    ) -> Result<(), PharmaFindError> {
        let items: Vec<InventoryItem> = items.into_iter().map(|i| i.into()).collect();
        for (row, item) in items.iter().enumerate() {
            validation::validate_item(item)
                .map_err(|e| PharmaFindError::InvalidInput(format!("row {}: {}", row + 1, e)))?;
        }

        let db = self.db.lock()?;
        self.require_pharmacy(&db, pharmacy_id)?;
        InventoryManager::new(&*db).upsert_many(pharmacy_id, &items);
        Ok(())
    }

    /// Change availability of an existing listing. Returns false if the
    /// pharmacy does not list the medicine.
    pub fn set_stock_status(
        &self,
        pharmacy_id: i64,
        medicine_name: String,
        stock: FfiStockStatus,
    ) -> Result<bool, PharmaFindError> {
        validation::validate_medicine_name(&medicine_name)?;
        let db = self.db.lock()?;
        self.require_pharmacy(&db, pharmacy_id)?;
        Ok(InventoryManager::new(&*db).set_status(pharmacy_id, &medicine_name, stock.into()))
    }

    /// Remove a medicine from a pharmacy's inventory.
    pub fn remove_medicine(
        &self,
        pharmacy_id: i64,
        medicine_name: String,
    ) -> Result<bool, PharmaFindError> {
        validation::validate_medicine_name(&medicine_name)?;
        let db = self.db.lock()?;
        self.require_pharmacy(&db, pharmacy_id)?;
        Ok(InventoryManager::new(&*db).remove(pharmacy_id, &medicine_name))
    }

    /// Whether any pharmacy lists the medicine.
    pub fn inventory_check(&self, medicine_name: String) -> Result<bool, PharmaFindError> {
        validation::validate_medicine_name(&medicine_name)?;
        let db = self.db.lock()?;
        Ok(InventoryManager::new(&*db).has_medicine(&medicine_name))
    }

    /// A pharmacy's price and stock for one medicine.
    pub fn stock_entry(
        &self,
        pharmacy_id: i64,
        medicine_name: String,
    ) -> Result<Option<FfiStockEntry>, PharmaFindError> {
        validation::validate_medicine_name(&medicine_name)?;
        let db = self.db.lock()?;
        let entry = InventoryManager::new(&*db).entry_for(pharmacy_id, &medicine_name);
        Ok(entry.map(|e| e.into()))
    }

    /// Everything a pharmacy lists, sorted by medicine.
    pub fn pharmacy_inventory(
        &self,
        pharmacy_id: i64,
    ) -> Result<Vec<FfiInventoryListing>, PharmaFindError> {
        let db = self.db.lock()?;
        let listings = InventoryManager::new(&*db).medicines_for(pharmacy_id);
        Ok(listings
            .into_iter()
            .map(|(medicine, entry)| FfiInventoryListing {
                medicine,
                price: entry.price,
                stock: entry.stock.into(),
            })
            .collect())
    }

    // =========================================================================
    // Matching Operations
    // =========================================================================

    /// Pharmacies near `location` for a medicine, with the best option flagged.
    pub fn find_nearby(
        &self,
        location: FfiCoordinate,
        medicine_name: String,
    ) -> Result<Vec<FfiRankedPharmacy>, PharmaFindError> {
        let location: Coordinate = location.into();
        validation::validate_coordinate(location)?;
        validation::validate_medicine_name(&medicine_name)?;

        let db = self.db.lock()?;
        let matcher = NearbyMatcher::new(
            &*db,
            &self.config.seed_pharmacies,
            &self.config.matching,
        );
        let results = matcher.find_nearby(location, &medicine_name);
        Ok(results.into_iter().map(|r| r.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe coordinate.
#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl From<FfiCoordinate> for Coordinate {
    fn from(c: FfiCoordinate) -> Self {
        Coordinate::new(c.lat, c.lon)
    }
}

/// FFI-safe stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiStockStatus {
    Available,
    Unavailable,
}

impl From<StockStatus> for FfiStockStatus {
    fn from(status: StockStatus) -> Self {
        match status {
            StockStatus::Available => FfiStockStatus::Available,
            StockStatus::Unavailable => FfiStockStatus::Unavailable,
        }
    }
}

impl From<FfiStockStatus> for StockStatus {
    fn from(status: FfiStockStatus) -> Self {
        match status {
            FfiStockStatus::Available => StockStatus::Available,
            FfiStockStatus::Unavailable => StockStatus::Unavailable,
        }
    }
}

/// FFI-safe registration details.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPharmacyDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl From<FfiPharmacyDetails> for PharmacyDetails {
    fn from(d: FfiPharmacyDetails) -> Self {
        PharmacyDetails {
            name: d.name,
            address: d.address,
            phone: d.phone,
        }
    }
}

/// FFI-safe pharmacy.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPharmacy {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<Pharmacy> for FfiPharmacy {
    fn from(p: Pharmacy) -> Self {
        Self {
            id: p.id,
            name: p.name,
            address: p.address,
            phone: p.phone,
            lat: p.lat,
            lon: p.lon,
        }
    }
}

/// FFI-safe upload row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInventoryItem {
    pub medicine_name: String,
    pub price: f64,
    pub stock: Option<FfiStockStatus>,
}

impl From<FfiInventoryItem> for InventoryItem {
    fn from(item: FfiInventoryItem) -> Self {
        InventoryItem {
            medicine_name: item.medicine_name,
            price: item.price,
            stock: item.stock.map(|s| s.into()),
        }
    }
}

/// FFI-safe stock entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStockEntry {
    pub pharmacy_id: i64,
    pub price: f64,
    pub stock: FfiStockStatus,
}

impl From<StockEntry> for FfiStockEntry {
    fn from(e: StockEntry) -> Self {
        Self {
            pharmacy_id: e.pharmacy_id,
            price: e.price,
            stock: e.stock.into(),
        }
    }
}

/// FFI-safe listing from a pharmacy's own inventory.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInventoryListing {
    pub medicine: String,
    pub price: f64,
    pub stock: FfiStockStatus,
}

/// FFI-safe nearby-match result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRankedPharmacy {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
    pub price: f64,
    pub price_unit: String,
    pub stock: FfiStockStatus,
    pub is_best_option: bool,
}

impl From<RankedPharmacy> for FfiRankedPharmacy {
    fn from(r: RankedPharmacy) -> Self {
        Self {
            id: r.pharmacy.id,
            name: r.pharmacy.name,
            address: r.pharmacy.address,
            phone: r.pharmacy.phone,
            lat: r.pharmacy.lat,
            lon: r.pharmacy.lon,
            distance_km: r.distance,
            price: r.price,
            price_unit: r.price_unit,
            stock: r.stock.into(),
            is_best_option: r.is_best_option,
        }
    }
}
