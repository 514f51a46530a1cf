//! Application state persistence.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{Database, DbResult};
use crate::models::{InventoryIndex, Pharmacy, StoreState};

/// Persistence contract used by the registry and inventory managers.
///
/// Implementations never surface storage failures: `load` falls back to an
/// empty state and `save` is best-effort.
pub trait RecordStore {
    /// Read the whole state.
    fn load(&self) -> StoreState;

    /// Replace the whole state.
    fn save(&self, state: &StoreState);
}

/// On-disk document layout.
#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    registry: Vec<Pharmacy>,
    #[serde(default)]
    index: InventoryIndex,
    /// RFC 3339 time of the write that produced this document
    #[serde(default)]
    saved_at: Option<String>,
}

impl Database {
    /// Read the stored state, `None` if nothing has been saved yet.
    pub fn read_state(&self) -> DbResult<Option<StoreState>> {
        Ok(self.read_document()?.map(|doc| StoreState {
            registry: doc.registry,
            index: doc.index,
        }))
    }

    /// Overwrite the stored state.
    pub fn write_state(&self, state: &StoreState) -> DbResult<()> {
        let doc = StoreDocument {
            registry: state.registry.clone(),
            index: state.index.clone(),
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let json = serde_json::to_string(&doc)?;

        self.conn.execute(
            r#"
            INSERT INTO app_state (id, document, updated_at)
            VALUES (1, ?1, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = datetime('now')
            "#,
            params![json],
        )?;
        Ok(())
    }

    /// Timestamp of the last successful save, if any.
    pub fn last_saved_at(&self) -> DbResult<Option<String>> {
        Ok(self.read_document()?.and_then(|doc| doc.saved_at))
    }

    fn read_document(&self) -> DbResult<Option<StoreDocument>> {
        let document: Option<String> = self
            .conn
            .query_row("SELECT document FROM app_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        document
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }
}

impl RecordStore for Database {
    fn load(&self) -> StoreState {
        match self.read_state() {
            Ok(Some(state)) => state,
            Ok(None) => StoreState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "stored state unreadable, starting empty");
                StoreState::default()
            }
        }
    }

    fn save(&self, state: &StoreState) {
        match self.write_state(state) {
            Ok(()) => tracing::trace!(
                pharmacies = state.registry.len(),
                medicines = state.index.len(),
                "state saved"
            ),
            Err(e) => tracing::error!(error = %e, "failed to save state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, PharmacyDetails, StockStatus};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample_state() -> StoreState {
        let mut state = StoreState::default();
        state.registry.push(Pharmacy::from_details(
            1001,
            PharmacyDetails::new("Wellness Forever", "Link Road", "555-0199"),
            Coordinate::new(19.1, 72.9),
        ));
        state
            .index
            .upsert(1001, "Paracetamol", 25.0, StockStatus::Available);
        state
    }

    #[test]
    fn test_empty_database_loads_empty_state() {
        let db = setup_db();
        assert!(db.read_state().unwrap().is_none());
        assert!(db.load().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let db = setup_db();
        let state = sample_state();

        db.save(&state);

        let loaded = db.load();
        assert_eq!(loaded, state);
        assert!(db.last_saved_at().unwrap().is_some());
    }

    #[test]
    fn test_save_overwrites() {
        let db = setup_db();
        db.save(&sample_state());
        db.save(&StoreState::default());

        assert!(db.load().is_empty());

        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM app_state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_corrupt_document_loads_empty_state() {
        let db = setup_db();
        db.conn()
            .execute(
                "INSERT INTO app_state (id, document) VALUES (1, 'not json at all')",
                [],
            )
            .unwrap();

        assert!(db.read_state().is_err());
        assert!(db.load().is_empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty_state() {
        let db = setup_db();
        db.conn()
            .execute(
                r#"INSERT INTO app_state (id, document) VALUES (1, '{"registry": 42}')"#,
                [],
            )
            .unwrap();

        assert!(db.load().is_empty());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let db = setup_db();
        db.conn()
            .execute(
                r#"INSERT INTO app_state (id, document) VALUES (1, '{"registry": []}')"#,
                [],
            )
            .unwrap();

        let state = db.read_state().unwrap().unwrap();
        assert!(state.index.is_empty());
        assert!(db.last_saved_at().unwrap().is_none());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let db = setup_db();
        db.conn().execute_batch("DROP TABLE app_state").unwrap();

        // Must not panic or propagate
        db.save(&sample_state());
        assert!(db.load().is_empty());
    }

    #[test]
    fn test_document_layout() {
        let db = setup_db();
        db.save(&sample_state());

        let document: String = db
            .conn()
            .query_row("SELECT document FROM app_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&document).unwrap();

        assert_eq!(json["registry"][0]["name"], "Wellness Forever");
        assert_eq!(json["index"]["paracetamol"][0]["price"], 25.0);
        assert!(json["saved_at"].is_string());
    }
}
