//! SQLite schema definition.

/// Layout version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Complete database schema for pharmafind. Idempotent.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Application State
-- ============================================================================

-- The registry and inventory index live in one JSON document that is
-- read and written as a whole.
CREATE TABLE IF NOT EXISTS app_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    document TEXT NOT NULL,                      -- JSON StoreDocument
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

PRAGMA user_version = 1;
"#;
