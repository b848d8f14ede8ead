//! SQLite schema definition.

/// Schema for the on-device key-value table.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value slots
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,                         -- serialized JSON collection
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
