//! SQLite schema definition.

/// Complete database schema for turnos.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Local storage
-- ============================================================================

-- One JSON document per key, mirroring browser local storage
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
