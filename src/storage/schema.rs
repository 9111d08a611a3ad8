//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the seine database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per host queue
CREATE TABLE IF NOT EXISTS hosts (
    host_key TEXT PRIMARY KEY,
    valence INTEGER NOT NULL DEFAULT 1
);

-- One row per known URI record. Insertion order (id) preserves queue order
-- on reload.
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uri TEXT NOT NULL UNIQUE,
    host_key TEXT NOT NULL REFERENCES hosts(host_key),
    path_from_seed TEXT NOT NULL DEFAULT '',
    via TEXT,
    via_context TEXT,
    is_seed INTEGER NOT NULL DEFAULT 0,
    directive TEXT NOT NULL,
    fetch_attempts INTEGER NOT NULL DEFAULT 0,
    next_processing_ms INTEGER NOT NULL,
    last_fetch_status TEXT,
    in_flight INTEGER NOT NULL DEFAULT 0,
    retired INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_entries_host ON entries(host_key);
CREATE INDEX IF NOT EXISTS idx_entries_retired ON entries(retired);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["hosts", "entries"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
