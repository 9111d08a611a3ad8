//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore
//! trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageResult};
use crate::storage::StoredEntry;
use crate::uri::{CrawlUri, SchedulingDirective, ViaContext};
use crate::frontier::FetchStatus;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance backed by the given file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl FrontierStore for SqliteStore {
    // ===== Host Management =====

    fn put_host(&mut self, host_key: &str, valence: u32) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO hosts (host_key, valence) VALUES (?1, ?2)",
            params![host_key, valence],
        )?;
        Ok(())
    }

    fn hosts(&self) -> StorageResult<Vec<(String, u32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT host_key, valence FROM hosts ORDER BY host_key")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut hosts = Vec::new();
        for row in rows {
            hosts.push(row?);
        }
        Ok(hosts)
    }

    fn delete_host(&mut self, host_key: &str) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM entries WHERE host_key = ?1",
            params![host_key],
        )?;
        self.conn
            .execute("DELETE FROM hosts WHERE host_key = ?1", params![host_key])?;
        Ok(())
    }

    // ===== Entry Management =====

    fn put_entry(&mut self, record: &CrawlUri) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO entries (uri, host_key, path_from_seed, via, via_context,
                 is_seed, directive, fetch_attempts, next_processing_ms,
                 last_fetch_status, in_flight, retired)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, 0)
             ON CONFLICT(uri) DO UPDATE SET
                 host_key = excluded.host_key,
                 path_from_seed = excluded.path_from_seed,
                 via = excluded.via,
                 via_context = excluded.via_context,
                 is_seed = excluded.is_seed,
                 directive = excluded.directive,
                 fetch_attempts = excluded.fetch_attempts,
                 next_processing_ms = excluded.next_processing_ms,
                 last_fetch_status = excluded.last_fetch_status,
                 in_flight = 0,
                 retired = 0",
            params![
                record.uri,
                record.class_key,
                record.path_from_seed,
                record.via,
                record.via_context.map(|c| c.to_db_string()),
                record.is_seed,
                record.directive.to_db_string(),
                record.fetch_attempts,
                record.next_processing_ms,
                record.last_fetch_status.map(|s| s.to_db_string()),
            ],
        )?;
        Ok(())
    }

    fn set_in_flight(&mut self, uri: &str, in_flight: bool) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE entries SET in_flight = ?1 WHERE uri = ?2",
            params![in_flight, uri],
        )?;
        Ok(())
    }

    fn retire_entry(&mut self, record: &CrawlUri) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE entries SET retired = 1, in_flight = 0,
                 fetch_attempts = ?1, last_fetch_status = ?2
             WHERE uri = ?3",
            params![
                record.fetch_attempts,
                record.last_fetch_status.map(|s| s.to_db_string()),
                record.uri,
            ],
        )?;
        Ok(())
    }

    fn delete_entry(&mut self, uri: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM entries WHERE uri = ?1", params![uri])?;
        Ok(())
    }

    fn entries(&self) -> StorageResult<Vec<StoredEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT uri, host_key, path_from_seed, via, via_context, is_seed,
                 directive, fetch_attempts, next_processing_ms,
                 last_fetch_status, in_flight, retired
             FROM entries ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            let via_context: Option<String> = row.get(4)?;
            let directive: String = row.get(6)?;
            let last_fetch_status: Option<String> = row.get(9)?;
            let record = CrawlUri {
                uri: row.get(0)?,
                class_key: row.get(1)?,
                path_from_seed: row.get(2)?,
                via: row.get(3)?,
                via_context: via_context.as_deref().and_then(ViaContext::from_db_string),
                is_seed: row.get(5)?,
                directive: SchedulingDirective::from_db_string(&directive)
                    .unwrap_or(SchedulingDirective::Normal),
                fetch_attempts: row.get(7)?,
                next_processing_ms: row.get(8)?,
                last_fetch_status: last_fetch_status
                    .as_deref()
                    .and_then(FetchStatus::from_db_string),
                force_fetch: false,
            };
            Ok(StoredEntry {
                record,
                in_flight: row.get(10)?,
                retired: row.get(11)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(uri: &str, host_key: &str) -> CrawlUri {
        let mut record = CrawlUri::new(uri);
        record.class_key = host_key.to_string();
        record.next_processing_ms = 1_000;
        record
    }

    #[test]
    fn test_put_and_list_hosts() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("b.com", 2).unwrap();
        store.put_host("a.com", 1).unwrap();
        // Re-inserting does not change the valence.
        store.put_host("b.com", 5).unwrap();

        let hosts = store.hosts().unwrap();
        assert_eq!(
            hosts,
            vec![("a.com".to_string(), 1), ("b.com".to_string(), 2)]
        );
    }

    #[test]
    fn test_put_entry_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();

        let mut record = CrawlUri::discovered(
            "http://example.com/a",
            "http://example.com/",
            ViaContext::Link,
            "L",
        );
        record.class_key = "example.com".to_string();
        record.next_processing_ms = 42;
        record.fetch_attempts = 3;
        record.last_fetch_status = Some(FetchStatus::Http(503));
        store.put_entry(&record).unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        let loaded = &entries[0].record;
        assert_eq!(loaded.uri, "http://example.com/a");
        assert_eq!(loaded.class_key, "example.com");
        assert_eq!(loaded.path_from_seed, "L");
        assert_eq!(loaded.via.as_deref(), Some("http://example.com/"));
        assert_eq!(loaded.via_context, Some(ViaContext::Link));
        assert_eq!(loaded.fetch_attempts, 3);
        assert_eq!(loaded.next_processing_ms, 42);
        assert_eq!(loaded.last_fetch_status, Some(FetchStatus::Http(503)));
        assert!(!entries[0].in_flight);
        assert!(!entries[0].retired);
    }

    #[test]
    fn test_put_entry_upserts_by_uri() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();

        let mut record = sample_record("http://example.com/a", "example.com");
        store.put_entry(&record).unwrap();
        record.fetch_attempts = 2;
        record.next_processing_ms = 9_000;
        store.put_entry(&record).unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.fetch_attempts, 2);
        assert_eq!(entries[0].record.next_processing_ms, 9_000);
    }

    #[test]
    fn test_in_flight_flag() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();
        let record = sample_record("http://example.com/a", "example.com");
        store.put_entry(&record).unwrap();

        store.set_in_flight("http://example.com/a", true).unwrap();
        assert!(store.entries().unwrap()[0].in_flight);

        store.set_in_flight("http://example.com/a", false).unwrap();
        assert!(!store.entries().unwrap()[0].in_flight);
    }

    #[test]
    fn test_retire_entry() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();
        let mut record = sample_record("http://example.com/a", "example.com");
        store.put_entry(&record).unwrap();
        store.set_in_flight("http://example.com/a", true).unwrap();

        record.fetch_attempts = 1;
        record.last_fetch_status = Some(FetchStatus::RobotsPrecluded);
        store.retire_entry(&record).unwrap();

        let entries = store.entries().unwrap();
        assert!(entries[0].retired);
        assert!(!entries[0].in_flight);
        assert_eq!(
            entries[0].record.last_fetch_status,
            Some(FetchStatus::RobotsPrecluded)
        );
    }

    #[test]
    fn test_delete_entry() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();
        let record = sample_record("http://example.com/a", "example.com");
        store.put_entry(&record).unwrap();

        store.delete_entry("http://example.com/a").unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_delete_host_cascades_to_entries() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();
        store
            .put_entry(&sample_record("http://example.com/a", "example.com"))
            .unwrap();

        store.delete_host("example.com").unwrap();
        assert!(store.hosts().unwrap().is_empty());
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_entries_preserve_insertion_order() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.put_host("example.com", 1).unwrap();
        for path in ["a", "b", "c"] {
            let uri = format!("http://example.com/{}", path);
            store
                .put_entry(&sample_record(&uri, "example.com"))
                .unwrap();
        }

        let uris: Vec<String> = store
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.record.uri)
            .collect();
        assert_eq!(
            uris,
            vec![
                "http://example.com/a",
                "http://example.com/b",
                "http://example.com/c"
            ]
        );
    }
}
