use rusqlite::{Connection, Result};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 10_000;

/// Handle over the shared SQLite store. The store is written concurrently by
/// the external indexer, so it is always opened in WAL mode with a busy
/// timeout: lock contention waits instead of failing.
pub struct ContentStore {
    conn: Connection,
}

impl ContentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn open_with_timeout<P: AsRef<Path>>(path: P, busy_timeout_ms: u64) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = ContentStore { conn };
        store.configure_pragmas(busy_timeout_ms)?;
        store.create_tables()?;
        debug!("Opened content store at {}", path.as_ref().display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = ContentStore { conn };
        store.configure_pragmas(DEFAULT_BUSY_TIMEOUT_MS)?;
        store.create_tables()?;
        Ok(store)
    }

    fn configure_pragmas(&self, busy_timeout_ms: u64) -> Result<()> {
        self.conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = {};",
            busy_timeout_ms
        ))?;
        debug!(
            "SQLite pragmas configured (WAL mode, busy timeout {}ms)",
            busy_timeout_ms
        );
        Ok(())
    }

    /// `opal_metadata` is ours. The remaining tables belong to the indexer and
    /// the ingesters and are only created when absent.
    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
