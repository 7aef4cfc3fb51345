use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::error::{NameIndexError, Result};
use crate::index::CandidateGroup;

/// Key-value storage for candidate groups.
///
/// Implementations must be safe for many concurrent readers. Writers are
/// serialized by the [`CandidateIndex`](crate::index::CandidateIndex).
pub trait GroupStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CandidateGroup>>;

    fn put(&self, key: &str, group: &CandidateGroup) -> Result<()>;

    fn contains_key(&self, key: &str) -> Result<bool>;

    fn keys(&self) -> Result<Vec<String>>;

    /// Number of keys.
    fn len(&self) -> Result<usize>;

    /// Number of names over all groups.
    fn record_count(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Write many groups at once. Backends may batch this.
    fn put_all(&self, groups: &[(String, CandidateGroup)]) -> Result<()> {
        for (key, group) in groups {
            self.put(key, group)?;
        }
        Ok(())
    }
}

/// In-process store, lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    groups: RwLock<HashMap<String, CandidateGroup>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, CandidateGroup>>> {
        self.groups
            .read()
            .map_err(|_| NameIndexError::LockPoisoned("memory store"))
    }
}

impl GroupStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CandidateGroup>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &str, group: &CandidateGroup) -> Result<()> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| NameIndexError::LockPoisoned("memory store"))?;
        groups.insert(key.to_string(), group.clone());
        Ok(())
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    fn record_count(&self) -> Result<usize> {
        Ok(self.read()?.values().map(CandidateGroup::len).sum())
    }
}

/// SQLite backed store. Groups are kept as JSON documents, one row per key.
///
/// Writes go through one locked connection. Store files run in WAL mode and
/// serve reads from a pool of read-only connections, so lookups neither
/// queue behind each other nor behind the writer. An in-memory database
/// cannot be shared between connections and reads through the writer.
pub struct SqliteStore {
    writer: Mutex<Connection>,
    readers: Option<Pool<SqliteConnectionManager>>,
}

const READ_POOL_SIZE: u32 = 16;

impl SqliteStore {
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            writer: Mutex::new(Connection::open_in_memory()?),
            readers: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open or create a store file.
    pub fn persistent(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let writer = Connection::open(path)?;
        writer.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA busy_timeout=5000;
            ",
        )?;
        let mut store = Self {
            writer: Mutex::new(writer),
            readers: None,
        };
        store.init_schema()?;

        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout=5000;"));
        let pool = Pool::builder()
            .max_size(READ_POOL_SIZE)
            .min_idle(Some(1))
            .build(manager)?;
        store.readers = Some(pool);
        Ok(store)
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| NameIndexError::LockPoisoned("sqlite store"))
    }

    /// Run a read on a pooled connection, or on the writer without a pool.
    fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        match &self.readers {
            Some(pool) => f(&*pool.get()?),
            None => f(&*self.writer()?),
        }
    }

    /// Whether reads bypass the writer lock.
    pub fn has_read_pool(&self) -> bool {
        self.readers.is_some()
    }

    fn init_schema(&self) -> Result<()> {
        self.writer()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS name_groups (
                key TEXT PRIMARY KEY,
                names TEXT NOT NULL,     -- JSON array of Name
                size INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

const UPSERT_GROUP: &str = "INSERT INTO name_groups (key, names, size) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET names = excluded.names, size = excluded.size";

impl GroupStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<CandidateGroup>> {
        let json: Option<String> = self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT names FROM name_groups WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, group: &CandidateGroup) -> Result<()> {
        let json = serde_json::to_string(group)?;
        self.writer()?
            .execute(UPSERT_GROUP, params![key, json, group.len() as i64])?;
        Ok(())
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        self.read(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM name_groups WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.read(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM name_groups ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
    }

    fn len(&self) -> Result<usize> {
        self.read(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM name_groups", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    fn record_count(&self) -> Result<usize> {
        self.read(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COALESCE(SUM(size), 0) FROM name_groups",
                [],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    fn put_all(&self, groups: &[(String, CandidateGroup)]) -> Result<()> {
        let mut conn = self.writer()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_GROUP)?;
            for (key, group) in groups {
                let json = serde_json::to_string(group)?;
                stmt.execute(params![key, json, group.len() as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
