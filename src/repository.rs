use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{NameIndexError, Result};
use crate::models::Name;

/// Canonical record store the index is loaded from and writes new names to.
pub trait NameRepository: Send + Sync {
    /// Feed every name of a dataset to `consumer`, in insertion order.
    /// Returns the number of names processed.
    fn process_dataset(&self, dataset_key: i32, consumer: &mut dyn FnMut(Name)) -> Result<usize>;

    /// Persist a new name and return its id.
    fn insert(&self, name: &Name) -> Result<String>;
}

/// Name records stored in SQLite, one JSON payload per row.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn in_memory() -> Result<Self> {
        let repo = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn persistent(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| NameIndexError::LockPoisoned("name repository"))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS names (
                id TEXT PRIMARY KEY,
                dataset_key INTEGER NOT NULL,
                scientific_name TEXT NOT NULL,
                payload TEXT NOT NULL,       -- JSON Name
                created TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_names_dataset ON names(dataset_key);
            ",
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Name>> {
        let payload: Option<String> = self
            .conn()?
            .query_row(
                "SELECT payload FROM names WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn count(&self, dataset_key: i32) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM names WHERE dataset_key = ?1",
            params![dataset_key],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl NameRepository for SqliteRepository {
    fn process_dataset(&self, dataset_key: i32, consumer: &mut dyn FnMut(Name)) -> Result<usize> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT payload FROM names WHERE dataset_key = ?1 ORDER BY rowid")?;
        let mut rows = stmt.query(params![dataset_key])?;
        let mut processed = 0;
        while let Some(row) = rows.next()? {
            let json: String = row.get(0)?;
            consumer(serde_json::from_str(&json)?);
            processed += 1;
        }
        Ok(processed)
    }

    /// Fails on a missing or duplicate id.
    fn insert(&self, name: &Name) -> Result<String> {
        let id = name
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                NameIndexError::InvalidEntry(format!("{} has no id", name.scientific_name))
            })?;
        let dataset_key = name.dataset_key.ok_or_else(|| {
            NameIndexError::InvalidEntry(format!("{} has no dataset", name.scientific_name))
        })?;
        self.conn()?.execute(
            "INSERT INTO names (id, dataset_key, scientific_name, payload, created)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                dataset_key,
                name.scientific_name,
                serde_json::to_string(name)?,
                name.created.map(|c| c.to_rfc3339()),
            ],
        )?;
        Ok(id)
    }
}
