use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{NameIndexError, Result};
use crate::models::Name;
use crate::normalizer;
use crate::store::{GroupStore, MemoryStore, SqliteStore};

/// Names sharing one normalization key, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateGroup(Vec<Name>);

impl CandidateGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[Name] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, name: Name) {
        self.0.push(name);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Name> {
        self.0.iter()
    }

    pub fn into_names(self) -> Vec<Name> {
        self.0
    }
}

impl From<Vec<Name>> for CandidateGroup {
    fn from(names: Vec<Name>) -> Self {
        Self(names)
    }
}

impl<'a> IntoIterator for &'a CandidateGroup {
    type Item = &'a Name;
    type IntoIter = std::slice::Iter<'a, Name>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Maps normalization keys to groups of candidate names.
///
/// Reads go straight to the store. Appends are serialized by a single
/// write lock so a read-modify-write of a group never loses an update.
pub struct CandidateIndex {
    store: Box<dyn GroupStore>,
    write_lock: Mutex<()>,
    count: AtomicUsize,
}

fn check_entry(name: &Name) -> Result<()> {
    if name.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
        return Err(NameIndexError::InvalidEntry(format!(
            "{} has no id",
            name.scientific_name
        )));
    }
    if name.scientific_name.trim().is_empty() {
        return Err(NameIndexError::InvalidEntry(
            "blank scientific name".to_string(),
        ));
    }
    Ok(())
}

impl CandidateIndex {
    pub fn with_store(store: Box<dyn GroupStore>) -> Result<Self> {
        let count = store.record_count()?;
        Ok(Self {
            store,
            write_lock: Mutex::new(()),
            count: AtomicUsize::new(count),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            write_lock: Mutex::new(()),
            count: AtomicUsize::new(0),
        }
    }

    /// Open or create an index file.
    pub fn persistent(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_store(Box::new(SqliteStore::persistent(path)?))
    }

    pub fn get(&self, key: &str) -> Result<Option<CandidateGroup>> {
        self.store.get(key)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        self.store.contains_key(key)
    }

    /// Append a name to the group under `key`, creating the group if needed.
    pub fn append(&self, key: &str, name: Name) -> Result<()> {
        check_entry(&name)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| NameIndexError::LockPoisoned("candidate index"))?;
        let mut group = self.store.get(key)?.unwrap_or_default();
        group.push(name);
        self.store.put(key, &group)?;
        self.count.fetch_add(1, Ordering::SeqCst);
        debug!(key, size = group.len(), "Appended name to group");
        Ok(())
    }

    /// Total number of names in the index.
    pub fn size(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> Result<usize> {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Populate the index from an iterator of names.
    ///
    /// Only names whose id starts with `id_prefix` are loaded; all others
    /// were never minted by this index. Returns the number of names loaded.
    pub fn bulk_load<I>(&self, names: I, id_prefix: &str) -> Result<usize>
    where
        I: IntoIterator<Item = Name>,
    {
        let mut loader = self.bulk_loader(id_prefix)?;
        for name in names {
            loader.push(name)?;
        }
        loader.finish()
    }

    /// Start a streaming bulk load. The write lock is held until the
    /// loader is finished or dropped.
    pub fn bulk_loader(&self, id_prefix: &str) -> Result<BulkLoader<'_>> {
        let guard = self
            .write_lock
            .lock()
            .map_err(|_| NameIndexError::LockPoisoned("candidate index"))?;
        Ok(BulkLoader {
            index: self,
            _guard: guard,
            id_prefix: id_prefix.to_string(),
            batch_size: BULK_BATCH_GROUPS,
            pending: HashMap::new(),
            pending_names: 0,
            loaded: 0,
            skipped: 0,
            flushes: 0,
        })
    }
}

/// Groups buffered before a bulk load writes them out.
pub const BULK_BATCH_GROUPS: usize = 10_000;

/// Streams names into the index in batches of groups.
///
/// Only one batch is held in memory. Each flush merges the batch with the
/// groups already stored, so a key spread over several batches keeps all
/// its names.
pub struct BulkLoader<'a> {
    index: &'a CandidateIndex,
    _guard: MutexGuard<'a, ()>,
    id_prefix: String,
    batch_size: usize,
    pending: HashMap<String, CandidateGroup>,
    pending_names: usize,
    loaded: usize,
    skipped: usize,
    flushes: usize,
}

impl BulkLoader<'_> {
    pub fn with_batch_size(mut self, groups: usize) -> Self {
        self.batch_size = groups.max(1);
        self
    }

    pub fn push(&mut self, name: Name) -> Result<()> {
        let own = name
            .id
            .as_deref()
            .is_some_and(|id| id.starts_with(self.id_prefix.as_str()));
        if !own {
            self.skipped += 1;
            return Ok(());
        }
        if let Err(e) = check_entry(&name) {
            warn!(error = %e, "Skip invalid index entry");
            self.skipped += 1;
            return Ok(());
        }
        let key = normalizer::key(&name.scientific_name);
        self.pending.entry(key).or_default().push(name);
        self.pending_names += 1;
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let store = &self.index.store;
        let mut batch = Vec::with_capacity(self.pending.len());
        for (key, group) in self.pending.drain() {
            let merged = match store.get(&key)? {
                Some(mut existing) => {
                    for name in group.into_names() {
                        existing.push(name);
                    }
                    existing
                }
                None => group,
            };
            batch.push((key, merged));
        }
        store.put_all(&batch)?;
        self.index.count.fetch_add(self.pending_names, Ordering::SeqCst);
        self.loaded += self.pending_names;
        self.pending_names = 0;
        self.flushes += 1;
        debug!(groups = batch.len(), loaded = self.loaded, "Flushed bulk load batch");
        Ok(())
    }

    /// Write the last batch and return the number of names loaded.
    pub fn finish(mut self) -> Result<usize> {
        self.flush()?;
        info!(
            loaded = self.loaded,
            skipped = self.skipped,
            batches = self.flushes,
            "Bulk loaded names into index"
        );
        Ok(self.loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_index() -> CandidateIndex {
        CandidateIndex::in_memory()
    }

    fn named(id: &str, name: &str) -> Name {
        Name::new(name).with_id(id)
    }

    #[test]
    fn test_append_creates_and_extends_groups() {
        let idx = make_index();
        assert!(idx.is_empty());
        idx.append("abies alb", named("NI1", "Abies alba")).unwrap();
        idx.append("abies alb", named("NI2", "Abies albus")).unwrap();
        idx.append("picea abi", named("NI3", "Picea abies")).unwrap();

        assert_eq!(idx.size(), 3);
        assert_eq!(idx.key_count().unwrap(), 2);
        assert!(idx.contains_key("abies alb").unwrap());
        assert!(!idx.contains_key("abies grandis").unwrap());

        let g = idx.get("abies alb").unwrap().unwrap();
        let ids: Vec<_> = g.iter().map(|n| n.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["NI1", "NI2"]);
    }

    #[test]
    fn test_append_rejects_entries_without_id() {
        let idx = make_index();
        assert!(matches!(
            idx.append("abies alb", Name::new("Abies alba")),
            Err(NameIndexError::InvalidEntry(_))
        ));
        assert!(matches!(
            idx.append("", named("NI1", "  ")),
            Err(NameIndexError::InvalidEntry(_))
        ));
        assert_eq!(idx.size(), 0);
    }

    #[test]
    fn test_bulk_load_skips_foreign_ids() {
        let idx = make_index();
        let names = vec![
            named("NI1", "Abies alba"),
            named("NI2", "Abies albus"),
            named("x99", "Abies alba"),
            Name::new("Picea abies"),
            named("NI3", "Larus fuscus"),
        ];
        let loaded = idx.bulk_load(names, "NI").unwrap();
        assert_eq!(loaded, 3);
        assert_eq!(idx.size(), 3);
        assert_eq!(idx.get("abies alb").unwrap().unwrap().len(), 2);
        assert_eq!(idx.get(&normalizer::key("Larus fuscus")).unwrap().unwrap().len(), 1);
        assert!(idx.get(&normalizer::key("Picea abies")).unwrap().is_none());
    }

    #[test]
    fn test_bulk_load_merges_existing_groups() {
        let idx = make_index();
        idx.append("abies alb", named("NI1", "Abies alba")).unwrap();
        idx.bulk_load(vec![named("NI2", "Abies alba")], "NI").unwrap();
        assert_eq!(idx.get("abies alb").unwrap().unwrap().len(), 2);
        assert_eq!(idx.size(), 2);
    }

    #[test]
    fn test_bulk_loader_merges_across_batches() {
        let idx = make_index();
        let species = ["Abies alba", "Picea abies", "Larus fuscus"];
        let mut loader = idx.bulk_loader("NI").unwrap().with_batch_size(2);
        for i in 0..9 {
            loader
                .push(named(&format!("NI{}", i), species[i % species.len()]))
                .unwrap();
        }
        loader.push(named("x1", "Abies alba")).unwrap();
        assert_eq!(loader.finish().unwrap(), 9);

        assert_eq!(idx.size(), 9);
        assert_eq!(idx.key_count().unwrap(), 3);
        for sp in species {
            let g = idx.get(&normalizer::key(sp)).unwrap().unwrap();
            assert_eq!(g.len(), 3);
        }
        let ids: Vec<_> = idx
            .get("abies alb")
            .unwrap()
            .unwrap()
            .iter()
            .map(|n| n.id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["NI0", "NI3", "NI6"]);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let idx = make_index();
        std::thread::scope(|s| {
            for t in 0..8 {
                let idx = &idx;
                s.spawn(move || {
                    for i in 0..25 {
                        idx.append("abies alb", named(&format!("NI{}-{}", t, i), "Abies alba"))
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(idx.size(), 200);
        assert_eq!(idx.get("abies alb").unwrap().unwrap().len(), 200);
    }

    #[test]
    fn test_persistent_index_reopens_with_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        {
            let idx = CandidateIndex::persistent(&path).unwrap();
            idx.append("abies alb", named("NI1", "Abies alba")).unwrap();
            idx.append("abies alb", named("NI2", "Abies albus")).unwrap();
        }
        let idx = CandidateIndex::persistent(&path).unwrap();
        assert_eq!(idx.size(), 2);
        assert_eq!(idx.get("abies alb").unwrap().unwrap().len(), 2);
    }
}
