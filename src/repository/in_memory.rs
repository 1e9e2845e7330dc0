//! In-memory repository
//!
//! Process-local reference implementation of [`EntryRepository`].

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::entry::Entry;
use crate::error::Result;

use super::{Entries, EntryRepository};

/// Entries grouped by jar key, then by identity
#[derive(Default)]
struct Partitions {
    by_key: HashMap<String, HashMap<String, Entry>>,
    key_by_id: HashMap<String, String>,
}

/// Repository keeping every entry in a map guarded by one mutex
#[derive(Default)]
pub struct InMemoryEntryRepository {
    inner: Mutex<Partitions>,
}

impl InMemoryEntryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries, across all keys
    pub fn len(&self) -> usize {
        self.inner.lock().key_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored entry
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.by_key.clear();
        inner.key_by_id.clear();
    }
}

impl EntryRepository for InMemoryEntryRepository {
    /// Snapshot taken under the lock; iteration happens outside it.
    fn find(&self, key: &str) -> Entries<'_> {
        let inner = self.inner.lock();
        let snapshot = inner
            .by_key
            .get(key)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        Entries::from_vec(snapshot)
    }

    fn save(&self, mut entry: Entry) -> Result<()> {
        let id = entry.id();
        let mut inner = self.inner.lock();

        let partition = inner.by_key.entry(entry.key.clone()).or_default();
        if let Some(previous) = partition.get(&id) {
            entry.inherit_provenance(previous);
        }
        let key = entry.key.clone();
        partition.insert(id.clone(), entry);
        inner.key_by_id.insert(id, key);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock();

        if let Some(key) = inner.key_by_id.remove(id) {
            if let Some(partition) = inner.by_key.get_mut(&key) {
                partition.remove(id);
                if partition.is_empty() {
                    inner.by_key.remove(&key);
                }
            }
        }
        Ok(())
    }
}
