//! Repository Module
//!
//! The storage contract behind the jar, and its composable implementations.
//!
//! ## Responsibilities
//! - `find(key)`: a fresh, finite sequence of the entries stored under a jar key
//! - `save(entry)`: upsert by identity, keeping `creation`/`creation_index`
//!   of any earlier record with the same identity
//! - `delete(id)` / `delete_many(ids)`: idempotent removal by identity
//!
//! Implementations are `Send + Sync` and synchronize internally; every method
//! takes `&self`.

mod in_memory;
mod multi;

pub use in_memory::InMemoryEntryRepository;
pub use multi::MultiEntryRepository;

use std::vec;

use crate::entry::Entry;
use crate::error::{JarError, Result};

/// Storage for cookie entries, partitioned by jar key
pub trait EntryRepository: Send + Sync {
    /// Entries stored under `key`.
    ///
    /// Each call returns an independent sequence; nothing is shared between
    /// two calls, and the work may be deferred until the first `next()`.
    fn find(&self, key: &str) -> Entries<'_>;

    /// Insert or replace the entry with the same identity
    fn save(&self, entry: Entry) -> Result<()>;

    /// Remove one identity; unknown ids are not an error
    fn delete(&self, id: &str) -> Result<()>;

    /// Remove several identities
    fn delete_many(&self, ids: &[String]) -> Result<()> {
        for id in ids {
            self.delete(id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Entry Sequences
// =============================================================================

/// Finite sequence of entries returned by [`EntryRepository::find`]
pub struct Entries<'a> {
    state: State<'a>,
}

type Loader<'a> = Box<dyn FnOnce() -> Result<Vec<Entry>> + Send + 'a>;

enum State<'a> {
    Pending(Loader<'a>),
    Ready(vec::IntoIter<Entry>),
    Failed(JarError),
    Done,
}

impl<'a> Entries<'a> {
    /// Sequence over entries already in hand
    pub fn from_vec(entries: Vec<Entry>) -> Self {
        Self {
            state: State::Ready(entries.into_iter()),
        }
    }

    /// Empty sequence
    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Sequence whose entries are loaded on the first call to `next()`
    pub fn deferred<F>(load: F) -> Self
    where
        F: FnOnce() -> Result<Vec<Entry>> + Send + 'a,
    {
        Self {
            state: State::Pending(Box::new(load)),
        }
    }

    /// Sequence that yields `err` once, then ends
    pub fn failed(err: JarError) -> Self {
        Self {
            state: State::Failed(err),
        }
    }

    /// Drain the sequence, stopping at the first error
    pub fn collect_all(self) -> Result<Vec<Entry>> {
        self.collect()
    }
}

impl Iterator for Entries<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending(load) => {
                    self.state = match load() {
                        Ok(entries) => State::Ready(entries.into_iter()),
                        Err(e) => State::Failed(e),
                    };
                }
                State::Ready(mut iter) => {
                    let next = iter.next();
                    if next.is_some() {
                        self.state = State::Ready(iter);
                    }
                    return next.map(Ok);
                }
                State::Failed(e) => return Some(Err(e)),
                State::Done => return None,
            }
        }
    }
}
