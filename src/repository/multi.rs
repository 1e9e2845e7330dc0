//! Multi repository
//!
//! Composes several repositories into one: writes go to all of them,
//! reads come from the first one that has something.
//!
//! ## Read-repair
//! ```text
//!   find(k):  [primary: ∅] → [secondary: ∅] → [tertiary: {a, b}]  ← answers
//!                  ▲               ▲                    │
//!                  └───── save(a), save(b) ─────────────┘
//! ```
//! Targets ahead of the answering one are backfilled before the entries are
//! returned, so the next read is served by the primary.

use std::sync::Arc;

use crate::entry::Entry;
use crate::error::{JarError, Result, ResultExt};

use super::{Entries, EntryRepository};

/// Ordered, non-empty list of replica repositories acting as one
#[derive(Clone)]
pub struct MultiEntryRepository {
    /// Highest priority first
    targets: Vec<Arc<dyn EntryRepository>>,
}

impl MultiEntryRepository {
    /// Compose `targets`, highest read priority first
    pub fn new(targets: Vec<Arc<dyn EntryRepository>>) -> Result<Self> {
        if targets.is_empty() {
            return Err(JarError::Config(
                "multi repository needs at least one target".to_string(),
            ));
        }
        Ok(Self { targets })
    }

    /// The composed repositories, in priority order
    pub fn targets(&self) -> &[Arc<dyn EntryRepository>] {
        &self.targets
    }

    /// Run `op` against every target at once.
    ///
    /// Returns only after every target has finished, even when one fails
    /// early. The first error in target order wins.
    fn fan_out<F>(&self, op: F) -> Result<()>
    where
        F: Fn(&dyn EntryRepository) -> Result<()> + Sync,
    {
        if let [only] = self.targets.as_slice() {
            return op(only.as_ref());
        }

        let op = &op;
        let outcomes = crossbeam::thread::scope(|s| {
            let handles: Vec<_> = self
                .targets
                .iter()
                .map(|target| s.spawn(move |_| op(target.as_ref())))
                .collect();

            // Join barrier: every handle is joined before anything is reported
            handles
                .into_iter()
                .enumerate()
                .map(|(index, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(JarError::ReplicaPanicked(index)))
                        .context("replica", index)
                })
                .collect::<Vec<_>>()
        });

        let outcomes = match outcomes {
            Ok(outcomes) => outcomes,
            // Every handle was joined above, so the scope itself has nothing left to report
            Err(_) => return Err(JarError::ReplicaPanicked(0)),
        };

        let mut first_error = None;
        for outcome in outcomes {
            if let Err(e) = outcome {
                tracing::warn!("Replica write failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Entries from the first target that has any, backfilling the ones before it
    fn resolve(&self, key: &str) -> Result<Vec<Entry>> {
        for (index, target) in self.targets.iter().enumerate() {
            let found = target.find(key).collect_all()?;
            if found.is_empty() {
                continue;
            }

            if index > 0 {
                let ahead = MultiEntryRepository {
                    targets: self.targets[..index].to_vec(),
                };
                for entry in &found {
                    ahead.save(entry.clone()).context("repair", key)?;
                }
                tracing::debug!(
                    "Read-repaired {} entries for {} into {} replicas",
                    found.len(),
                    key,
                    index
                );
            }
            return Ok(found);
        }
        Ok(Vec::new())
    }
}

impl EntryRepository for MultiEntryRepository {
    fn find(&self, key: &str) -> Entries<'_> {
        let key = key.to_string();
        Entries::deferred(move || self.resolve(&key))
    }

    fn save(&self, entry: Entry) -> Result<()> {
        self.fan_out(|target| target.save(entry.clone()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.fan_out(|target| target.delete(id))
    }

    fn delete_many(&self, ids: &[String]) -> Result<()> {
        self.fan_out(|target| target.delete_many(ids))
    }
}
