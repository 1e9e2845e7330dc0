//! File-backed entry repository
//!
//! [`EntryRepository`] over the append-only cookie log.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;

use crate::atomic::{atomic_save, restore_backup, AtomicOptions};
use crate::config::{LogConfig, LogSyncStrategy};
use crate::entry::Entry;
use crate::error::{Result, ResultExt};
use crate::repository::{Entries, EntryRepository};

use super::{LogRecord, LogStats, Replay};

/// Outcome of a [`FileEntryRepository::compact`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Records in the log before compaction
    pub records_before: u64,
    /// Records written (one per live identity)
    pub records_after: u64,
}

/// Entry repository persisted as a newline-delimited JSON log
///
/// ## Concurrency:
/// - One mutex serializes appends, full-file scans, and compaction
/// - Appends only ever add whole lines, so a scan always sees a well-formed prefix
/// - No cross-process coordination: the file must be owned by one process
pub struct FileEntryRepository {
    /// Log configuration
    config: LogConfig,

    /// Atomic replace options derived from the config
    atomic: AtomicOptions,

    /// Serializes every access to the file
    lock: Mutex<()>,
}

impl FileEntryRepository {
    /// Open the log described by `config`.
    ///
    /// The file itself is created on first write; a leftover backup from an
    /// interrupted compaction is moved back when the log is missing.
    pub fn open(config: LogConfig) -> Result<Self> {
        config.validate()?;

        if let Some(dir) = config.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let atomic = config.atomic_options();
        restore_backup(&config.path, &atomic)?;

        tracing::debug!("Opened cookie log {}", config.path.display());
        Ok(Self {
            config,
            atomic,
            lock: Mutex::new(()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified log path
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(LogConfig::for_path(path))
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Every live entry, regardless of key
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let _guard = self.lock.lock();
        let replay = self.replay().context("entries", self.path().display())?;
        Ok(replay.into_live().map(LogRecord::into_entry).collect())
    }

    /// Record counts of the current log
    pub fn stats(&self) -> Result<LogStats> {
        let _guard = self.lock.lock();
        let replay = self.replay().context("stats", self.path().display())?;
        Ok(replay.stats())
    }

    /// Rewrite the log to hold only its live records.
    ///
    /// The old file stays intact until the new one is fully written and
    /// swapped in.
    pub fn compact(&self) -> Result<CompactionStats> {
        let _guard = self.lock.lock();
        self.compact_locked().context("compact", self.path().display())
    }

    // =========================================================================
    // Private Helpers (called with the lock held)
    // =========================================================================

    fn replay(&self) -> Result<Replay> {
        Replay::from_path(&self.config.path)
    }

    fn append(&self, records: &[LogRecord]) -> Result<()> {
        let mut buf = Vec::new();
        for record in records {
            record.encode_line(&mut buf)?;
        }

        let mut file = open_append(&self.config.path)?;
        file.write_all(&buf)?;
        if self.config.sync_strategy == LogSyncStrategy::EveryWrite {
            file.sync_data()?;
        }
        Ok(())
    }

    fn compact_locked(&self) -> Result<CompactionStats> {
        tracing::debug!("Compacting cookie log {}", self.path().display());

        let replay = self.replay()?;
        let records_before = replay.stats().records;
        let mut records_after = 0u64;

        atomic_save(
            &self.config.path,
            |file: &mut File| {
                let mut writer = BufWriter::new(file);
                let mut line = Vec::new();
                for record in replay.into_live() {
                    line.clear();
                    record.encode_line(&mut line)?;
                    writer.write_all(&line)?;
                    records_after += 1;
                }
                writer.flush()?;
                Ok(())
            },
            &self.atomic,
        )?;

        tracing::info!(
            "Compacted {}: {} records -> {} live",
            self.path().display(),
            records_before,
            records_after
        );
        Ok(CompactionStats {
            records_before,
            records_after,
        })
    }

    fn load(&self, key: &str) -> Result<Vec<Entry>> {
        let _guard = self.lock.lock();
        let replay = self.replay()?;
        Ok(replay
            .into_live()
            .filter(|r| r.key == key)
            .map(LogRecord::into_entry)
            .collect())
    }
}

impl EntryRepository for FileEntryRepository {
    /// The file is scanned when the sequence is first polled.
    fn find(&self, key: &str) -> Entries<'_> {
        let key = key.to_string();
        Entries::deferred(move || self.load(&key).context("find", &key))
    }

    fn save(&self, entry: Entry) -> Result<()> {
        let id = entry.id();
        let _guard = self.lock.lock();
        self.append(&[LogRecord::upsert(&entry)]).context("save", &id)?;
        tracing::debug!("Appended upsert {}", id);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock();
        self.append(&[LogRecord::tombstone(id, Utc::now())])
            .context("delete", id)?;
        tracing::debug!("Appended tombstone {}", id);
        Ok(())
    }

    fn delete_many(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let records: Vec<_> = ids.iter().map(|id| LogRecord::tombstone(id.as_str(), now)).collect();

        let _guard = self.lock.lock();
        self.append(&records).context("delete_many", ids.join(", "))?;
        tracing::debug!("Appended {} tombstones", ids.len());
        Ok(())
    }
}

#[cfg(unix)]
fn open_append(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
