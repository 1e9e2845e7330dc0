//! Log replay
//!
//! Rebuilds live state from a sequence of records.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

use super::LogRecord;

/// Counters gathered while replaying a log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    /// Records read (upserts + tombstones)
    pub records: u64,
    pub upserts: u64,
    pub tombstones: u64,
    /// Identities alive after the last record
    pub live: u64,
}

/// Working state of a replay: identity → latest record
///
/// Slots keep first-seen order of identities, so the live set comes out in a
/// stable order.
#[derive(Debug, Default)]
pub struct Replay {
    slots: Vec<Option<LogRecord>>,
    index: HashMap<String, usize>,
    stats: LogStats,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the log at `path`; a missing file is an empty log
    pub fn from_path(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::from_reader(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replay newline-delimited records.
    ///
    /// Blank lines are skipped; any other unparsable line aborts the replay.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut replay = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            replay.apply(LogRecord::decode_line(&line, i + 1)?);
        }
        Ok(replay)
    }

    /// Fold one record into the working state
    pub fn apply(&mut self, mut record: LogRecord) {
        self.stats.records += 1;
        let id = record.identity();

        if record.is_tombstone() {
            self.stats.tombstones += 1;
            if let Some(slot) = self.index.remove(&id) {
                self.slots[slot] = None;
            }
            tracing::trace!("replay: tombstone {}", id);
            return;
        }

        self.stats.upserts += 1;
        match self.index.get(&id) {
            Some(&slot) => {
                if let Some(previous) = &self.slots[slot] {
                    record.creation = previous.creation;
                    record.order = previous.order;
                }
                self.slots[slot] = Some(record);
            }
            None => {
                self.index.insert(id.clone(), self.slots.len());
                self.slots.push(Some(record));
            }
        }
        tracing::trace!("replay: upsert {}", id);
    }

    /// Counters so far, with `live` filled in
    pub fn stats(&self) -> LogStats {
        LogStats {
            live: self.index.len() as u64,
            ..self.stats
        }
    }

    /// Number of live identities
    pub fn live_count(&self) -> usize {
        self.index.len()
    }

    /// Live records in first-seen order
    pub fn into_live(self) -> impl Iterator<Item = LogRecord> {
        self.slots.into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn upsert(name: &str, value: &str, creation: i64, order: i64) -> LogRecord {
        LogRecord {
            id: format!("k;d;/;{}", name),
            key: "k".into(),
            name: name.into(),
            value: value.into(),
            domain: "d".into(),
            path: "/".into(),
            creation: Some(at(creation)),
            order,
            ..LogRecord::default()
        }
    }

    #[test]
    fn later_upsert_keeps_first_provenance() {
        let mut replay = Replay::new();
        replay.apply(upsert("a", "1", 100, 1));
        replay.apply(upsert("a", "2", 200, 7));
        replay.apply(upsert("a", "3", 300, 9));

        let live: Vec<_> = replay.into_live().collect();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].value, "3");
        assert_eq!(live[0].creation, Some(at(100)));
        assert_eq!(live[0].order, 1);
    }

    #[test]
    fn tombstone_masks_earlier_upserts() {
        let mut replay = Replay::new();
        replay.apply(upsert("a", "1", 100, 0));
        replay.apply(upsert("b", "1", 100, 1));
        replay.apply(LogRecord::tombstone("k;d;/;a", at(150)));

        let stats = replay.stats();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.tombstones, 1);
        assert_eq!(stats.live, 1);

        let names: Vec<_> = replay.into_live().map(|r| r.name).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn reinsert_after_delete_starts_fresh_provenance() {
        let mut replay = Replay::new();
        replay.apply(upsert("a", "1", 100, 1));
        replay.apply(LogRecord::tombstone("k;d;/;a", at(150)));
        replay.apply(upsert("a", "2", 200, 5));

        let live: Vec<_> = replay.into_live().collect();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].creation, Some(at(200)));
        assert_eq!(live[0].order, 5);
    }

    #[test]
    fn blank_lines_are_skipped_and_garbage_is_fatal() {
        let good = "\n{\"id\":\"k;d;/;a\",\"key\":\"k\",\"name\":\"a\"}\n\n";
        let replay = Replay::from_reader(good.as_bytes()).unwrap();
        assert_eq!(replay.live_count(), 1);

        let bad = "{\"id\":\"k;d;/;a\",\"key\":\"k\"}\n{\"id\":";
        assert!(Replay::from_reader(bad.as_bytes()).is_err());
    }
}
