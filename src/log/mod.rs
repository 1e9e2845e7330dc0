//! Durable Log Module
//!
//! Append-only cookie log with replay and on-demand compaction.
//!
//! ## Responsibilities
//! - Append one record per save, one tombstone per deleted id
//! - Rebuild live state by replaying the log from the start
//! - Carry `creation`/`order` forward across updates of one identity
//! - Compact the log to its live records through an atomic replace
//!
//! ## File Format
//! One JSON object per line; fields holding a zero value are omitted.
//! ```text
//! {"id":"example.com;example.com;/;a","key":"example.com","name":"a","value":"1",
//!  "domain":"example.com","path":"/","hostOnly":true,"creation":"2024-05-01T10:00:00Z"}
//! {"id":"example.com;example.com;/;a","deleted":"2024-05-01T10:05:00Z"}
//! ```
//! `expires` is omitted for session cookies. A tombstone carries only `id` and
//! `deleted`.
//!
//! The log assumes exclusive ownership by one process.

mod record;
mod replay;
mod repository;

pub use record::LogRecord;
pub use replay::{LogStats, Replay};
pub use repository::{CompactionStats, FileEntryRepository};
