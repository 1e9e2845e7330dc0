//! # jarstore
//!
//! A persistent, RFC 6265 compliant cookie store with:
//! - RFC 6265 domain/path matching and request ordering
//! - An append-only JSON-lines log with tombstones and replay
//! - On-demand compaction through a crash-safe atomic file replace
//! - Replicated repositories with read-repair
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Jar                                 │
//! │       (key derivation, domain rules, lazy expiry)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ EntryRepository
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌──────────────┐  ┌──────────────────┐
//!   │  In-Memory  │ │  File Log    │  │      Multi       │
//!   │   (Mutex)   │ │  (Append)    │  │ (fan-out, repair)│
//!   └─────────────┘ └──────┬───────┘  └──────────────────┘
//!                          │ compact
//!                          ▼
//!                  ┌──────────────┐
//!                  │ Atomic Save  │
//!                  └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod entry;
pub mod atomic;
pub mod repository;
pub mod log;
pub mod jar;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{JarError, Result};
pub use config::{JarOptions, LogConfig, LogSyncStrategy};
pub use entry::Entry;
pub use jar::{Cookie, Jar, PublicSuffixList, SameSite};
pub use log::FileEntryRepository;
pub use repository::{Entries, EntryRepository, InMemoryEntryRepository, MultiEntryRepository};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jarstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
