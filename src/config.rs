//! Configuration for jarstore
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::atomic::AtomicOptions;
use crate::error::{JarError, Result};
use crate::jar::{PslList, PublicSuffixList};
use crate::repository::{EntryRepository, InMemoryEntryRepository};

/// Default suffix of the temporary file written during compaction
pub const DEFAULT_TMP_SUFFIX: &str = ".tmp";

/// Default suffix of the backup kept while the log is being replaced
pub const DEFAULT_BACKUP_SUFFIX: &str = "~";

// =============================================================================
// Durable Log Configuration
// =============================================================================

/// Configuration for a [`FileEntryRepository`](crate::log::FileEntryRepository)
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Path of the newline-delimited JSON log
    pub path: PathBuf,

    /// Suffix of the temporary sibling written during compaction (must be non-empty)
    pub tmp_suffix: String,

    /// Suffix of the backup sibling kept during compaction (empty disables the backup)
    pub backup_suffix: String,

    /// How often appends are fsynced
    pub sync_strategy: LogSyncStrategy,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncStrategy {
    /// fsync after every appended batch (safest, slowest)
    EveryWrite,

    /// Leave flushing of appends to the OS; compaction still fsyncs
    OsBuffered,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./cookies.jsonl"),
            tmp_suffix: DEFAULT_TMP_SUFFIX.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            sync_strategy: LogSyncStrategy::OsBuffered,
        }
    }
}

impl LogConfig {
    /// Create a new config builder
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Config for `path` with every other option at its default
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Reject settings the log cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(JarError::Config("empty log path".to_string()));
        }
        if self.tmp_suffix.is_empty() {
            return Err(JarError::Config("empty tmp suffix".to_string()));
        }
        Ok(())
    }

    /// Options for the atomic replace used by compaction
    pub fn atomic_options(&self) -> AtomicOptions {
        AtomicOptions {
            tmp_suffix: self.tmp_suffix.clone(),
            backup_suffix: self.backup_suffix.clone(),
        }
    }
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    /// Set the log file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the temporary file suffix
    pub fn tmp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.tmp_suffix = suffix.into();
        self
    }

    /// Set the backup file suffix (empty disables the backup)
    pub fn backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.backup_suffix = suffix.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: LogSyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

// =============================================================================
// Jar Configuration
// =============================================================================

/// Callback receiving errors from the jar's non-failing entry points
pub type ErrorHandler = Arc<dyn Fn(&JarError) + Send + Sync>;

/// Options for creating a [`Jar`](crate::jar::Jar)
#[derive(Clone)]
pub struct JarOptions {
    /// Decides whether a server may set a cookie for a domain, and the jar key of a host
    pub public_suffix_list: Arc<dyn PublicSuffixList>,

    /// Where entries are stored
    pub repository: Arc<dyn EntryRepository>,

    /// Receives errors from `cookies` / `set_cookies`
    pub on_error: ErrorHandler,
}

impl Default for JarOptions {
    fn default() -> Self {
        Self {
            public_suffix_list: Arc::new(PslList),
            repository: Arc::new(InMemoryEntryRepository::new()),
            on_error: fatal_error_handler(),
        }
    }
}

impl fmt::Debug for JarOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarOptions")
            .field("public_suffix_list", &self.public_suffix_list.description())
            .finish_non_exhaustive()
    }
}

impl JarOptions {
    /// Create a new options builder
    pub fn builder() -> JarOptionsBuilder {
        JarOptionsBuilder::default()
    }
}

/// Builder for JarOptions
#[derive(Default)]
pub struct JarOptionsBuilder {
    options: JarOptions,
}

impl JarOptionsBuilder {
    /// Set the public suffix list
    pub fn public_suffix_list(mut self, list: Arc<dyn PublicSuffixList>) -> Self {
        self.options.public_suffix_list = list;
        self
    }

    /// Set the entry repository
    pub fn repository(mut self, repository: Arc<dyn EntryRepository>) -> Self {
        self.options.repository = repository;
        self
    }

    /// Set the error callback
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&JarError) + Send + Sync + 'static,
    {
        self.options.on_error = Arc::new(handler);
        self
    }

    pub fn build(self) -> JarOptions {
        self.options
    }
}

/// The default error policy: errors are fatal.
pub fn fatal_error_handler() -> ErrorHandler {
    Arc::new(|err: &JarError| {
        tracing::error!("cookie jar failure: {}", err);
        panic!("cookie jar failure: {err}");
    })
}
