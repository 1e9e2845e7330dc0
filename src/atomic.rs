//! Atomic File Replace
//!
//! Crash-safe replacement of a single file's content.
//!
//! ## Sequence
//! ```text
//!   write ──► {dir}/{stem}~XXXXXX{tmp_suffix}   (fsync)
//!   link  ──► {path}{backup_suffix}             (old bytes, stale backup removed first)
//!   rename tmp ──► {path}                       (the only step that touches {path})
//!   fsync {dir}, remove backup
//! ```
//!
//! Any failure before the rename leaves `{path}` untouched. A crash can leave
//! a temp file or a backup behind; the next call removes a stale backup, and
//! [`restore_backup`] brings the backup back if `{path}` itself went missing.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_BACKUP_SUFFIX, DEFAULT_TMP_SUFFIX};
use crate::error::{JarError, Result};

/// Longest temp-file prefix taken from the target's file name
const MAX_PREFIX_CHARS: usize = 16;

/// Options for [`atomic_save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicOptions {
    /// Suffix of the temporary sibling (must be non-empty)
    pub tmp_suffix: String,

    /// Suffix of the backup sibling (empty disables the backup)
    pub backup_suffix: String,
}

impl Default for AtomicOptions {
    fn default() -> Self {
        Self {
            tmp_suffix: DEFAULT_TMP_SUFFIX.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl AtomicOptions {
    /// Backup path for `path`, or `None` when backups are disabled
    pub fn backup_path(&self, path: &Path) -> Option<PathBuf> {
        if self.backup_suffix.is_empty() {
            return None;
        }
        let mut name = OsString::from(path.as_os_str());
        name.push(&self.backup_suffix);
        Some(PathBuf::from(name))
    }
}

/// Replace the content of `path` with whatever `write` produces.
///
/// `write` receives the temporary file; it does not need to flush or sync.
pub fn atomic_save<F>(path: &Path, write: F, options: &AtomicOptions) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    atomic_save_with(path, write, options, || Ok(()))
}

/// [`atomic_save`] with a hook that runs right before the swap
fn atomic_save_with<F, H>(path: &Path, write: F, options: &AtomicOptions, before_swap: H) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
    H: FnOnce() -> io::Result<()>,
{
    if options.tmp_suffix.is_empty() {
        return Err(JarError::Config("empty tmp suffix".to_string()));
    }

    // Step 1: Produce the new content next to the target
    let dir = parent_dir(path);
    let mut tmp = tempfile::Builder::new()
        .prefix(&temp_prefix(path))
        .suffix(&options.tmp_suffix)
        .tempfile_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    // Step 2: Keep the current bytes under the backup name
    let backup = match options.backup_path(path) {
        Some(backup) => {
            if preserve(path, &backup)? {
                Some(backup)
            } else {
                None
            }
        }
        None => None,
    };

    // Step 3: Swap
    let swapped = before_swap()
        .and_then(|_| tmp.persist(path).map(|_| ()).map_err(|e| e.error))
        .map_err(JarError::from);

    // Step 4: The target is either old or new now; the backup has served its purpose
    let cleaned = match &backup {
        Some(backup) => remove_if_exists(backup).map_err(JarError::from),
        None => Ok(()),
    };

    swapped?;
    sync_dir(dir)?;
    cleaned?;

    tracing::debug!("Atomically replaced {}", path.display());
    Ok(())
}

/// Move a leftover backup back into place when `path` is missing.
///
/// Returns true when a backup was restored.
pub fn restore_backup(path: &Path, options: &AtomicOptions) -> Result<bool> {
    let backup = match options.backup_path(path) {
        Some(backup) => backup,
        None => return Ok(false),
    };
    if path.exists() || !backup.exists() {
        return Ok(false);
    }
    fs::rename(&backup, path)?;
    tracing::warn!("Restored {} from backup {}", path.display(), backup.display());
    Ok(true)
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Hard-link `path` to `backup`, replacing a stale backup.
///
/// Returns false when there is nothing to preserve.
fn preserve(path: &Path, backup: &Path) -> Result<bool> {
    remove_if_exists(backup)?;
    match fs::hard_link(path, backup) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// "cookies.jsonl" → "cookies~"
fn temp_prefix(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    let mut prefix: String = stem.chars().take(MAX_PREFIX_CHARS).collect();
    prefix.push('~');
    prefix
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
