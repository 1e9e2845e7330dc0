//! Log record
//!
//! Persisted form of an entry (upsert) or of a deletion (tombstone).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{end_of_time, entry_id, Entry};
use crate::error::{JarError, Result};

/// One line of the cookie log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub same_site: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub persistent: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub host_only: bool,
    /// None for session cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<DateTime<Utc>>,
    /// Set only on tombstones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,
    /// Creation index
    #[serde(default, skip_serializing_if = "is_zero")]
    pub order: i64,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Zero and the session sentinel are both stored as "absent"
fn nullable(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if t == DateTime::<Utc>::default() || t == end_of_time() {
        None
    } else {
        Some(t)
    }
}

impl LogRecord {
    /// Full snapshot of `entry`
    pub fn upsert(entry: &Entry) -> Self {
        Self {
            id: entry.id(),
            key: entry.key.clone(),
            name: entry.name.clone(),
            value: entry.value.clone(),
            domain: entry.domain.clone(),
            path: entry.path.clone(),
            same_site: entry.same_site.clone(),
            secure: entry.secure,
            http_only: entry.http_only,
            persistent: entry.persistent,
            host_only: entry.host_only,
            expires: nullable(entry.expires),
            creation: nullable(entry.creation),
            deleted: None,
            order: entry.creation_index,
        }
    }

    /// Deletion marker for `id`
    pub fn tombstone(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            deleted: Some(at),
            ..Self::default()
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.deleted.is_some()
    }

    /// The stored id, or the one implied by the identity fields
    pub fn identity(&self) -> String {
        if self.id.is_empty() {
            entry_id(&self.key, &self.domain, &self.path, &self.name)
        } else {
            self.id.clone()
        }
    }

    /// Back to the in-memory entry
    pub fn into_entry(self) -> Entry {
        Entry {
            key: self.key,
            name: self.name,
            value: self.value,
            domain: self.domain,
            path: self.path,
            same_site: self.same_site,
            secure: self.secure,
            http_only: self.http_only,
            persistent: self.persistent,
            host_only: self.host_only,
            expires: self.expires.unwrap_or_else(end_of_time),
            creation: self.creation.unwrap_or_default(),
            creation_index: self.order,
        }
    }

    /// Serialize as one log line, newline included
    pub fn encode_line(&self, buf: &mut Vec<u8>) -> Result<()> {
        serde_json::to_writer(&mut *buf, self).map_err(JarError::Encode)?;
        buf.push(b'\n');
        Ok(())
    }

    /// Parse one log line; `line_no` is 1-based and only used for the error
    pub fn decode_line(line: &str, line_no: usize) -> Result<Self> {
        serde_json::from_str(line).map_err(|source| JarError::CorruptRecord {
            line: line_no,
            source,
        })
    }
}
