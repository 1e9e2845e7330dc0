//! Entry Module
//!
//! The stored form of one cookie.
//!
//! ## Responsibilities
//! - Hold the RFC 6265 attributes of a cookie plus its jar key
//! - Provide the identity used for upserts and tombstones
//! - Decide expiry against a caller-supplied clock
//! - RFC 6265 domain/path matching and request ordering (see [`matching`])
//!
//! ## Identity
//! ```text
//! ┌────────────┬──────────────┬────────────┬────────────┐
//! │ key        │ domain       │ path       │ name       │
//! └────────────┴──────────────┴────────────┴────────────┘
//!          joined with ';'  →  "example.com;example.com;/;sid"
//! ```

pub mod matching;

use chrono::{DateTime, Utc};

pub use matching::{has_dot_suffix, selection_order, sort_for_request};

/// Unix seconds of 9999-12-31T23:59:59Z
const END_OF_TIME_SECS: i64 = 253_402_300_799;

/// The expiry of session (non-persistent) cookies.
///
/// Representable in most date/time formats and far enough in the future that
/// comparisons against it are always well-defined.
pub fn end_of_time() -> DateTime<Utc> {
    DateTime::from_timestamp(END_OF_TIME_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// One cookie record
///
/// `creation` and `creation_index` are provenance: repositories carry them
/// forward from any earlier record with the same [`id`](Entry::id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Repository partition key (registrable domain or literal host)
    pub key: String,
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// `SameSite` attribute text, empty when absent
    pub same_site: String,
    pub secure: bool,
    pub http_only: bool,
    /// True when the cookie had an explicit lifetime
    pub persistent: bool,
    /// True when no `Domain` attribute was present
    pub host_only: bool,
    /// Absolute expiry; [`end_of_time`] for session cookies
    pub expires: DateTime<Utc>,
    /// Set on first save of this identity
    pub creation: DateTime<Utc>,
    /// Tie-breaker for equal path length and creation time
    pub creation_index: i64,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            key: String::new(),
            name: String::new(),
            value: String::new(),
            domain: String::new(),
            path: String::new(),
            same_site: String::new(),
            secure: false,
            http_only: false,
            persistent: false,
            host_only: false,
            expires: end_of_time(),
            creation: DateTime::<Utc>::default(),
            creation_index: 0,
        }
    }
}

impl Entry {
    /// The `key;domain;path;name` identity of this entry
    pub fn id(&self) -> String {
        entry_id(&self.key, &self.domain, &self.path, &self.name)
    }

    /// Whether a persistent entry has reached its expiry at `now`.
    ///
    /// Session entries never expire here; they live until the store is dropped.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.persistent && self.expires <= now
    }

    /// Copy provenance from an earlier record of the same identity
    pub fn inherit_provenance(&mut self, previous: &Entry) {
        self.creation = previous.creation;
        self.creation_index = previous.creation_index;
    }
}

/// Build an identity string from its four parts
pub fn entry_id(key: &str, domain: &str, path: &str, name: &str) -> String {
    format!("{};{};{};{}", key, domain, path, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration};

    #[test]
    fn end_of_time_is_year_9999() {
        let t = end_of_time();
        assert_eq!(t.year(), 9999);
        assert_eq!(t.month(), 12);
        assert_eq!(t.day(), 31);
    }

    #[test]
    fn session_entry_never_expires() {
        let e = Entry::default();
        assert!(!e.is_expired_at(end_of_time()));
    }

    #[test]
    fn persistent_entry_expires_at_boundary() {
        let now = Utc::now();
        let e = Entry {
            persistent: true,
            expires: now,
            ..Entry::default()
        };
        assert!(e.is_expired_at(now));
        assert!(!e.is_expired_at(now - Duration::seconds(1)));
    }

    #[test]
    fn id_joins_identity_fields() {
        let e = Entry {
            key: "example.com".into(),
            domain: "www.example.com".into(),
            path: "/a".into(),
            name: "sid".into(),
            ..Entry::default()
        };
        assert_eq!(e.id(), "example.com;www.example.com;/a;sid");
    }
}
