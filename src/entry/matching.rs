//! RFC 6265 matching
//!
//! Domain-match (5.1.3), path-match (5.1.4), and the cookie ordering of
//! section 5.4 point 2.

use std::cmp::Ordering;

use super::Entry;

/// Whether `s` ends in `"." + suffix`
pub fn has_dot_suffix(s: &str, suffix: &str) -> bool {
    s.len() > suffix.len()
        && s.ends_with(suffix)
        && s.as_bytes()[s.len() - suffix.len() - 1] == b'.'
}

impl Entry {
    /// Whether this entry qualifies for a request to `host`/`path`.
    ///
    /// The caller is responsible for checking expiry.
    pub fn should_send(&self, https: bool, host: &str, path: &str) -> bool {
        self.domain_match(host) && self.path_match(path) && (https || !self.secure)
    }

    /// "domain-match" of RFC 6265 section 5.1.3
    pub fn domain_match(&self, host: &str) -> bool {
        if self.domain == host {
            return true;
        }
        !self.host_only && has_dot_suffix(host, &self.domain)
    }

    /// "path-match" of RFC 6265 section 5.1.4
    pub fn path_match(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        if !request_path.starts_with(self.path.as_str()) {
            return false;
        }
        // "/any/" matches "/any/path"; "/any" matches "/any/path" but not "/anything"
        self.path.ends_with('/') || request_path.as_bytes().get(self.path.len()) == Some(&b'/')
    }
}

/// Request ordering: longest path first, then earliest creation, then lowest creation index
pub fn selection_order(a: &Entry, b: &Entry) -> Ordering {
    b.path
        .len()
        .cmp(&a.path.len())
        .then_with(|| a.creation.cmp(&b.creation))
        .then_with(|| a.creation_index.cmp(&b.creation_index))
}

/// Sort entries into the order they are sent in a request
pub fn sort_for_request(entries: &mut [Entry]) {
    entries.sort_by(selection_order);
}
