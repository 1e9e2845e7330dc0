//! Tests for Entry matching
//!
//! These tests verify:
//! - Domain-match for host-only and domain cookies
//! - Path-match with and without trailing slashes
//! - The secure flag in should_send
//! - Request ordering (path length, creation, creation index)

use chrono::{DateTime, Utc};
use jarstore::entry::{sort_for_request, Entry};

// =============================================================================
// Helper Functions
// =============================================================================

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn domain_entry(domain: &str, host_only: bool) -> Entry {
    Entry {
        key: "b.com".into(),
        name: "n".into(),
        domain: domain.into(),
        path: "/".into(),
        host_only,
        ..Entry::default()
    }
}

fn ordered_entry(name: &str, path: &str, creation: i64, index: i64) -> Entry {
    Entry {
        name: name.into(),
        path: path.into(),
        creation: at(creation),
        creation_index: index,
        ..Entry::default()
    }
}

// =============================================================================
// Domain Match Tests
// =============================================================================

#[test]
fn test_domain_match_exact_host() {
    for host_only in [true, false] {
        let e = domain_entry("b.com", host_only);
        assert!(e.domain_match("b.com"));
    }
}

#[test]
fn test_domain_cookie_matches_subdomains() {
    let e = domain_entry("b.com", false);
    assert!(e.domain_match("a.b.com"));
    assert!(e.domain_match("x.y.b.com"));
    assert!(!e.domain_match("ab.com"));
    assert!(!e.domain_match("com"));
    assert!(!e.domain_match("b.com.evil"));
}

#[test]
fn test_host_only_cookie_rejects_subdomains() {
    let e = domain_entry("b.com", true);
    assert!(!e.domain_match("a.b.com"));
}

// =============================================================================
// Path Match Tests
// =============================================================================

#[test]
fn test_path_match() {
    let cases = [
        ("/", "/", true),
        ("/", "/anything", true),
        ("/foo", "/foo", true),
        ("/foo", "/foo/bar", true),
        ("/foo", "/foobar", false),
        ("/foo/", "/foo/bar", true),
        ("/foo/", "/foo", false),
        ("/foo/bar", "/foo", false),
    ];
    for (cookie_path, request_path, want) in cases {
        let e = Entry {
            path: cookie_path.into(),
            ..Entry::default()
        };
        assert_eq!(
            e.path_match(request_path),
            want,
            "cookie path {:?}, request path {:?}",
            cookie_path,
            request_path
        );
    }
}

// =============================================================================
// Should Send Tests
// =============================================================================

#[test]
fn test_secure_entry_only_over_https() {
    let e = Entry {
        secure: true,
        ..domain_entry("b.com", true)
    };
    assert!(e.should_send(true, "b.com", "/"));
    assert!(!e.should_send(false, "b.com", "/"));
}

#[test]
fn test_should_send_requires_domain_and_path() {
    let e = Entry {
        path: "/app".into(),
        ..domain_entry("b.com", false)
    };
    assert!(e.should_send(false, "www.b.com", "/app/page"));
    assert!(!e.should_send(false, "www.c.com", "/app/page"));
    assert!(!e.should_send(false, "www.b.com", "/other"));
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_longer_paths_first() {
    let mut entries = vec![
        ordered_entry("root", "/", 1, 0),
        ordered_entry("deep", "/a/b", 3, 0),
        ordered_entry("mid", "/a", 2, 0),
    ];
    sort_for_request(&mut entries);
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["deep", "mid", "root"]);
}

#[test]
fn test_equal_paths_by_creation_then_index() {
    let mut entries = vec![
        ordered_entry("c", "/x", 20, 0),
        ordered_entry("b", "/x", 10, 5),
        ordered_entry("a", "/x", 10, 2),
    ];
    sort_for_request(&mut entries);
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
