//! Host and domain resolution
//!
//! Jar keys, default paths, and the `Domain` attribute rules of RFC 6265
//! section 5.3.

use std::net::IpAddr;

use url::{Host, Url};

use crate::entry::has_dot_suffix;
use crate::error::{JarError, Result};

use super::PublicSuffixList;

/// Canonical host of `url`: lower-case, no trailing dot, IPv6 without brackets
pub fn canonical_host(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.strip_suffix('.').unwrap_or(domain);
            if domain.is_empty() {
                return None;
            }
            Some(domain.to_ascii_lowercase())
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Whether `host` is an IP literal
pub fn is_ip(host: &str) -> bool {
    host.parse::<IpAddr>().is_ok()
}

/// Repository partition key for `host`.
///
/// IP literals and whole-host public suffixes key on the host itself;
/// otherwise the key is the registrable domain (suffix plus one label).
pub fn jar_key(host: &str, list: &dyn PublicSuffixList) -> String {
    if is_ip(host) {
        return host.to_string();
    }

    let suffix = list.public_suffix(host);
    if suffix == host {
        return host.to_string();
    }
    if !has_dot_suffix(host, &suffix) {
        // Broken list; keying on the host is a safe stopgap
        return host.to_string();
    }

    let prefix = &host[..host.len() - suffix.len() - 1];
    let start = prefix.rfind('.').map(|i| i + 1).unwrap_or(0);
    host[start..].to_string()
}

/// Directory part of a request path (RFC 6265 section 5.1.4)
pub fn default_path(path: &str) -> String {
    if !path.starts_with('/') {
        return "/".to_string();
    }
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

/// Resolve the cookie's domain and whether it is host-only.
///
/// `domain` is the raw `Domain` attribute; `None` or empty means a host cookie.
pub fn domain_and_type(
    host: &str,
    domain: Option<&str>,
    list: &dyn PublicSuffixList,
) -> Result<(String, bool)> {
    let raw = match domain {
        None | Some("") => return Ok((host.to_string(), true)),
        Some(raw) => raw,
    };

    // Domain-matching excludes IP addresses
    if is_ip(host) {
        return Err(JarError::NoHostname(host.to_string()));
    }

    let domain = raw.strip_prefix('.').unwrap_or(raw);
    if domain.is_empty() || domain.starts_with('.') {
        // "Domain=." or "Domain=..some.thing"
        return Err(JarError::MalformedDomain(raw.to_string()));
    }

    if !domain.is_ascii() {
        // Must arrive punycode-encoded
        return Err(JarError::MalformedDomain(raw.to_string()));
    }
    let domain = domain.to_ascii_lowercase();

    if domain.ends_with('.') {
        return Err(JarError::MalformedDomain(raw.to_string()));
    }

    // RFC 6265 section 5.3 step 5
    let suffix = list.public_suffix(&domain);
    if !suffix.is_empty() && !has_dot_suffix(&domain, &suffix) {
        if host == domain {
            // The one case where a Domain attribute still yields a host cookie
            return Ok((host.to_string(), true));
        }
        return Err(JarError::IllegalDomain(raw.to_string()));
    }

    // www.mycompany.com cannot set cookies for .ourcompetitors.com
    if host != domain && !has_dot_suffix(host, &domain) {
        return Err(JarError::IllegalDomain(raw.to_string()));
    }

    Ok((domain, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Treats "com", "co.uk" and "blogspot.com" as public suffixes
    struct TestList;

    impl PublicSuffixList for TestList {
        fn public_suffix(&self, domain: &str) -> String {
            for suffix in ["blogspot.com", "co.uk", "com"] {
                if domain == suffix || has_dot_suffix(domain, suffix) {
                    return suffix.to_string();
                }
            }
            domain.rsplit('.').next().unwrap_or(domain).to_string()
        }

        fn description(&self) -> String {
            "test list".to_string()
        }
    }

    struct BrokenList;

    impl PublicSuffixList for BrokenList {
        fn public_suffix(&self, _domain: &str) -> String {
            "zz".to_string()
        }

        fn description(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_jar_key() {
        let cases = [
            ("foo.www.example.com", "example.com"),
            ("example.com", "example.com"),
            ("www.bbc.co.uk", "bbc.co.uk"),
            ("co.uk", "co.uk"),
            ("foo.blogspot.com", "foo.blogspot.com"),
            ("localhost", "localhost"),
            ("127.0.0.1", "127.0.0.1"),
            ("::1", "::1"),
        ];
        for (host, want) in cases {
            assert_eq!(jar_key(host, &TestList), want, "host {}", host);
        }
    }

    #[test]
    fn test_jar_key_broken_list_falls_back_to_host() {
        assert_eq!(jar_key("www.example.com", &BrokenList), "www.example.com");
    }

    #[test]
    fn test_default_path() {
        let cases = [
            ("", "/"),
            ("xy", "/"),
            ("xy/z", "/"),
            ("/", "/"),
            ("/abc", "/"),
            ("/abc/", "/abc"),
            ("/abc/xyz", "/abc"),
            ("/abc/xyz/", "/abc/xyz"),
            ("/a/b/c.html", "/a/b"),
        ];
        for (path, want) in cases {
            assert_eq!(default_path(path), want, "path {:?}", path);
        }
    }

    #[test]
    fn test_domain_and_type() {
        let host = "www.example.com";
        let ok = [
            (None, "www.example.com", true),
            (Some(""), "www.example.com", true),
            (Some("example.com"), "example.com", false),
            (Some(".example.com"), "example.com", false),
            (Some("WWW.Example.COM"), "www.example.com", false),
        ];
        for (domain, want, host_only) in ok {
            assert_eq!(
                domain_and_type(host, domain, &TestList).unwrap(),
                (want.to_string(), host_only),
                "domain {:?}",
                domain
            );
        }

        let malformed = [".", "..example.com", "www.example.com.", "exämple.com"];
        for domain in malformed {
            let err = domain_and_type(host, Some(domain), &TestList).unwrap_err();
            assert!(matches!(err, JarError::MalformedDomain(_)), "domain {:?}", domain);
        }

        let illegal = ["com", "other.com", "ww.example.com", "xwww.example.com"];
        for domain in illegal {
            let err = domain_and_type(host, Some(domain), &TestList).unwrap_err();
            assert!(matches!(err, JarError::IllegalDomain(_)), "domain {:?}", domain);
        }
    }

    #[test]
    fn test_public_suffix_host_may_set_host_cookie() {
        assert_eq!(
            domain_and_type("co.uk", Some("co.uk"), &TestList).unwrap(),
            ("co.uk".to_string(), true)
        );
        assert!(domain_and_type("bbc.co.uk", Some("co.uk"), &TestList).is_err());
    }

    #[test]
    fn test_ip_host_rejects_domain_attribute() {
        let err = domain_and_type("127.0.0.1", Some("127.0.0.1"), &TestList).unwrap_err();
        assert!(matches!(err, JarError::NoHostname(_)));
        assert_eq!(
            domain_and_type("127.0.0.1", None, &TestList).unwrap(),
            ("127.0.0.1".to_string(), true)
        );
    }
}
