//! Public suffix list
//!
//! The capability the jar consults to find registrable domains and to refuse
//! cookies set for a shared suffix.

/// Provides the public suffix of a domain. For example:
/// - the public suffix of "example.com" is "com",
/// - the public suffix of "foo1.foo2.foo3.co.uk" is "co.uk", and
/// - the public suffix of "bar.pvt.k12.ma.us" is "pvt.k12.ma.us".
///
/// Implementations must be safe for concurrent use.
///
/// An implementation that always returns "" is valid and handy in tests, but
/// it is not secure: it lets the server for foo.com set a cookie for bar.com.
pub trait PublicSuffixList: Send + Sync {
    /// Public suffix of `domain` (lower-case, no trailing dot)
    fn public_suffix(&self, domain: &str) -> String;

    /// Where the list came from, typically with a version or timestamp
    fn description(&self) -> String;
}

/// The list compiled into the `psl` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PslList;

impl PublicSuffixList for PslList {
    fn public_suffix(&self, domain: &str) -> String {
        match psl::suffix_str(domain) {
            Some(suffix) => suffix.to_string(),
            // Unlisted names fall back to the implicit "*" rule
            None => domain.rsplit('.').next().unwrap_or(domain).to_string(),
        }
    }

    fn description(&self) -> String {
        format!("psl crate compiled-in list (jarstore {})", crate::VERSION)
    }
}
