//! Cookie values exchanged with the jar
//!
//! Inbound cookies arrive already parsed from `Set-Cookie`; outbound cookies
//! carry only a name and a value.

use chrono::{DateTime, Utc};

/// `SameSite` attribute of an inbound cookie
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SameSite {
    /// Attribute absent
    #[default]
    Unset,
    /// Attribute present without a value
    Default,
    Lax,
    Strict,
    None,
}

impl SameSite {
    /// Attribute text as stored on an entry
    pub fn attribute(self) -> &'static str {
        match self {
            SameSite::Default => "SameSite",
            SameSite::Lax => "SameSite=Lax",
            SameSite::Strict => "SameSite=Strict",
            SameSite::Unset | SameSite::None => "",
        }
    }
}

/// A parsed cookie
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// `Path` attribute; ignored unless it starts with '/'
    pub path: Option<String>,
    /// `Domain` attribute; absent means host-only
    pub domain: Option<String>,
    /// `Expires` attribute
    pub expires: Option<DateTime<Utc>>,
    /// `Max-Age`: 0 = absent, negative = delete now, positive = seconds to live
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }
}
