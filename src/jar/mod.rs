//! Jar Module
//!
//! The cookie store seen by an HTTP client.
//!
//! ## Responsibilities
//! - Turn inbound cookies into entries (domain, path, and expiry resolution)
//! - Pick the entries that apply to an outbound request, in RFC 6265 order
//! - Delete entries found expired while answering a request
//! - Route internal failures to the configured error handler
//!
//! ## Data Flow
//! ```text
//!   set_cookies(url, cookies) ─► new_entry ─► Repository::save / delete
//!
//!   cookies(url) ─► jar_key ─► Repository::find ─┬─► expired ─► delete_many
//!                                                └─► should_send ─► sort ─► name/value
//! ```

mod cookie;
mod domain;
mod psl;

pub use cookie::{Cookie, SameSite};
pub use domain::{canonical_host, default_path, domain_and_type, is_ip, jar_key};
pub use psl::{PslList, PublicSuffixList};

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::config::{ErrorHandler, JarOptions};
use crate::entry::{end_of_time, sort_for_request, Entry};
use crate::error::{JarError, Result};
use crate::repository::EntryRepository;

/// What to do with one inbound cookie
#[derive(Debug)]
enum Inbound {
    /// Store the entry
    Store(Entry),
    /// Delete the identity; only the identity fields are filled in
    Remove(Entry),
}

/// Cookie jar backed by an [`EntryRepository`]
///
/// ## Concurrency:
/// - All methods take `&self`; the repository synchronizes storage
/// - `next_creation_index` hands out one contiguous block per `set_cookies` call
pub struct Jar {
    /// Decides registrable domains and shared suffixes
    psl: Arc<dyn PublicSuffixList>,

    /// Where entries live
    repository: Arc<dyn EntryRepository>,

    /// Receives errors from `cookies` / `set_cookies`
    on_error: ErrorHandler,

    /// Next creation index to hand out
    next_creation_index: AtomicI64,
}

impl Jar {
    /// Create a jar from explicit options
    pub fn new(options: JarOptions) -> Self {
        Self {
            psl: options.public_suffix_list,
            repository: options.repository,
            on_error: options.on_error,
            next_creation_index: AtomicI64::new(0),
        }
    }

    /// Default options with `repository` as storage (convenience method)
    pub fn with_repository(repository: Arc<dyn EntryRepository>) -> Self {
        Self::new(JarOptions::builder().repository(repository).build())
    }

    /// Get the repository
    pub fn repository(&self) -> &Arc<dyn EntryRepository> {
        &self.repository
    }

    /// Get the public suffix list
    pub fn public_suffix_list(&self) -> &Arc<dyn PublicSuffixList> {
        &self.psl
    }

    /// Repository key used for `url`'s host, if it has one
    pub fn key_for(&self, url: &Url) -> Option<String> {
        canonical_host(url).map(|host| jar_key(&host, self.psl.as_ref()))
    }

    // =========================================================================
    // Client Entry Points
    // =========================================================================

    /// Cookies to send with a request to `url`.
    ///
    /// Empty for schemes other than http and https. Failures go to the error
    /// handler and yield an empty list.
    pub fn cookies(&self, url: &Url) -> Vec<Cookie> {
        match self.cookies_at(url, Utc::now()) {
            Ok(cookies) => cookies,
            Err(e) => {
                self.report(e);
                Vec::new()
            }
        }
    }

    /// Store cookies received in a response from `url`.
    ///
    /// Does nothing for schemes other than http and https. Failures go to the
    /// error handler.
    pub fn set_cookies(&self, url: &Url, cookies: &[Cookie]) {
        if let Err(e) = self.set_cookies_at(url, cookies, Utc::now()) {
            self.report(e);
        }
    }

    /// [`cookies`](Self::cookies) with an explicit clock, returning errors
    pub fn cookies_at(&self, url: &Url, now: DateTime<Utc>) -> Result<Vec<Cookie>> {
        let https = match url.scheme() {
            "https" => true,
            "http" => false,
            _ => return Ok(Vec::new()),
        };
        let host = match canonical_host(url) {
            Some(host) => host,
            None => return Ok(Vec::new()),
        };
        let key = jar_key(&host, self.psl.as_ref());
        let path = if url.path().is_empty() { "/" } else { url.path() };

        // Step 1: Split stored entries into expired and matching
        let mut selected = Vec::new();
        let mut expired = Vec::new();
        for entry in self.repository.find(&key) {
            let entry = entry?;
            if entry.is_expired_at(now) {
                expired.push(entry.id());
                continue;
            }
            if entry.should_send(https, &host, path) {
                selected.push(entry);
            }
        }

        // Step 2: Expired entries are deleted before anything is returned
        if !expired.is_empty() {
            tracing::debug!("Deleting {} expired cookies under {}", expired.len(), key);
            self.repository.delete_many(&expired)?;
        }

        // Step 3: RFC 6265 section 5.4 point 2
        sort_for_request(&mut selected);

        Ok(selected
            .into_iter()
            .map(|e| Cookie::new(e.name, e.value))
            .collect())
    }

    /// [`set_cookies`](Self::set_cookies) with an explicit clock, returning errors.
    ///
    /// Cookies with a rejected `Domain` attribute are skipped; storage errors
    /// abort the batch.
    pub fn set_cookies_at(&self, url: &Url, cookies: &[Cookie], now: DateTime<Utc>) -> Result<()> {
        if cookies.is_empty() {
            return Ok(());
        }
        if url.scheme() != "http" && url.scheme() != "https" {
            return Ok(());
        }
        let host = match canonical_host(url) {
            Some(host) => host,
            None => return Ok(()),
        };
        let key = jar_key(&host, self.psl.as_ref());
        let def_path = default_path(url.path());

        let base = self
            .next_creation_index
            .fetch_add(cookies.len() as i64, Ordering::SeqCst);

        for (offset, cookie) in cookies.iter().enumerate() {
            match self.new_entry(cookie, now, &def_path, &host) {
                Ok(Inbound::Remove(mut entry)) => {
                    entry.key = key.clone();
                    self.repository.delete(&entry.id())?;
                }
                Ok(Inbound::Store(mut entry)) => {
                    entry.key = key.clone();
                    entry.creation = now;
                    entry.creation_index = base + offset as i64;
                    self.repository.save(entry)?;
                }
                Err(e) if e.is_domain_rejection() => {
                    tracing::debug!("Dropped cookie {:?} from {}: {}", cookie.name, host, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn report(&self, err: JarError) {
        tracing::warn!("Cookie jar error: {}", err);
        (self.on_error)(&err);
    }

    /// Build an entry from `cookie` received from `host`.
    ///
    /// `def_path` is the default path of the request URL. The key, creation,
    /// and creation index are left for the caller.
    fn new_entry(
        &self,
        cookie: &Cookie,
        now: DateTime<Utc>,
        def_path: &str,
        host: &str,
    ) -> Result<Inbound> {
        let path = match cookie.path.as_deref() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => def_path.to_string(),
        };
        let (domain, host_only) = domain_and_type(host, cookie.domain.as_deref(), self.psl.as_ref())?;

        let mut entry = Entry {
            name: cookie.name.clone(),
            path,
            domain,
            host_only,
            ..Entry::default()
        };

        // Max-Age takes precedence over Expires
        if cookie.max_age < 0 {
            return Ok(Inbound::Remove(entry));
        } else if cookie.max_age > 0 {
            entry.expires = Duration::try_seconds(cookie.max_age)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .map_or_else(end_of_time, |at| at.min(end_of_time()));
            entry.persistent = true;
        } else {
            match cookie.expires {
                None => {
                    entry.expires = end_of_time();
                    entry.persistent = false;
                }
                Some(expires) if expires <= now => return Ok(Inbound::Remove(entry)),
                Some(expires) => {
                    entry.expires = expires.min(end_of_time());
                    entry.persistent = true;
                }
            }
        }

        entry.value = cookie.value.clone();
        entry.secure = cookie.secure;
        entry.http_only = cookie.http_only;
        entry.same_site = cookie.same_site.attribute().to_string();

        Ok(Inbound::Store(entry))
    }
}
