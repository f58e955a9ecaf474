//! User Directory
//!
//! Caches remote user records by identifier on top of an [`ExpiringCache`].
//! The directory is an ordinary value: build one at startup and pass it to
//! whatever needs user lookups.

use tracing::debug;

use crate::cache::{CacheStats, ExpiringCache};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{RemoteUser, ServerUser};

/// Short-lived cache of remote users keyed by identifier.
#[derive(Debug)]
pub struct UserDirectory {
    cache: ExpiringCache<String, RemoteUser>,
}

impl UserDirectory {
    /// Creates a directory on the current Tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Ok(Self {
            cache: ExpiringCache::with_config(config)?,
        })
    }

    /// Returns the cached user, if present and not expired.
    pub fn user(&self, identifier: &str) -> Option<RemoteUser> {
        self.cache.get(identifier)
    }

    /// Caches each user under its identifier, replacing older records.
    pub fn cache_users<'a, U, I>(&self, users: I)
    where
        U: ServerUser + ?Sized + 'a,
        I: IntoIterator<Item = &'a U>,
    {
        let mut count = 0usize;
        for user in users {
            let record = RemoteUser::from_server_user(user);
            self.cache.set(record.identifier.clone(), record);
            count += 1;
        }
        debug!(count, "Cached remote users");
    }

    /// Drops the cached records for the given identifiers.
    pub fn evict<I, S>(&self, identifiers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for identifier in identifiers {
            self.cache.remove(identifier.as_ref());
        }
    }

    /// Drops every cached record.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Returns a snapshot of the directory's cache counters.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
