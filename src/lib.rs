//! Expiring Cache - a thread-safe in-memory cache with two-phase expiry
//!
//! Entries go stale after an expiration interval and are physically evicted
//! once an additional grace interval has passed, either when next read or by
//! a periodic background sweep.

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, ExpiringCache};
pub use config::CacheConfig;
pub use directory::UserDirectory;
pub use error::{CacheError, Result};
pub use models::{RemoteUser, ServerUser};
