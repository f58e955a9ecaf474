//! Cache Module
//!
//! Provides an in-memory cache with expiration, eviction grace and a
//! background eviction sweep.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ExpiringCache;
