//! Cache Entry Module
//!
//! A stored value together with the instant at which it goes stale.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cache entry.
///
/// Entries are never mutated in place; a new `set` for the same key replaces
/// the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute instant after which the entry is stale, `None` if that
    /// instant is beyond the clock's range
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `expiration` after `now`.
    ///
    /// An expiration too large to represent leaves the entry fresh forever.
    pub fn new(value: V, now: Instant, expiration: Duration) -> Self {
        Self {
            value,
            expires_at: now.checked_add(expiration),
        }
    }

    // == Is Expired ==
    /// Returns true once `now` is strictly past the expiration instant.
    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |expires_at| now > expires_at)
    }

    // == Is Evictable ==
    /// Returns true once `now` is strictly past expiration plus `grace`.
    ///
    /// An evictable entry is always expired as well.
    #[inline]
    pub fn is_evictable(&self, now: Instant, grace: Duration) -> bool {
        self.expires_at
            .and_then(|expires_at| expires_at.checked_add(grace))
            .map_or(false, |evictable_at| now > evictable_at)
    }

    /// Time left before the entry goes stale, zero if it already has.
    pub fn time_to_expiry(&self, now: Instant) -> Duration {
        self.expires_at
            .map_or(Duration::MAX, |expires_at| expires_at.saturating_duration_since(now))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_fresh_at_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new("value", now, Duration::from_secs(10));

        assert_eq!(entry.value, "value");
        assert_eq!(entry.expires_at, Some(now + Duration::from_secs(10)));
        assert!(!entry.is_expired(now));
        assert!(!entry.is_evictable(now, Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_is_strict() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::from_secs(1));
        let at_boundary = now + Duration::from_secs(1);

        assert!(!entry.is_expired(at_boundary));
        assert!(entry.is_expired(at_boundary + Duration::from_millis(1)));
    }

    #[test]
    fn test_zero_expiration_expires_after_any_elapsed_time() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::ZERO);

        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(now + Duration::from_nanos(1)));
    }

    #[test]
    fn test_grace_window() {
        let now = Instant::now();
        let grace = Duration::from_secs(2);
        let entry = CacheEntry::new(1, now, Duration::from_secs(1));

        let in_grace = now + Duration::from_millis(1500);
        assert!(entry.is_expired(in_grace));
        assert!(!entry.is_evictable(in_grace, grace));

        let past_grace = now + Duration::from_millis(3500);
        assert!(entry.is_evictable(past_grace, grace));
    }

    #[test]
    fn test_zero_grace_evictable_as_soon_as_expired() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::from_secs(1));
        let later = now + Duration::from_millis(1001);

        assert!(entry.is_expired(later));
        assert!(entry.is_evictable(later, Duration::ZERO));
    }

    #[test]
    fn test_time_to_expiry() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::from_secs(10));

        assert_eq!(entry.time_to_expiry(now), Duration::from_secs(10));
        assert_eq!(
            entry.time_to_expiry(now + Duration::from_secs(4)),
            Duration::from_secs(6)
        );
        assert_eq!(
            entry.time_to_expiry(now + Duration::from_secs(20)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_unrepresentable_expiration_never_expires() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::MAX);

        assert_eq!(entry.expires_at, None);
        assert!(!entry.is_expired(now + Duration::from_secs(86_400 * 365)));
        assert!(!entry.is_evictable(now + Duration::from_secs(86_400 * 365), Duration::ZERO));
        assert_eq!(entry.time_to_expiry(now), Duration::MAX);
    }

    #[test]
    fn test_unrepresentable_grace_never_evicts() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::from_secs(1));
        let later = now + Duration::from_secs(86_400 * 365);

        assert!(entry.is_expired(later));
        assert!(!entry.is_evictable(later, Duration::MAX));
    }
}
