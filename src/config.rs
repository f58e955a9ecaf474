//! Configuration Module
//!
//! Constructor parameters for an [`ExpiringCache`](crate::cache::ExpiringCache).
//!
//! There is no environment or file loading here. The struct derives serde so a
//! host application can embed it in its own configuration; durations are
//! written as fractional seconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default time after which an entry is stale (5 minutes).
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(300);

/// Default extra time a stale entry is kept before physical eviction.
pub const DEFAULT_EVICTION_GRACE: Duration = Duration::ZERO;

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Cache configuration parameters.
///
/// # Example
/// ```
/// use expiring_cache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::default()
///     .with_expiration(Duration::from_secs(30))
///     .with_eviction_grace(Duration::from_secs(120));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time after insertion at which an entry becomes stale
    #[serde(with = "duration_secs")]
    pub expiration: Duration,
    /// Time after expiration at which an entry becomes evictable
    #[serde(with = "duration_secs")]
    pub eviction_grace: Duration,
    /// Interval between background sweep runs
    #[serde(with = "duration_secs")]
    pub sweep_period: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration: DEFAULT_EXPIRATION,
            eviction_grace: DEFAULT_EVICTION_GRACE,
            sweep_period: DEFAULT_SWEEP_PERIOD,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the two policy intervals and the default sweep period.
    pub fn new(expiration: Duration, eviction_grace: Duration) -> Self {
        Self {
            expiration,
            eviction_grace,
            sweep_period: DEFAULT_SWEEP_PERIOD,
        }
    }

    /// Sets the expiration interval.
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sets the eviction grace. Zero means expired entries are evictable at once.
    pub fn with_eviction_grace(mut self, eviction_grace: Duration) -> Self {
        self.eviction_grace = eviction_grace;
        self
    }

    /// Sets how often the background sweep runs.
    pub fn with_sweep_period(mut self, sweep_period: Duration) -> Self {
        self.sweep_period = sweep_period;
        self
    }

    // == Validate ==
    /// Checks the configuration before a cache is built from it.
    ///
    /// The sweep period must be non-zero. Zero expiration and zero grace are
    /// both allowed.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_period.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_period must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.expiration, Duration::from_secs(300));
        assert_eq!(config.eviction_grace, Duration::ZERO);
        assert_eq!(config.sweep_period, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_new_keeps_default_sweep_period() {
        let config = CacheConfig::new(Duration::from_secs(1), Duration::from_secs(2));
        assert_eq!(config.expiration, Duration::from_secs(1));
        assert_eq!(config.eviction_grace, Duration::from_secs(2));
        assert_eq!(config.sweep_period, DEFAULT_SWEEP_PERIOD);
    }

    #[test]
    fn test_builder_chaining() {
        let config = CacheConfig::default()
            .with_expiration(Duration::from_secs(10))
            .with_eviction_grace(Duration::from_secs(20))
            .with_sweep_period(Duration::from_secs(5));
        assert_eq!(config.expiration, Duration::from_secs(10));
        assert_eq!(config.eviction_grace, Duration::from_secs(20));
        assert_eq!(config.sweep_period, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_sweep_period_rejected() {
        let config = CacheConfig::default().with_sweep_period(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_expiration_allowed() {
        let config = CacheConfig::default().with_expiration(Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_durations_allowed() {
        let config = CacheConfig::new(Duration::MAX, Duration::MAX).with_sweep_period(Duration::MAX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_huge_expiration() {
        let config: CacheConfig = serde_json::from_str(r#"{"expiration": 1e18}"#).unwrap();
        assert_eq!(config.expiration, Duration::from_secs(1_000_000_000_000_000_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_fractional_seconds() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"expiration": 1.5, "eviction_grace": 2}"#).unwrap();
        assert_eq!(config.expiration, Duration::from_millis(1500));
        assert_eq!(config.eviction_grace, Duration::from_secs(2));
        assert_eq!(config.sweep_period, DEFAULT_SWEEP_PERIOD);
    }

    #[test]
    fn test_deserialize_rejects_negative_duration() {
        let result: std::result::Result<CacheConfig, _> =
            serde_json::from_str(r#"{"expiration": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_as_seconds() {
        let json = serde_json::to_value(CacheConfig::default()).unwrap();
        assert_eq!(json["expiration"], 300.0);
        assert_eq!(json["eviction_grace"], 0.0);
        assert_eq!(json["sweep_period"], 60.0);
    }
}
