use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, TopKError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TopKConfig {
    pub capacity: usize,
    /// How often a blocked reader re-checks readiness without a wake-up.
    #[serde(with = "millis")]
    pub recheck_interval: Duration,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self { capacity: 1000, recheck_interval: Duration::from_secs(2) }
    }
}

impl TopKConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TopKError::InvalidCapacity(self.capacity));
        }
        if self.recheck_interval.is_zero() {
            return Err(TopKError::InvalidRecheckInterval);
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stream_service() {
        let cfg = TopKConfig::default();
        assert_eq!(cfg.capacity, 1000);
        assert_eq!(cfg.recheck_interval, Duration::from_secs(2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_partial_json() {
        let cfg = TopKConfig::from_json_str(r#"{"capacity": 10}"#).unwrap();
        assert_eq!(cfg.capacity, 10);
        assert_eq!(cfg.recheck_interval, Duration::from_secs(2));

        let cfg = TopKConfig::from_json_str(r#"{"capacity": 3, "recheck_interval": 250}"#).unwrap();
        assert_eq!(cfg.recheck_interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = TopKConfig::from_json_str(r#"{"capacity": 0}"#).unwrap_err();
        assert!(matches!(err, TopKError::InvalidCapacity(0)));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = TopKConfig::from_json_str(r#"{"recheck_interval": 0}"#).unwrap_err();
        assert!(matches!(err, TopKError::InvalidRecheckInterval));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = TopKConfig::from_json_str("{capacity").unwrap_err();
        assert!(matches!(err, TopKError::Config(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = TopKConfig { capacity: 5, recheck_interval: Duration::from_millis(40) };
        let raw = serde_json::to_string(&cfg).unwrap();
        assert_eq!(TopKConfig::from_json_str(&raw).unwrap(), cfg);
    }
}
