use rustdb_error::errinput;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Construction parameters for a replacer.
///
/// `capacity` is the number of frames the buffer pool will ask the replacer to
/// manage. It is informational: frames beyond it are still tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacerConfig {
    pub capacity: usize,
    pub k: usize,
}

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            k: 2,
        }
    }
}

impl ReplacerConfig {
    pub fn new(capacity: usize, k: usize) -> Self {
        Self { capacity, k }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Checks that the parameters describe a usable replacer.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return errinput!("k must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustdb_error::Error;

    #[test]
    fn test_default_is_lru_2() {
        let config = ReplacerConfig::default();
        assert_eq!(config.k, 2);
        assert_eq!(config.capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = ReplacerConfig::default().with_capacity(10).with_k(3);
        assert_eq!(config, ReplacerConfig::new(10, 3));
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let config = ReplacerConfig::new(10, 0);
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        use serde::de::value::{Error as ValueError, MapDeserializer};

        let de: MapDeserializer<'_, _, ValueError> =
            MapDeserializer::new(vec![("k", 3usize)].into_iter());
        let config = ReplacerConfig::deserialize(de).unwrap();
        assert_eq!(config, ReplacerConfig::new(64, 3));
    }

    #[test]
    fn test_zero_capacity_is_allowed() {
        assert!(ReplacerConfig::new(0, 1).validate().is_ok());
    }
}
