//! Settings for building a [`CacheFront`](crate::CacheFront).
//!
//! ```rust
//! use lru_front::CacheConfig;
//!
//! let config = CacheConfig { capacity: 256 };
//! assert_eq!(config.capacity, 256);
//! ```

use crate::error::ConfigError;

pub const CAPACITY_ENV: &str = "LRU_FRONT_CAPACITY";

const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of resident entries.
    /// Default: 1000
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Reads the capacity from `LRU_FRONT_CAPACITY`, falling back to the default when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_capacity_var(std::env::var(CAPACITY_ENV).ok())
    }

    fn from_capacity_var(raw: Option<String>) -> Result<Self, ConfigError> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };

        let capacity = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidEnv {
                name: CAPACITY_ENV,
                value: raw.clone(),
            })?;

        let config = Self { capacity };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
