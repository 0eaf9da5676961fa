//! Cache configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Cache configuration for pending slot-filling state.
///
/// When no Redis URL is configured the application falls back to the
/// in-process store, which is fine for a single instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub redis_url: Option<String>,
}

impl CacheConfig {
    /// Check if Redis is configured
    pub fn has_redis(&self) -> bool {
        self.redis_url.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.redis_url {
            if !url.is_empty() && !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        Ok(())
    }
}
