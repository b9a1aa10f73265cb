//! Redis cache provider
//!
//! Lock-capable family. One connection is shared by every worker thread, so
//! commands are serialized through a mutex around the synchronous client
//! connection.

use super::redact_url;
use crate::cache::traits::CacheService;
use crate::error::{CacheError, CacheResult};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::debug;

/// Redis-backed cache service
pub struct RedisCacheService {
    connection: Mutex<Option<redis::Connection>>,
    url: String,
    expiration: Duration,
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("url", &redact_url(&self.url))
            .field("expiration", &self.expiration)
            .field("connected", &self.connection.lock().is_some())
            .finish()
    }
}

impl RedisCacheService {
    /// Open a connection to `url` (`redis://`, `rediss://` or `unix://`)
    ///
    /// Both an unparseable URL and an unreachable server are configuration
    /// errors: the endpoint as configured cannot serve the cache.
    pub fn connect(url: &str, expiration: Duration) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            CacheError::Configuration(format!(
                "Invalid Redis endpoint '{}': {}",
                redact_url(url),
                e
            ))
        })?;

        let connection = client.get_connection().map_err(|e| {
            CacheError::Configuration(format!(
                "Failed to connect to Redis at '{}': {}",
                redact_url(url),
                e
            ))
        })?;

        debug!(url = %redact_url(url), expiration_seconds = expiration.as_secs(), "Redis cache service connected");

        Ok(Self {
            connection: Mutex::new(Some(connection)),
            url: url.to_string(),
            expiration,
        })
    }
}

impl CacheService for RedisCacheService {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut guard = self.connection.lock();
        let Some(conn) = guard.as_mut() else {
            return Ok(None);
        };

        redis::cmd("GET")
            .arg(key)
            .query::<Option<String>>(conn)
            .map_err(|e| CacheError::Backend(format!("Redis GET failed: {}", e)))
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut guard = self.connection.lock();
        let Some(conn) = guard.as_mut() else {
            return Ok(());
        };

        redis::cmd("SETEX")
            .arg(key)
            .arg(self.expiration.as_secs().max(1))
            .arg(value)
            .query::<()>(conn)
            .map_err(|e| CacheError::Backend(format!("Redis SETEX failed: {}", e)))
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        let mut guard = self.connection.lock();
        let Some(conn) = guard.as_mut() else {
            return Ok(());
        };

        redis::cmd("DEL")
            .arg(key)
            .query::<()>(conn)
            .map_err(|e| CacheError::Backend(format!("Redis DEL failed: {}", e)))
    }

    fn disconnect(&self) -> CacheResult<()> {
        if self.connection.lock().take().is_some() {
            debug!(url = %redact_url(&self.url), "Redis cache service disconnected");
        }
        Ok(())
    }

    fn expiration(&self) -> Duration {
        self.expiration
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = RedisCacheService::connect("redis://[not-a-host", Duration::from_secs(300));
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    // Integration tests require a running Redis instance (behind test-services feature)
    #[cfg(feature = "test-services")]
    mod integration {
        use super::*;
        use tracing::warn;

        fn test_redis_url() -> String {
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
        }

        #[test]
        fn test_redis_crud_operations() {
            let svc = match RedisCacheService::connect(&test_redis_url(), Duration::from_secs(60)) {
                Ok(svc) => svc,
                Err(e) => {
                    warn!("Skipping Redis test (not available): {}", e);
                    return;
                }
            };

            let key = format!("test:crud:{}", uuid::Uuid::new_v4());
            svc.set(&key, "").unwrap();
            assert_eq!(svc.get(&key).unwrap(), Some(String::new()));

            svc.delete(&key).unwrap();
            assert_eq!(svc.get(&key).unwrap(), None);
        }

        #[test]
        fn test_redis_disconnect_degrades_to_miss() {
            let svc = match RedisCacheService::connect(&test_redis_url(), Duration::from_secs(60)) {
                Ok(svc) => svc,
                Err(e) => {
                    warn!("Skipping Redis test (not available): {}", e);
                    return;
                }
            };

            let key = format!("test:disconnect:{}", uuid::Uuid::new_v4());
            svc.set(&key, "value").unwrap();
            svc.disconnect().unwrap();
            assert_eq!(svc.get(&key).unwrap(), None);
        }
    }
}
