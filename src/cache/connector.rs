//! Default backend construction

use super::endpoints::BackendFamily;
use super::providers::{LoggingCache, MemcachedCacheService, RedisCacheService};
use super::traits::{CacheService, Connector};
use crate::error::{CacheError, CacheResult};
use std::time::Duration;
use tracing::debug;

/// Builds real Redis / Memcached clients wrapped in the logging decorator
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnector;

impl Connector for DefaultConnector {
    fn connect(
        &self,
        family: BackendFamily,
        endpoints: &[String],
        expiration: Duration,
    ) -> CacheResult<Box<dyn CacheService>> {
        let first = endpoints.first().ok_or_else(|| {
            CacheError::Configuration("Cannot connect a cache backend without endpoints".to_string())
        })?;

        match family {
            BackendFamily::LockCapable => {
                if endpoints.len() > 1 {
                    debug!(
                        ignored = endpoints.len() - 1,
                        "Redis backend connects to the first endpoint only"
                    );
                }
                let service = RedisCacheService::connect(first, expiration)?;
                Ok(Box::new(LoggingCache::new(service)))
            }
            BackendFamily::Simple => {
                let service = MemcachedCacheService::connect(endpoints, expiration)?;
                Ok(Box::new(LoggingCache::new(service)))
            }
        }
    }
}
