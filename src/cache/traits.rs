//! Cache service trait definition

use super::endpoints::BackendFamily;
use crate::error::CacheResult;
use std::time::Duration;

/// Operations a distributed cache backend client must provide
///
/// Implemented by the concrete backends (Redis, Memcached, NoOp) and by the
/// [`LoggingCache`](super::providers::LoggingCache) decorator. Keys arrive
/// already namespaced; values are serialized payloads. Expiration is fixed
/// when the service is built.
pub trait CacheService: Send + Sync {
    /// Returns `Ok(Some(value))` on hit and `Ok(None)` on miss.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    fn delete(&self, key: &str) -> CacheResult<()>;

    /// Release the underlying client resources
    ///
    /// Subsequent operations behave like a miss / no-op.
    fn disconnect(&self) -> CacheResult<()>;

    /// Expiration applied to entries written by this service
    fn expiration(&self) -> Duration;

    fn provider_name(&self) -> &'static str;
}

/// Builds backend services for a family and endpoint list
///
/// The factory and [`BackendConnection`](super::BackendConnection) only ever
/// construct clients through this seam, which keeps backend-specific setup in
/// one place and lets tests substitute in-memory services.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        family: BackendFamily,
        endpoints: &[String],
        expiration: Duration,
    ) -> CacheResult<Box<dyn CacheService>>;
}
