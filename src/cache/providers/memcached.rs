//! Memcached cache provider
//!
//! Simple family. The client is not shared across worker threads; the factory
//! keeps one service per thread.

use super::redact_url;
use crate::cache::traits::CacheService;
use crate::constants::schemes;
use crate::error::{CacheError, CacheResult};
use parking_lot::RwLock;
use std::time::Duration;
use tracing::debug;

/// Memcached-backed cache service over all configured endpoints
pub struct MemcachedCacheService {
    client: RwLock<Option<memcache::Client>>,
    urls: Vec<String>,
    expiration: Duration,
}

impl std::fmt::Debug for MemcachedCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcachedCacheService")
            .field("urls", &self.urls.iter().map(|u| redact_url(u)).collect::<Vec<_>>())
            .field("expiration", &self.expiration)
            .field("connected", &self.client.read().is_some())
            .finish()
    }
}

impl MemcachedCacheService {
    /// Connect to every endpoint; bare `host:port` endpoints are accepted
    pub fn connect(endpoints: &[String], expiration: Duration) -> CacheResult<Self> {
        let urls = endpoints
            .iter()
            .map(|endpoint| normalize_endpoint(endpoint))
            .collect::<CacheResult<Vec<_>>>()?;

        let client = memcache::Client::connect(urls.clone()).map_err(|e| {
            CacheError::Configuration(format!(
                "Failed to connect to memcached at {:?}: {}",
                urls.iter().map(|u| redact_url(u)).collect::<Vec<_>>(),
                e
            ))
        })?;

        debug!(
            servers = urls.len(),
            expiration_seconds = expiration.as_secs(),
            "Memcached cache service connected"
        );

        Ok(Self {
            client: RwLock::new(Some(client)),
            urls,
            expiration,
        })
    }

    fn expiration_seconds(&self) -> u32 {
        u32::try_from(self.expiration.as_secs()).unwrap_or(u32::MAX)
    }
}

impl CacheService for MemcachedCacheService {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let guard = self.client.read();
        let Some(client) = guard.as_ref() else {
            return Ok(None);
        };

        client
            .get::<String>(key)
            .map_err(|e| CacheError::Backend(format!("Memcached GET failed: {}", e)))
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let guard = self.client.read();
        let Some(client) = guard.as_ref() else {
            return Ok(());
        };

        client
            .set(key, value, self.expiration_seconds())
            .map_err(|e| CacheError::Backend(format!("Memcached SET failed: {}", e)))
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        let guard = self.client.read();
        let Some(client) = guard.as_ref() else {
            return Ok(());
        };

        // false just means the key was absent
        client
            .delete(key)
            .map(|_| ())
            .map_err(|e| CacheError::Backend(format!("Memcached DELETE failed: {}", e)))
    }

    fn disconnect(&self) -> CacheResult<()> {
        if self.client.write().take().is_some() {
            debug!(servers = self.urls.len(), "Memcached cache service disconnected");
        }
        Ok(())
    }

    fn expiration(&self) -> Duration {
        self.expiration
    }

    fn provider_name(&self) -> &'static str {
        "memcached"
    }
}

/// Turn a configured endpoint into a URL the memcache client accepts
///
/// Accepted forms: `memcache://`, `memcache+<transport>://`, `memcached://`
/// and bare `host:port`.
fn normalize_endpoint(endpoint: &str) -> CacheResult<String> {
    let Some((scheme, rest)) = endpoint.split_once("://") else {
        return Ok(format!("{}://{}", schemes::MEMCACHE, endpoint));
    };

    let lowered = scheme.to_ascii_lowercase();
    if lowered == schemes::MEMCACHE || lowered.starts_with(&format!("{}+", schemes::MEMCACHE)) {
        return Ok(endpoint.to_string());
    }
    if lowered == schemes::MEMCACHED {
        return Ok(format!("{}://{}", schemes::MEMCACHE, rest));
    }

    Err(CacheError::Configuration(format!(
        "Unsupported memcached endpoint scheme '{}' in '{}' (expected memcache://, memcached:// or host:port)",
        scheme,
        redact_url(endpoint)
    )))
}
