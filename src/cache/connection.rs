//! Backend connection handed out by the provider factory
//!
//! A [`BackendConnection`] binds one backend service to the endpoint set and
//! family it was built from. It namespaces keys, rebuilds its client when the
//! expiration changes, and offers [`get_data`](BackendConnection::get_data) as
//! the single point where "ask the cache" meets "do the expensive work".

use super::endpoints::{BackendFamily, EndpointSet};
use super::providers::NoOpCacheService;
use super::traits::{CacheService, Connector};
use crate::constants::DEFAULT_KEY_PREFIX;
use crate::error::{CacheError, CacheResult};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A live (or null) connection to a distributed cache backend
pub struct BackendConnection {
    family: Option<BackendFamily>,
    endpoints: EndpointSet,
    key_prefix: String,
    service: RwLock<Arc<dyn CacheService>>,
    connector: Option<Arc<dyn Connector>>,
    disconnected: AtomicBool,
}

impl std::fmt::Debug for BackendConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConnection")
            .field("family", &self.family)
            .field("endpoints", &self.endpoints.as_slice())
            .field("provider", &self.provider_name())
            .field("expiration", &self.expiration())
            .field("disconnected", &self.is_disconnected())
            .finish()
    }
}

impl BackendConnection {
    /// Connection used when caching is disabled: every read misses, every write is dropped
    pub fn null() -> Self {
        Self {
            family: None,
            endpoints: EndpointSet::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            service: RwLock::new(Arc::new(NoOpCacheService::new())),
            connector: None,
            disconnected: AtomicBool::new(false),
        }
    }

    /// Build a connection for `family` through `connector`
    pub fn connect(
        connector: Arc<dyn Connector>,
        family: BackendFamily,
        endpoints: &[String],
        expiration: Duration,
        key_prefix: impl Into<String>,
    ) -> CacheResult<Self> {
        if endpoints.is_empty() {
            return Err(CacheError::Configuration(
                "Cannot connect a cache backend without endpoints".to_string(),
            ));
        }

        let service: Arc<dyn CacheService> =
            Arc::from(connector.connect(family, endpoints, expiration)?);

        Ok(Self {
            family: Some(family),
            endpoints: EndpointSet::new(endpoints),
            key_prefix: key_prefix.into(),
            service: RwLock::new(service),
            connector: Some(connector),
            disconnected: AtomicBool::new(false),
        })
    }

    /// `None` for the null connection
    pub fn family(&self) -> Option<BackendFamily> {
        self.family
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    pub fn is_null(&self) -> bool {
        self.family.is_none()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    pub fn provider_name(&self) -> &'static str {
        self.service.read().provider_name()
    }

    pub fn expiration(&self) -> Duration {
        self.service.read().expiration()
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn current_service(&self) -> Option<Arc<dyn CacheService>> {
        if self.is_disconnected() {
            return None;
        }
        Some(Arc::clone(&self.service.read()))
    }

    /// Look up a serialized payload; `Ok(None)` is the "not found" sentinel
    pub fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.current_service() {
            Some(service) => service.get(&self.namespaced(key)),
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        match self.current_service() {
            Some(service) => service.set(&self.namespaced(key), value),
            None => Ok(()),
        }
    }

    pub fn delete(&self, key: &str) -> CacheResult<()> {
        match self.current_service() {
            Some(service) => service.delete(&self.namespaced(key)),
            None => Ok(()),
        }
    }

    /// Release the backend client
    ///
    /// Only the first call reaches the backend. Afterwards the connection
    /// behaves like the null connection for anyone still holding it.
    pub fn disconnect(&self) -> CacheResult<()> {
        if self.disconnected.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let service = Arc::clone(&self.service.read());
        service.disconnect()
    }

    /// Change the expiration used for subsequently written entries
    ///
    /// Expiration is fixed per backend client, so a different value builds a
    /// new client and releases the old one.
    pub fn set_timeout(&self, seconds: u64) -> CacheResult<()> {
        let expiration = Duration::from_secs(seconds);
        let (Some(connector), Some(family)) = (self.connector.as_ref(), self.family) else {
            return Ok(());
        };

        let mut slot = self.service.write();
        if slot.expiration() == expiration || self.is_disconnected() {
            return Ok(());
        }

        let replacement: Arc<dyn CacheService> =
            Arc::from(connector.connect(family, self.endpoints.as_slice(), expiration)?);
        let previous = std::mem::replace(&mut *slot, replacement);
        drop(slot);

        debug!(
            family = %family,
            expiration_seconds = seconds,
            "Rebuilt cache backend with new expiration"
        );

        if let Err(e) = previous.disconnect() {
            warn!(family = %family, error = %e, "Failed to release cache backend after timeout change");
        }
        Ok(())
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    ///
    /// With `force_reload` the entry is evicted first and always recomputed.
    /// Concurrent misses may each run `compute`; the last write wins.
    pub fn get_data<T, F>(&self, key: &str, force_reload: bool, compute: F) -> CacheResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.try_get_data(key, force_reload, || Ok::<T, CacheError>(compute()))
    }

    /// Fallible-compute variant of [`get_data`](Self::get_data)
    ///
    /// A `compute` error is returned as-is and nothing is stored.
    pub fn try_get_data<T, E, F>(&self, key: &str, force_reload: bool, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
    {
        if force_reload {
            self.delete(key)?;
        } else if let Some(payload) = self.get(key)? {
            match serde_json::from_str::<T>(&payload) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding undecodable cached payload");
                }
            }
        }

        let value = compute()?;
        let payload = serde_json::to_string(&value).map_err(CacheError::from)?;
        self.set(key, &payload)?;
        Ok(value)
    }
}
