//! In-memory backend used by the cache unit tests

use super::endpoints::BackendFamily;
use super::traits::{CacheService, Connector};
use crate::error::{CacheError, CacheResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
pub(crate) struct ConnectorStats {
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

pub(crate) struct MemoryService {
    entries: Arc<Mutex<HashMap<String, String>>>,
    expiration: Duration,
    stats: Arc<ConnectorStats>,
}

impl CacheService for MemoryService {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn disconnect(&self) -> CacheResult<()> {
        self.stats.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn expiration(&self) -> Duration {
        self.expiration
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Connector whose services share one map, so data survives reconnects
#[derive(Default)]
pub(crate) struct MemoryConnector {
    pub entries: Arc<Mutex<HashMap<String, String>>>,
    pub stats: Arc<ConnectorStats>,
}

impl MemoryConnector {
    pub fn connects(&self) -> usize {
        self.stats.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.stats.disconnects.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    fn connect(
        &self,
        _family: BackendFamily,
        endpoints: &[String],
        expiration: Duration,
    ) -> CacheResult<Box<dyn CacheService>> {
        if endpoints.iter().any(|e| e.contains("invalid")) {
            return Err(CacheError::Configuration(format!(
                "malformed endpoints {:?}",
                endpoints
            )));
        }
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryService {
            entries: Arc::clone(&self.entries),
            expiration,
            stats: Arc::clone(&self.stats),
        }))
    }
}
