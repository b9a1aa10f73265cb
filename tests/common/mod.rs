//! Shared test doubles for directory-cache integration tests
#![allow(dead_code)]

pub mod strategies;

use directory_cache::cache::{BackendFamily, CacheService, Connector};
use directory_cache::{CacheError, CacheResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One simulated backend; services built for the same endpoints share it
pub type Backend = Arc<Mutex<HashMap<String, String>>>;

#[derive(Debug, Clone)]
pub struct ConnectRecord {
    pub family: BackendFamily,
    pub endpoints: Vec<String>,
    pub expiration: Duration,
}

/// Connector that records every connect/disconnect and keeps data per endpoint list
#[derive(Default)]
pub struct RecordingConnector {
    backends: Mutex<HashMap<Vec<String>, Backend>>,
    connects: Mutex<Vec<ConnectRecord>>,
    disconnects: Arc<AtomicUsize>,
    fail_disconnects: Arc<AtomicBool>,
}

impl RecordingConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connect_count(&self) -> usize {
        self.connects.lock().len()
    }

    pub fn connects(&self) -> Vec<ConnectRecord> {
        self.connects.lock().clone()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Make every subsequent backend disconnect report an error
    pub fn fail_disconnects(&self) {
        self.fail_disconnects.store(true, Ordering::SeqCst);
    }

    pub fn backend(&self, endpoints: &[&str]) -> Backend {
        let mut key: Vec<String> = endpoints.iter().map(|s| s.to_string()).collect();
        key.sort();
        Arc::clone(self.backends.lock().entry(key).or_default())
    }

    pub fn as_connector(self: &Arc<Self>) -> Arc<dyn Connector> {
        Arc::clone(self) as Arc<dyn Connector>
    }
}

impl Connector for RecordingConnector {
    fn connect(
        &self,
        family: BackendFamily,
        endpoints: &[String],
        expiration: Duration,
    ) -> CacheResult<Box<dyn CacheService>> {
        if endpoints.iter().any(|e| e.contains("malformed")) {
            return Err(CacheError::Configuration(format!(
                "cannot parse endpoints {:?}",
                endpoints
            )));
        }

        let mut key = endpoints.to_vec();
        key.sort();
        let backend = Arc::clone(self.backends.lock().entry(key).or_default());

        self.connects.lock().push(ConnectRecord {
            family,
            endpoints: endpoints.to_vec(),
            expiration,
        });

        Ok(Box::new(RecordingService {
            backend,
            expiration,
            disconnects: Arc::clone(&self.disconnects),
            fail_disconnects: Arc::clone(&self.fail_disconnects),
        }))
    }
}

pub struct RecordingService {
    backend: Backend,
    expiration: Duration,
    disconnects: Arc<AtomicUsize>,
    fail_disconnects: Arc<AtomicBool>,
}

impl CacheService for RecordingService {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.backend.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.backend
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.backend.lock().remove(key);
        Ok(())
    }

    fn disconnect(&self) -> CacheResult<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnects.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("socket already closed".to_string()));
        }
        Ok(())
    }

    fn expiration(&self) -> Duration {
        self.expiration
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

pub fn endpoints(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
