//! Cache provider factory
//!
//! Resolves the [`BackendConnection`] for the currently configured endpoints,
//! reusing the existing connection while the endpoint set is unchanged and
//! replacing it (disconnect first) when it changes.
//!
//! ## Storage scopes
//!
//! ```text
//! ConnectionSlots
//!   ├── shared      Mutex<Option<conn>>          <- lock-capable family, all threads
//!   └── per_thread  DashMap<ThreadId, conn>      <- simple family, one per worker thread
//! ```
//!
//! Resolution checks the calling thread's slot first, then the shared slot.
//! The shared mutex is held across check, disconnect and replacement, so a
//! resolver never receives a shared connection that another resolver has
//! already released.
//!
//! Each thread holding a per-thread connection also holds a thread-local
//! `ThreadSlotGuard` for the factory. When the thread exits the guard drops,
//! removing the thread's entry and disconnecting it.

use super::connection::BackendConnection;
use super::connector::DefaultConnector;
use super::endpoints::{BackendFamily, StorageScope};
use super::traits::Connector;
use crate::config::{CacheSettings, ServerSource};
use crate::error::CacheResult;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

type ThreadConnections = DashMap<ThreadId, Arc<BackendConnection>>;

/// Connection slots owned by one factory instance
#[derive(Default)]
struct ConnectionSlots {
    shared: Mutex<Option<Arc<BackendConnection>>>,
    per_thread: Arc<ThreadConnections>,
}

thread_local! {
    static THREAD_SLOT_GUARDS: RefCell<HashMap<Uuid, ThreadSlotGuard>> = RefCell::new(HashMap::new());
}

/// Releases the owning thread's per-thread connection of one factory on drop
struct ThreadSlotGuard {
    factory_id: Uuid,
    thread_id: ThreadId,
    connections: Weak<ThreadConnections>,
}

impl ThreadSlotGuard {
    fn is_orphaned(&self) -> bool {
        self.connections.strong_count() == 0
    }
}

impl Drop for ThreadSlotGuard {
    fn drop(&mut self) {
        let Some(connections) = self.connections.upgrade() else {
            return;
        };
        if let Some((_, connection)) = connections.remove(&self.thread_id) {
            retire_connection(self.factory_id, &connection);
        }
    }
}

/// Disconnect a superseded connection; failures never block its replacement
fn retire_connection(factory_id: Uuid, connection: &BackendConnection) {
    debug!(
        factory_id = %factory_id,
        family = ?connection.family(),
        "Releasing stale cache connection"
    );
    if let Err(e) = connection.disconnect() {
        warn!(
            factory_id = %factory_id,
            error = %e,
            "Failed to disconnect stale cache connection"
        );
    }
}

/// Produces and maintains backend connections for a changing endpoint configuration
pub struct CacheProviderFactory {
    id: Uuid,
    connector: Arc<dyn Connector>,
    expiration: Duration,
    key_prefix: String,
    null: Arc<BackendConnection>,
    slots: ConnectionSlots,
}

impl std::fmt::Debug for CacheProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheProviderFactory")
            .field("id", &self.id)
            .field("expiration", &self.expiration)
            .field("key_prefix", &self.key_prefix)
            .field("shared", &self.slots.shared.lock().is_some())
            .field("thread_connections", &self.slots.per_thread.len())
            .finish()
    }
}

impl CacheProviderFactory {
    /// Factory building real Redis / Memcached clients
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_connector(Arc::new(DefaultConnector), settings)
    }

    pub fn with_connector(connector: Arc<dyn Connector>, settings: &CacheSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            connector,
            expiration: settings.expiration(),
            key_prefix: settings.key_prefix.clone(),
            null: Arc::new(BackendConnection::null()),
            slots: ConnectionSlots::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Connection for `endpoints`
    ///
    /// An empty list yields the null connection and leaves stored connections
    /// alone. Malformed or unreachable endpoints fail with
    /// [`CacheError::Configuration`](crate::error::CacheError::Configuration).
    pub fn provider(&self, endpoints: &[String]) -> CacheResult<Arc<BackendConnection>> {
        let Some(first) = endpoints.first() else {
            return Ok(Arc::clone(&self.null));
        };
        let thread_id = thread::current().id();

        if let Some(existing) = self.thread_connection(thread_id) {
            if existing.endpoints().matches(endpoints) {
                return Ok(existing);
            }
            self.slots.per_thread.remove(&thread_id);
            self.retire(&existing);
        }

        let mut shared = self.slots.shared.lock();
        if let Some(existing) = shared.as_ref() {
            if existing.endpoints().matches(endpoints) {
                return Ok(Arc::clone(existing));
            }
        }
        if let Some(stale) = shared.take() {
            self.retire(&stale);
        }

        let family = BackendFamily::classify(first);
        match family.scope() {
            StorageScope::Shared => {
                let connection = self.build(family, endpoints)?;
                *shared = Some(Arc::clone(&connection));
                Ok(connection)
            }
            StorageScope::ThreadLocal => {
                drop(shared);
                let connection = self.build(family, endpoints)?;
                self.slots
                    .per_thread
                    .insert(thread_id, Arc::clone(&connection));
                self.register_thread_guard(thread_id);
                Ok(connection)
            }
        }
    }

    /// Like [`provider`](Self::provider) but degrades to the null connection on error
    pub fn provider_or_null(&self, endpoints: &[String]) -> Arc<BackendConnection> {
        match self.provider(endpoints) {
            Ok(connection) => connection,
            Err(e) => {
                warn!(
                    factory_id = %self.id,
                    error = %e,
                    "Failed to establish cache connection, falling back to null cache (graceful degradation)"
                );
                Arc::clone(&self.null)
            }
        }
    }

    /// Read the endpoints fresh from `source` and resolve them
    pub fn resolve(&self, source: &dyn ServerSource) -> CacheResult<Arc<BackendConnection>> {
        self.provider(&source.servers())
    }

    pub fn resolve_or_null(&self, source: &dyn ServerSource) -> Arc<BackendConnection> {
        self.provider_or_null(&source.servers())
    }

    /// Connection currently stored in the shared slot
    pub fn shared_connection(&self) -> Option<Arc<BackendConnection>> {
        self.slots.shared.lock().clone()
    }

    /// Connection currently stored for the calling thread
    pub fn current_thread_connection(&self) -> Option<Arc<BackendConnection>> {
        self.thread_connection(thread::current().id())
    }

    pub fn thread_connection_count(&self) -> usize {
        self.slots.per_thread.len()
    }

    /// Disconnect and forget the calling thread's connection
    ///
    /// Thread exit does the same automatically; this is for workers that
    /// outlive their use of the cache.
    pub fn release_current_thread(&self) {
        let guard = THREAD_SLOT_GUARDS.with(|guards| guards.borrow_mut().remove(&self.id));
        drop(guard);
        if let Some((_, connection)) = self.slots.per_thread.remove(&thread::current().id()) {
            self.retire(&connection);
        }
    }

    /// Disconnect every stored connection
    pub fn shutdown(&self) {
        if let Some(connection) = self.slots.shared.lock().take() {
            self.retire(&connection);
        }

        let threads: Vec<ThreadId> = self
            .slots
            .per_thread
            .iter()
            .map(|entry| *entry.key())
            .collect();
        for thread_id in threads {
            if let Some((_, connection)) = self.slots.per_thread.remove(&thread_id) {
                self.retire(&connection);
            }
        }
    }

    fn thread_connection(&self, thread_id: ThreadId) -> Option<Arc<BackendConnection>> {
        self.slots
            .per_thread
            .get(&thread_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn register_thread_guard(&self, thread_id: ThreadId) {
        let connections = Arc::downgrade(&self.slots.per_thread);
        let stale: Vec<ThreadSlotGuard> = THREAD_SLOT_GUARDS.with(|guards| {
            let mut guards = guards.borrow_mut();
            guards.entry(self.id).or_insert_with(|| ThreadSlotGuard {
                factory_id: self.id,
                thread_id,
                connections,
            });
            let orphaned: Vec<Uuid> = guards
                .iter()
                .filter(|(_, guard)| guard.is_orphaned())
                .map(|(id, _)| *id)
                .collect();
            orphaned
                .iter()
                .filter_map(|id| guards.remove(id))
                .collect()
        });
        drop(stale);
    }

    fn build(
        &self,
        family: BackendFamily,
        endpoints: &[String],
    ) -> CacheResult<Arc<BackendConnection>> {
        let connection = BackendConnection::connect(
            Arc::clone(&self.connector),
            family,
            endpoints,
            self.expiration,
            self.key_prefix.clone(),
        )?;

        info!(
            factory_id = %self.id,
            family = %family,
            endpoints = endpoints.len(),
            "Cache backend connection established"
        );
        Ok(Arc::new(connection))
    }

    fn retire(&self, connection: &BackendConnection) {
        retire_connection(self.id, connection);
    }
}

impl Drop for CacheProviderFactory {
    fn drop(&mut self) {
        self.shutdown();
    }
}
