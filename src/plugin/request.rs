//! Request-scoped plugin cache
//!
//! The host creates one [`RequestContext`] per inbound request and activates it
//! on the worker thread handling that request. Values cached here disappear
//! with the context.

use super::{plugin_cache_key, PluginCache};
use parking_lot::Mutex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

thread_local! {
    static ACTIVE_REQUESTS: RefCell<Vec<Arc<RequestContext>>> = const { RefCell::new(Vec::new()) };
}

/// Opaque per-request key/value storage
pub struct RequestContext {
    id: Uuid,
    entries: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

impl RequestContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Value stored under `key`, if present and of type `T`
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.entries
            .lock()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn insert<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.entries.lock().insert(key.into(), Box::new(value));
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Make this context the current request on the calling thread
    ///
    /// Activations nest. Dropping the guard deactivates exactly this
    /// activation, so the most recent activation still alive is current,
    /// whatever order guards are dropped in.
    pub fn activate(self: &Arc<Self>) -> ActiveRequest {
        ACTIVE_REQUESTS.with(|active| active.borrow_mut().push(Arc::clone(self)));
        ActiveRequest {
            context: Arc::clone(self),
            _not_send: PhantomData,
        }
    }

    /// The request active on the calling thread
    pub fn current() -> Option<Arc<RequestContext>> {
        ACTIVE_REQUESTS.with(|active| active.borrow().last().cloned())
    }
}

/// Guard returned by [`RequestContext::activate`]; bound to the activating thread
#[must_use = "the request is deactivated when the guard is dropped"]
pub struct ActiveRequest {
    context: Arc<RequestContext>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        // thread-local may already be gone during thread teardown
        let _ = ACTIVE_REQUESTS.try_with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|c| Arc::ptr_eq(c, &self.context)) {
                active.remove(pos);
            }
        });
    }
}

/// Plugin cache stored in the active request context
#[derive(Debug, Clone)]
pub struct RequestPluginCache {
    key: String,
}

impl RequestPluginCache {
    pub fn new(consumer_id: &str) -> Self {
        Self {
            key: plugin_cache_key(consumer_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T: Clone + Send + Sync + 'static> PluginCache<T> for RequestPluginCache {
    fn get(&self) -> Option<T> {
        RequestContext::current().and_then(|request| request.get::<T>(&self.key))
    }

    fn set(&self, value: T) {
        match RequestContext::current() {
            Some(request) => request.insert(self.key.clone(), value),
            None => trace!(key = %self.key, "No active request, dropping plugin cache value"),
        }
    }

    fn invalidate(&self) {
        if let Some(request) = RequestContext::current() {
            request.remove(&self.key);
        }
    }
}
