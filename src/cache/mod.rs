//! # Distributed Cache Tier
//!
//! Connections to a Redis-like or Memcached-like backend, selected from the
//! configured endpoints on every resolution.
//!
//! ## Architecture
//!
//! ```text
//! CacheProviderFactory                 <- owns shared + per-thread connection slots
//!   └── BackendConnection              <- endpoint set, key namespace, get_data
//!         └── dyn CacheService         <- built by a Connector
//!               ├── LoggingCache<RedisCacheService>      (shared across threads)
//!               ├── LoggingCache<MemcachedCacheService>  (one per worker thread)
//!               └── NoOpCacheService                     (no endpoints configured)
//! ```
//!
//! ## Design Decisions
//!
//! - **Family by scheme**: `redis://` / `unix://` endpoints select the shared
//!   lock-capable backend, anything else the per-thread simple backend
//! - **Replace, never mutate**: a changed endpoint set or expiration builds a
//!   new client and disconnects the old one
//! - **Null instead of special cases**: no endpoints means a connection whose
//!   reads miss and writes vanish

pub mod connection;
pub mod connector;
pub mod endpoints;
pub mod factory;
pub mod providers;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::BackendConnection;
pub use connector::DefaultConnector;
pub use endpoints::{BackendFamily, EndpointSet, StorageScope};
pub use factory::CacheProviderFactory;
pub use providers::{LoggingCache, MemcachedCacheService, NoOpCacheService, RedisCacheService};
pub use traits::{CacheService, Connector};
