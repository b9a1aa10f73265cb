#![allow(clippy::doc_markdown)] // Allow technical terms like LDAP, Memcached in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Directory Cache
//!
//! Two-tier caching for expensive directory (LDAP) lookups.
//!
//! ## Overview
//!
//! Directory queries are slow and are repeated constantly: every page render
//! may ask for the same user or group listing many times. This crate decides,
//! per call, whether to serve a stored result, recompute and store it, or
//! bypass caching entirely.
//!
//! ## Module Organization
//!
//! - [`cache`] - Distributed tier: Redis / Memcached connections managed by
//!   [`CacheProviderFactory`] and re-resolved whenever endpoints change
//! - [`plugin`] - Plugin tier: null, request-scoped and volatile (short TTL)
//!   caches of a single value per consumer
//! - [`config`] - Settings and live endpoint sources
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use directory_cache::config::{CacheSettings, StaticServerSource};
//! use directory_cache::CacheProviderFactory;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = CacheSettings::default();
//! let factory = CacheProviderFactory::new(&settings);
//! let servers = StaticServerSource::new("redis://localhost:6379");
//!
//! // Endpoints are read fresh on every resolution
//! let cache = factory.resolve(&servers)?;
//! let members: Vec<String> = cache.get_data("group:admins", false, || {
//!     vec!["uid=alice".to_string()] // expensive directory query
//! })?;
//! # let _ = members;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod plugin;

pub use cache::{BackendConnection, BackendFamily, CacheProviderFactory, CacheService, Connector};
pub use config::{CacheSettings, ServerSource};
pub use error::{CacheError, CacheResult};
pub use plugin::{
    select_plugin_cache, CacheConsumer, PluginCache, PluginCacheHandle, RequestContext,
    VolatileStore,
};
