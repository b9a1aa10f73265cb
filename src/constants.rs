//! # Cache Constants
//!
//! Defaults and fixed namespaces shared by the distributed and plugin cache tiers.

/// Namespace prepended to every distributed-tier key before it reaches the backend.
pub const DEFAULT_KEY_PREFIX: &str = "directory_cache:";

/// Expiration applied to distributed-tier entries unless reconfigured.
pub const DEFAULT_EXPIRATION_SECONDS: u64 = 300;

/// Maximum age of a volatile plugin cache entry.
pub const DEFAULT_VOLATILE_MAX_AGE_SECONDS: u64 = 10;

/// Namespace used when deriving plugin-tier keys from a consumer id.
pub const PLUGIN_KEY_NAMESPACE: &str = "_directory_cache";

/// Environment variable prefix for settings overrides (`DIRECTORY_CACHE_SERVERS`, ...).
pub const ENV_PREFIX: &str = "DIRECTORY_CACHE";

/// URL scheme prefixes used to classify and normalise endpoints.
pub mod schemes {
    pub const REDIS: &str = "redis";
    pub const UNIX_SOCKET: &str = "unix";
    pub const MEMCACHE: &str = "memcache";
    /// Accepted spelling, rewritten to `memcache` for the client
    pub const MEMCACHED: &str = "memcached";
}
