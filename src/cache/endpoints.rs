//! Endpoint sets and backend family classification

use crate::constants::schemes;
use std::collections::BTreeSet;
use std::fmt;

/// Distributed cache backend families
///
/// The family decides how connections are shared: the lock-capable client is
/// safe to share across worker threads, the simple one is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    /// Redis-like backend reached over `redis://` or a `unix://` socket
    LockCapable,
    /// Memcached-like backend
    Simple,
}

/// Where the factory keeps a connection of a given family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    Shared,
    ThreadLocal,
}

impl BackendFamily {
    /// Classify an endpoint by its scheme (case-insensitive)
    pub fn classify(endpoint: &str) -> Self {
        let endpoint = endpoint.to_ascii_lowercase();
        if endpoint.starts_with(schemes::REDIS) || endpoint.starts_with(schemes::UNIX_SOCKET) {
            Self::LockCapable
        } else {
            Self::Simple
        }
    }

    pub fn scope(self) -> StorageScope {
        match self {
            Self::LockCapable => StorageScope::Shared,
            Self::Simple => StorageScope::ThreadLocal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LockCapable => "redis",
            Self::Simple => "memcached",
        }
    }
}

impl fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered endpoint list with order-insensitive equality
///
/// The order is kept because the first endpoint picks the family and the
/// lock-capable backend only connects to it; reuse decisions compare the
/// endpoints as a set.
#[derive(Debug, Clone, Default)]
pub struct EndpointSet {
    ordered: Vec<String>,
    members: BTreeSet<String>,
}

impl EndpointSet {
    pub fn new(endpoints: &[String]) -> Self {
        Self {
            ordered: endpoints.to_vec(),
            members: endpoints.iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.ordered.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }

    /// Family selected by the first endpoint, `None` when empty
    pub fn family(&self) -> Option<BackendFamily> {
        self.first().map(BackendFamily::classify)
    }

    /// Set equality against a freshly read endpoint list
    pub fn matches(&self, endpoints: &[String]) -> bool {
        let other: BTreeSet<&str> = endpoints.iter().map(String::as_str).collect();
        self.members.len() == other.len() && self.members.iter().all(|m| other.contains(m.as_str()))
    }
}

impl PartialEq for EndpointSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for EndpointSet {}
