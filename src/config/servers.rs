//! Endpoint configuration sources
//!
//! The factory polls a [`ServerSource`] on every resolution so administrators
//! can repoint caching without restarting the process. Nothing here caches the
//! endpoint list itself.

use super::CacheSettings;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Split a whitespace separated endpoint string into individual endpoints
pub fn parse_servers(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Supplies the currently configured backend endpoints
///
/// An empty list means the distributed tier is disabled.
pub trait ServerSource: Send + Sync {
    fn servers(&self) -> Vec<String>;
}

/// In-memory endpoint source that can be repointed at runtime
#[derive(Debug, Default)]
pub struct StaticServerSource {
    value: RwLock<String>,
}

impl StaticServerSource {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(value.into()),
        }
    }

    /// Replace the configured endpoint string
    pub fn set(&self, value: impl Into<String>) {
        *self.value.write() = value.into();
    }
}

impl ServerSource for StaticServerSource {
    fn servers(&self) -> Vec<String> {
        parse_servers(&self.value.read())
    }
}

/// Endpoint source that re-reads the settings file and environment on every poll
///
/// Read failures are logged and reported as "no servers", which disables the
/// distributed tier instead of failing the lookup.
#[derive(Debug, Clone)]
pub struct SettingsServerSource {
    path: PathBuf,
}

impl SettingsServerSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ServerSource for SettingsServerSource {
    fn servers(&self) -> Vec<String> {
        match CacheSettings::load(&self.path) {
            Ok(settings) => settings.server_list(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read cache settings, treating distributed cache as disabled"
                );
                Vec::new()
            }
        }
    }
}
