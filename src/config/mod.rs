//! # Cache Configuration
//!
//! Settings for both cache tiers, layered from defaults, an optional settings
//! file and `DIRECTORY_CACHE_*` environment variables via the `config` crate.
//!
//! ```rust,no_run
//! use directory_cache::config::CacheSettings;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = CacheSettings::load("config/directory-cache.toml")?;
//! settings.log_configuration();
//! # Ok(())
//! # }
//! ```

pub mod servers;

use crate::constants::{
    DEFAULT_EXPIRATION_SECONDS, DEFAULT_KEY_PREFIX, DEFAULT_VOLATILE_MAX_AGE_SECONDS, ENV_PREFIX,
};
use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub use servers::{parse_servers, ServerSource, SettingsServerSource, StaticServerSource};

/// Configuration for the distributed and plugin cache tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whitespace separated backend endpoints; empty disables the distributed tier
    pub servers: String,
    pub expiration_seconds: u64,
    pub volatile_max_age_seconds: u64,
    pub key_prefix: String,
    /// Plugin-tier caching switch; off forces the null plugin cache
    pub plugin_caching: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            servers: String::new(),
            expiration_seconds: DEFAULT_EXPIRATION_SECONDS,
            volatile_max_age_seconds: DEFAULT_VOLATILE_MAX_AGE_SECONDS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            plugin_caching: true,
        }
    }
}

impl CacheSettings {
    /// Load settings from an optional file plus environment overrides
    ///
    /// A missing file is not an error; the defaults and environment still apply.
    pub fn load(path: impl AsRef<Path>) -> CacheResult<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from environment overrides only
    pub fn from_environment() -> CacheResult<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Endpoint list parsed from `servers`
    pub fn server_list(&self) -> Vec<String> {
        parse_servers(&self.servers)
    }

    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_seconds)
    }

    pub fn volatile_max_age(&self) -> Duration {
        Duration::from_secs(self.volatile_max_age_seconds)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CacheResult<()> {
        if self.expiration_seconds == 0 {
            return Err(CacheError::Configuration(
                "expiration_seconds must be greater than 0".to_string(),
            ));
        }

        if self.key_prefix.is_empty() || self.key_prefix.chars().any(char::is_whitespace) {
            return Err(CacheError::Configuration(format!(
                "key_prefix '{}' must be non-empty and contain no whitespace",
                self.key_prefix
            )));
        }

        if self.volatile_max_age_seconds == 0 {
            warn!("Volatile cache max age is 0 - volatile entries expire immediately");
        }

        Ok(())
    }

    /// Log current configuration for debugging
    pub fn log_configuration(&self) {
        info!(
            servers = ?self.server_list(),
            expiration_seconds = self.expiration_seconds,
            volatile_max_age_seconds = self.volatile_max_age_seconds,
            key_prefix = %self.key_prefix,
            plugin_caching = self.plugin_caching,
            "Directory cache configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = CacheSettings::default();
        assert!(settings.servers.is_empty());
        assert!(settings.server_list().is_empty());
        assert_eq!(settings.expiration(), Duration::from_secs(300));
        assert_eq!(settings.volatile_max_age(), Duration::from_secs(10));
        assert_eq!(settings.key_prefix, "directory_cache:");
        assert!(settings.plugin_caching);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "servers = \"redis://cache-a:6379 redis://cache-b:6379\"\nexpiration_seconds = 60"
        )
        .unwrap();

        let settings = CacheSettings::load(file.path()).unwrap();
        assert_eq!(
            settings.server_list(),
            vec!["redis://cache-a:6379", "redis://cache-b:6379"]
        );
        assert_eq!(settings.expiration_seconds, 60);
        assert_eq!(settings.volatile_max_age_seconds, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.expiration_seconds, DEFAULT_EXPIRATION_SECONDS);
    }

    #[test]
    fn test_validate_rejects_zero_expiration() {
        let settings = CacheSettings {
            expiration_seconds: 0,
            ..CacheSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CacheError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_whitespace_prefix() {
        let settings = CacheSettings {
            key_prefix: "bad prefix".to_string(),
            ..CacheSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
