//! Configuration for the fibcache service
//!
//! This module provides the service configuration: deployment environment, listen
//! port, which term store backs the resolver, and how store failures are retried.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use fibcache::ServiceConfig;
//!
//! // Production profile, port 3000, in-memory store, no retries
//! let config = ServiceConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use fibcache::{RetryProfile, ServiceConfigBuilder, StoreBackend};
//!
//! let config = ServiceConfigBuilder::with_defaults()
//!     .port(8080)
//!     .store_backend(StoreBackend::Disk)
//!     .store_path("/var/cache/fibonacci_terms.json")
//!     .store_retry_profile(RetryProfile::Conservative)
//!     .build();
//! ```
//!
//! # Example: From the environment
//!
//! ```rust,no_run
//! use fibcache::ServiceConfig;
//!
//! // Reads APP_SETTINGS, API_PORT, STORE_BACKEND, STORE_PATH, STORE_RETRY_PROFILE
//! // and STORE_MAX_RETRIES (a `.env` file is honoured)
//! let config = ServiceConfig::from_env()?;
//! # Ok::<(), fibcache::ConfigError>(())
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tower::Layer;
use tracing::info;

use crate::errors::{ConfigError, StoreError};
use crate::store::{DiskStore, MemoryStore, NoOpStore, RetryConfig, RetryLayer, TermStore};

pub mod constants;

use constants::{env, DEFAULT_API_PORT, DEFAULT_STORE_PATH};

/// Deployment profile, selected with `APP_SETTINGS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    Testing,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Production => "info",
            Environment::Development | Environment::Testing | Environment::Staging => "debug",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                env::APP_SETTINGS,
                s,
                "expected development, testing, staging or production",
            )),
        }
    }
}

/// Which [`TermStore`] backs the resolver, selected with `STORE_BACKEND`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// [`MemoryStore`]
    #[default]
    Memory,
    /// [`DiskStore`] at [`ServiceConfig::store_path`]
    Disk,
    /// [`NoOpStore`]: memoization disabled
    None,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "disk" => Ok(StoreBackend::Disk),
            "none" => Ok(StoreBackend::None),
            _ => Err(ConfigError::invalid_value(
                env::STORE_BACKEND,
                s,
                "expected memory, disk or none",
            )),
        }
    }
}

/// Retry pacing for transient store failures, selected with `STORE_RETRY_PROFILE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryProfile {
    /// No retry decorator unless `STORE_MAX_RETRIES` asks for one
    #[default]
    Off,
    /// [`RetryConfig::STANDARD`]
    Standard,
    /// [`RetryConfig::AGGRESSIVE`]
    Aggressive,
    /// [`RetryConfig::CONSERVATIVE`]
    Conservative,
}

impl RetryProfile {
    /// Pacing for this profile; `Off` is the standard pacing with zero retries
    pub fn retry_config(&self) -> RetryConfig {
        match self {
            RetryProfile::Off => RetryConfig::STANDARD.with_max_retries(0),
            RetryProfile::Standard => RetryConfig::STANDARD,
            RetryProfile::Aggressive => RetryConfig::AGGRESSIVE,
            RetryProfile::Conservative => RetryConfig::CONSERVATIVE,
        }
    }
}

impl FromStr for RetryProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RetryProfile::Off),
            "standard" => Ok(RetryProfile::Standard),
            "aggressive" => Ok(RetryProfile::Aggressive),
            "conservative" => Ok(RetryProfile::Conservative),
            _ => Err(ConfigError::invalid_value(
                env::STORE_RETRY_PROFILE,
                s,
                "expected off, standard, aggressive or conservative",
            )),
        }
    }
}

/// Configuration for the fibcache service
///
/// Use [`ServiceConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Deployment profile
    /// Default: production
    pub environment: Environment,

    /// HTTP listen port
    /// Default: 3000
    pub port: u16,

    /// Term store backend
    /// Default: memory
    pub store_backend: StoreBackend,

    /// File used when `store_backend` is [`StoreBackend::Disk`]
    /// Default: `fibonacci_terms.json`
    pub store_path: PathBuf,

    /// Retry pacing for transient store failures
    /// Default: off
    pub store_retry: RetryProfile,

    /// Overrides the retry count of `store_retry`
    /// Default: none
    pub store_max_retries: Option<u32>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            port: DEFAULT_API_PORT,
            store_backend: StoreBackend::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            store_retry: RetryProfile::default(),
            store_max_retries: None,
        }
    }
}

impl ServiceConfig {
    /// Create minimal config: no memoization, no retries
    ///
    /// Suitable for tests that need fresh computation on every call.
    pub fn minimal() -> Self {
        Self {
            store_backend: StoreBackend::None,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables (and `.env`, if present)
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ServiceConfigBuilder::with_defaults();

        if let Some(value) = lookup(env::APP_SETTINGS) {
            builder = builder.environment(value.parse()?);
        }
        if let Some(value) = lookup(env::API_PORT) {
            let port = value.trim().parse::<u16>().map_err(|e| {
                ConfigError::invalid_value(env::API_PORT, &value, e.to_string())
            })?;
            builder = builder.port(port);
        }
        if let Some(value) = lookup(env::STORE_BACKEND) {
            builder = builder.store_backend(value.parse()?);
        }
        if let Some(value) = lookup(env::STORE_PATH) {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    env::STORE_PATH,
                    value,
                    "path must not be empty",
                ));
            }
            builder = builder.store_path(value);
        }
        if let Some(value) = lookup(env::STORE_RETRY_PROFILE) {
            builder = builder.store_retry_profile(value.parse()?);
        }
        if let Some(value) = lookup(env::STORE_MAX_RETRIES) {
            let retries = value.trim().parse::<u32>().map_err(|e| {
                ConfigError::invalid_value(env::STORE_MAX_RETRIES, &value, e.to_string())
            })?;
            builder = builder.store_max_retries(retries);
        }

        Ok(builder.build())
    }

    /// Effective retry settings, or `None` when the store is not retried
    ///
    /// A count given with the `off` profile retries with standard pacing.
    pub fn retry_config(&self) -> Option<RetryConfig> {
        let mut config = self.store_retry.retry_config();
        if let Some(retries) = self.store_max_retries {
            config = config.with_max_retries(retries);
        }
        (config.max_retries > 0).then_some(config)
    }

    /// Construct the configured store
    ///
    /// Wraps it in a [`RetryingStore`](crate::store::RetryingStore) when
    /// [`retry_config`](Self::retry_config) is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk store path fails validation.
    pub fn build_store(&self) -> Result<Arc<dyn TermStore>, StoreError> {
        let retry = self.retry_config();
        let store: Arc<dyn TermStore> = match (self.store_backend, retry) {
            (StoreBackend::None, _) => Arc::new(NoOpStore),
            (StoreBackend::Memory, None) => Arc::new(MemoryStore::new()),
            (StoreBackend::Memory, Some(retry)) => {
                Arc::new(RetryLayer::new(retry).layer(MemoryStore::new()))
            }
            (StoreBackend::Disk, None) => Arc::new(DiskStore::new(&self.store_path).validate()?),
            (StoreBackend::Disk, Some(retry)) => {
                let disk = DiskStore::new(&self.store_path).validate()?;
                Arc::new(RetryLayer::new(retry).layer(disk))
            }
        };

        info!(
            store = store.name(),
            max_retries = retry.map_or(0, |r| r.max_retries),
            "Configured term store"
        );
        Ok(store)
    }
}

/// Builder for [`ServiceConfig`]
///
/// # Example
///
/// ```rust
/// use fibcache::{Environment, ServiceConfigBuilder};
///
/// let config = ServiceConfigBuilder::new()
///     .environment(Environment::Development)
///     .port(8000)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Create a new builder starting from [`ServiceConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias of [`new`](Self::new), mirroring [`ServiceConfig::default`]
    pub fn with_defaults() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn store_backend(mut self, backend: StoreBackend) -> Self {
        self.config.store_backend = backend;
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_path = path.into();
        self
    }

    pub fn store_retry_profile(mut self, profile: RetryProfile) -> Self {
        self.config.store_retry = profile;
        self
    }

    /// Override the profile's retry count (0 disables retrying)
    pub fn store_max_retries(mut self, retries: u32) -> Self {
        self.config.store_max_retries = Some(retries);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}
