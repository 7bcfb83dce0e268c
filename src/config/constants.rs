//! Sequence limits and configuration defaults
//!
//! This module centralizes the numeric boundaries of the term engine and the
//! environment variable names read by [`ServiceConfig::from_env`](super::ServiceConfig::from_env).

/// Largest index for which the f64 closed form rounds to the exact term.
///
/// The error of `round(φ^n / √5)` grows roughly as `n * ε * F(n)`; at 70 it is still
/// below one half, at 71 it is not. Larger orders use exact fast doubling.
pub const BINET_EXACT_LIMIT: u64 = 70;

/// Default HTTP port
pub const DEFAULT_API_PORT: u16 = 3000;

/// Default file used by the disk store
pub const DEFAULT_STORE_PATH: &str = "fibonacci_terms.json";

/// Environment variable names
pub mod env {
    /// Deployment profile: development, testing, staging or production
    pub const APP_SETTINGS: &str = "APP_SETTINGS";
    /// HTTP listen port
    pub const API_PORT: &str = "API_PORT";
    /// Store backend: memory, disk or none
    pub const STORE_BACKEND: &str = "STORE_BACKEND";
    /// Disk store file path
    pub const STORE_PATH: &str = "STORE_PATH";
    /// Retry profile for transient store failures: off, standard, aggressive or conservative
    pub const STORE_RETRY_PROFILE: &str = "STORE_RETRY_PROFILE";
    /// Overrides the retry count of the profile (a non-zero value with `off` means standard)
    pub const STORE_MAX_RETRIES: &str = "STORE_MAX_RETRIES";
    /// `json` switches log output to JSON lines
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}
