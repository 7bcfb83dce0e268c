//! Error types for service configuration.

/// Errors raised while loading [`ServiceConfig`](crate::ServiceConfig) from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set but its value cannot be used.
    #[error("Invalid value '{value}' for {name}: {details}")]
    InvalidValue {
        /// Environment variable name
        name: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        details: String,
    },
}

impl ConfigError {
    pub fn invalid_value(
        name: &'static str,
        value: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            name,
            value: value.into(),
            details: details.into(),
        }
    }
}
