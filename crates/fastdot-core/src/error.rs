//! Error types for dispatch configuration
//!
//! The numeric entry points never fail. Errors only surface where a policy is
//! read from text, e.g. a config file or the environment.

use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A policy name that matches no known tier
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Environment variable set to something that is not a policy
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for an unrecognized policy name
    pub fn invalid_policy(name: &str) -> Self {
        Self::InvalidPolicy(format!(
            "{name:?} (expected one of auto, scalar, sse, avx, avx-fma, avx512, avx512-fma)"
        ))
    }

    /// Create an error for a malformed environment variable
    pub fn invalid_env(var: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            var,
            value: value.into(),
        }
    }
}
