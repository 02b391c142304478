//! Error type for extension hook implementations.

use thiserror::Error;

/// Error returned by extension lifecycle hooks.
///
/// The host logs hook errors with the offending module's name and moves
/// on; a failing hook never aborts the archive or category it came from.
#[derive(Debug, Error)]
pub enum HookError {
    /// Module setup or `on_load` failed.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// `on_unload` failed.
    #[error("teardown failed: {0}")]
    Teardown(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HookError {
    /// Convenience constructor for `on_load` failures.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Convenience constructor for `on_unload` failures.
    pub fn teardown(msg: impl Into<String>) -> Self {
        Self::Teardown(msg.into())
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Result type for extension hooks.
pub type HookResult<T> = Result<T, HookError>;
