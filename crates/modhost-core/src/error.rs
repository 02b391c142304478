//! Error types for extension discovery and lifecycle management.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while discovering, loading, or unloading extensions.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The extension directory could not be created or read.
    #[error("extension directory unavailable: {path}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A load was requested for a capability no one registered.
    #[error("unknown capability: {0}")]
    CapabilityNotFound(String),

    /// A module presented an empty identity.
    #[error("extension ID cannot be null or empty")]
    NullIdentity,

    /// A module presented an identity that is already taken.
    #[error("duplicate extension ID detected: {0}")]
    DuplicateIdentity(String),

    /// A dynamic library failed to open.
    #[error("failed to load extension archive: {0}")]
    LoadFailed(String),

    /// A required exported symbol was missing from an archive.
    #[error("missing symbol in extension archive: {0}")]
    SymbolNotFound(String),

    /// The archive was built against a different ABI revision.
    #[error("incompatible extension ABI: expected {expected}, got {got}")]
    IncompatibleAbi { expected: u32, got: u32 },

    /// A module's init hook failed or panicked during preload.
    #[error("preload failed: {0}")]
    Preload(String),

    /// A module could not be instantiated.
    #[error("failed to instantiate module: {0}")]
    Instantiation(String),

    /// A lifecycle hook returned an error or panicked.
    #[error("hook failed for module {module}: {message}")]
    Hook { module: String, message: String },
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
