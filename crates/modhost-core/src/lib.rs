//! Extension discovery and lifecycle management for Modhost.
//!
//! The host scans per-category directories for extension archives
//! (platform dynamic libraries), caches an open loader context per
//! archive, eagerly preloads every module, and loads the modules that
//! provide the requested capability. Each loaded module receives a
//! unique identity before its load hook runs. Unloading runs teardown
//! hooks against fresh instances and leaves contexts and identities in
//! place for later reloads.
//!
//! ```no_run
//! use modhost_core::{ExtensionHost, HostContext};
//!
//! # fn main() -> modhost_core::Result<()> {
//! let host = ExtensionHost::new();
//! host.register_capability("modhost.addon");
//!
//! let ctx = HostContext::new("my-server", "/var/lib/my-server");
//! let loaded = host.load_extensions(&ctx, "modhost.addon", "addons", "AddOn")?;
//! println!("loaded {} archives", loaded.len());
//!
//! host.unload_extensions(&ctx, "addons", "AddOn");
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod identity;
pub mod manager;
pub mod module;
pub mod registry;
pub mod scanner;

mod filter;
mod lifecycle;
mod preload;

pub use context::{LoaderContext, LoaderContextCache};
pub use error::{ExtensionError, Result};
pub use identity::IdentityRegistry;
pub use manager::ExtensionHost;
pub use module::{BuiltinModule, InstanceHandle, ModuleRecord};
pub use registry::ExtensionRegistry;

pub use modhost_extension_sdk as sdk;
pub use modhost_extension_sdk::{ExtensionModule, HookError, HostContext};
