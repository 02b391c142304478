//! Modhost Extension SDK
//!
//! This SDK provides the trait, ABI types, and macros for building
//! extension modules ("add-ons", "DLCs", ...) that the Modhost runtime
//! discovers and loads from dynamic-library archives.
//!
//! # Quick Start
//!
//! ```rust
//! use modhost_extension_sdk::prelude::*;
//!
//! #[derive(Default)]
//! struct WeatherAddOn {
//!     id: String,
//! }
//!
//! impl ExtensionModule for WeatherAddOn {
//!     fn on_load(&mut self, host: &HostContext) -> Result<(), HookError> {
//!         ExtensionLogger::new("AddOn", "weather").info(&format!(
//!             "enabled for {}",
//!             host.host_name()
//!         ));
//!         Ok(())
//!     }
//!
//!     fn set_id(&mut self, id: &str) {
//!         self.id = id.to_string();
//!     }
//! }
//!
//! modhost_extension_sdk::export_extension_modules! {
//!     module WeatherAddOn {
//!         name: "weather.WeatherAddOn",
//!         capability: "modhost.addon",
//!         teardown: false,
//!     }
//! }
//! ```
//!
//! The macro emits the two C symbols the host resolves from every
//! archive: `modhost_extension_abi_version` and
//! `modhost_extension_modules`.

pub mod abi;
pub mod error;
pub mod host;
pub mod logger;
#[macro_use]
pub mod macros;
pub mod module;

pub use abi::{ModuleInstance, RawModuleEntry, RawModuleTable, MODHOST_ABI_VERSION};
pub use error::{HookError, HookResult};
pub use host::HostContext;
pub use logger::ExtensionLogger;
pub use module::ExtensionModule;

/// Prelude module with common imports for extension authors.
pub mod prelude {
    pub use crate::abi::MODHOST_ABI_VERSION;
    pub use crate::error::{HookError, HookResult};
    pub use crate::host::HostContext;
    pub use crate::logger::ExtensionLogger;
    pub use crate::module::ExtensionModule;
    pub use serde_json::Value;

    // `export_extension_modules!` is available at the crate root via
    // #[macro_export].
}
