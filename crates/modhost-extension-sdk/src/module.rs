//! The extension module contract.

use crate::error::HookError;
use crate::host::HostContext;

/// Implemented by every type packaged in an extension archive that wants
/// to be loaded by the host.
///
/// Modules are constructed through `Default` (the loader never passes
/// constructor arguments) and are **not retained** by the host after
/// `on_load` returns: the instance is dropped immediately, and the unload
/// path constructs a *fresh* instance before calling [`on_unload`].
/// Teardown logic must therefore rely only on state reachable through the
/// [`HostContext`] (or other host-side registries populated during
/// `on_load`), never on fields written on the load-time instance.
///
/// [`on_unload`]: ExtensionModule::on_unload
pub trait ExtensionModule: Send {
    /// Module-level setup, run once per archive scan during preload,
    /// before any instance is created. Use this for one-time registration
    /// work that other modules in the archive depend on. Failures are
    /// logged by the host and never block the rest of the archive.
    fn init() -> Result<(), HookError>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Called once on a fresh instance when the host loads this module.
    fn on_load(&mut self, host: &HostContext) -> Result<(), HookError>;

    /// Receives the unique identity issued by the host, immediately
    /// before `on_load`.
    fn set_id(&mut self, id: &str);

    /// Called on a fresh instance when the owning category is unloaded.
    /// Only invoked for modules exported with `teardown: true`.
    fn on_unload(&mut self, _host: &HostContext) -> Result<(), HookError> {
        Ok(())
    }
}
