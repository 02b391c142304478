//! Per-archive load and unload passes.
//!
//! Instances exist only for the duration of their hook calls. Loading
//! instantiates, assigns an identity, runs the load hook, and drops the
//! instance. Unloading instantiates a fresh instance purely to run its
//! teardown hook; no state carries over from load time.

use std::panic::{self, AssertUnwindSafe};

use modhost_extension_sdk::abi::entry_points;
use modhost_extension_sdk::HostContext;
use tracing::{debug, info, warn};

use crate::context::LoaderContext;
use crate::error::{ExtensionError, Result};
use crate::filter;
use crate::identity::IdentityRegistry;
use crate::module::ModuleRecord;

pub(crate) struct LifecycleInvoker<'a> {
    pub host: &'a HostContext,
    pub identities: &'a IdentityRegistry,
    pub label: &'a str,
}

impl LifecycleInvoker<'_> {
    /// Loads every qualifying module in the archive. Failures are
    /// logged per module and do not abort the pass. Returns the number
    /// of modules that completed their load hook.
    pub fn load_archive(&self, context: &LoaderContext, required_capability: &str) -> usize {
        let mut loaded = 0;
        for record in context.modules() {
            if !filter::qualifies(record, required_capability, self.label) {
                continue;
            }
            match self.load_module(record) {
                Ok(id) => {
                    info!("[{}] Loaded: {} with ID: {}", self.label, record.name(), id);
                    loaded += 1;
                }
                Err(err) => {
                    warn!(
                        "[{}] Failed to load module {} from {}: {}",
                        self.label,
                        record.name(),
                        context.filename(),
                        err
                    );
                }
            }
        }
        loaded
    }

    fn load_module(&self, record: &ModuleRecord) -> Result<String> {
        let mut instance = record.instantiate()?;
        // The identity is reserved before the hooks run and stays
        // reserved even if they fail.
        let id = self.identities.register()?;
        invoke(record.name(), || {
            let module = instance.module_mut();
            module.set_id(&id);
            module.on_load(self.host)
        })?;
        Ok(id)
    }

    /// Runs teardown for the named modules of a previously loaded
    /// archive. Each module gets a fresh instance for its unload hook.
    /// Returns the number of modules that completed teardown.
    pub fn unload_archive(&self, context: &LoaderContext, module_names: &[String]) -> usize {
        let mut unloaded = 0;
        for name in module_names {
            let record = match context.find_module(name) {
                Some(record) => record,
                None => {
                    debug!(
                        "[{}] Module {} no longer present in {}",
                        self.label,
                        name,
                        context.filename()
                    );
                    continue;
                }
            };
            if !record.is_instantiable() || !record.has_entry_point(entry_points::UNLOAD) {
                continue;
            }
            match self.unload_module(record) {
                Ok(()) => {
                    info!("[{}] Disloaded: {}", self.label, record.name());
                    unloaded += 1;
                }
                Err(err) => {
                    warn!(
                        "[{}] Failed to unload module {} from {}: {}",
                        self.label,
                        record.name(),
                        context.filename(),
                        err
                    );
                }
            }
        }
        unloaded
    }

    fn unload_module(&self, record: &ModuleRecord) -> Result<()> {
        let mut instance = record.instantiate()?;
        invoke(record.name(), || instance.module_mut().on_unload(self.host))
    }
}

/// Runs a hook closure, converting both hook errors and panics into
/// [`ExtensionError::Hook`].
fn invoke<F>(module: &str, f: F) -> Result<()>
where
    F: FnOnce() -> std::result::Result<(), modhost_extension_sdk::HookError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(ExtensionError::Hook {
            module: module.to_string(),
            message: err.to_string(),
        }),
        Err(payload) => Err(ExtensionError::Hook {
            module: module.to_string(),
            message: panic_message(payload),
        }),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "hook panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LoaderContextCache;
    use crate::module::BuiltinModule;
    use modhost_extension_sdk::{ExtensionModule, HookError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static LOADS: AtomicUsize = AtomicUsize::new(0);
    static UNLOADS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Counting {
        id: String,
    }

    impl ExtensionModule for Counting {
        fn on_load(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            assert!(!self.id.is_empty(), "identity must be assigned before load");
            LOADS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn set_id(&mut self, id: &str) {
            self.id = id.to_string();
        }

        fn on_unload(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            // Fresh instance: load-time identity is gone.
            assert!(self.id.is_empty());
            UNLOADS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Panics;

    impl ExtensionModule for Panics {
        fn on_load(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            panic!("load blew up");
        }

        fn set_id(&mut self, _id: &str) {}
    }

    #[derive(Default)]
    struct Healthy {
        id: String,
    }

    impl ExtensionModule for Healthy {
        fn on_load(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            assert!(!self.id.is_empty());
            Ok(())
        }

        fn set_id(&mut self, id: &str) {
            self.id = id.to_string();
        }

        fn on_unload(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            Ok(())
        }
    }

    fn host() -> HostContext {
        HostContext::new("test-host", std::env::temp_dir())
    }

    #[test]
    fn test_load_then_unload_with_fresh_instances() {
        let cache = LoaderContextCache::new();
        let context = cache.insert_builtin(
            "counting.virt",
            &[BuiltinModule::of::<Counting>(
                "test.Counting",
                "modhost.addon",
                true,
            )],
        );
        let identities = IdentityRegistry::new();
        let host = host();
        let invoker = LifecycleInvoker {
            host: &host,
            identities: &identities,
            label: "AddOn",
        };

        let loads_before = LOADS.load(Ordering::SeqCst);
        let unloads_before = UNLOADS.load(Ordering::SeqCst);

        assert_eq!(invoker.load_archive(&context, "modhost.addon"), 1);
        assert_eq!(LOADS.load(Ordering::SeqCst), loads_before + 1);
        assert_eq!(identities.len(), 1);

        let names = context.module_names();
        assert_eq!(invoker.unload_archive(&context, &names), 1);
        assert_eq!(UNLOADS.load(Ordering::SeqCst), unloads_before + 1);
        // Identities survive unload.
        assert_eq!(identities.len(), 1);
    }

    #[test]
    fn test_panicking_hook_is_contained() {
        let cache = LoaderContextCache::new();
        let context = cache.insert_builtin(
            "mixed.virt",
            &[
                BuiltinModule::of::<Panics>("test.Panics", "modhost.addon", false),
                BuiltinModule::of::<Healthy>("test.Healthy", "modhost.addon", false),
            ],
        );
        let identities = IdentityRegistry::new();
        let host = host();
        let invoker = LifecycleInvoker {
            host: &host,
            identities: &identities,
            label: "AddOn",
        };

        // The panicking sibling does not stop the healthy one.
        assert_eq!(invoker.load_archive(&context, "modhost.addon"), 1);
        // Both identities were reserved, including the failed one's.
        assert_eq!(identities.len(), 2);
    }

    #[test]
    fn test_unload_skips_modules_without_teardown() {
        let cache = LoaderContextCache::new();
        let context = cache.insert_builtin(
            "noteardown.virt",
            &[BuiltinModule::of::<Healthy>(
                "test.Healthy",
                "modhost.addon",
                false,
            )],
        );
        let identities = IdentityRegistry::new();
        let host = host();
        let invoker = LifecycleInvoker {
            host: &host,
            identities: &identities,
            label: "AddOn",
        };

        let names = context.module_names();
        assert_eq!(invoker.unload_archive(&context, &names), 0);
    }
}
