//! The extension host: the single owner of discovery, loading, and
//! unloading for every extension category.

use std::collections::{HashMap, HashSet};

use modhost_extension_sdk::HostContext;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::context::{LoaderContext, LoaderContextCache};
use crate::error::{ExtensionError, Result};
use crate::identity::IdentityRegistry;
use crate::lifecycle::LifecycleInvoker;
use crate::module::BuiltinModule;
use crate::preload;
use crate::registry::ExtensionRegistry;
use crate::scanner;

/// Owns every piece of extension state for the host process.
///
/// Categories are independent: loading the `"addon"` category touches
/// nothing recorded for `"dlc"`. Loader contexts and issued identities
/// are shared across categories and live for the process lifetime.
#[derive(Default)]
pub struct ExtensionHost {
    contexts: LoaderContextCache,
    identities: IdentityRegistry,
    registry: ExtensionRegistry,
    capabilities: RwLock<HashSet<String>>,
    builtins: RwLock<HashMap<String, Vec<String>>>,
}

impl ExtensionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a capability that extensions may provide. Loading a
    /// category requires its capability to be registered first.
    pub fn register_capability(&self, capability: &str) {
        self.capabilities.write().insert(capability.to_string());
    }

    /// Registers a set of host-bundled modules as a virtual archive for
    /// the given category. The archive participates in loads of that
    /// category exactly like one discovered on disk.
    pub fn register_builtin_archive(
        &self,
        category: &str,
        filename: &str,
        modules: Vec<BuiltinModule>,
    ) {
        self.contexts.insert_builtin(filename, &modules);
        let mut builtins = self.builtins.write();
        let filenames = builtins.entry(category.to_string()).or_default();
        if !filenames.iter().any(|f| f == filename) {
            filenames.push(filename.to_string());
        }
    }

    /// Discovers, preloads, and loads every extension of a category.
    ///
    /// Scans `<data dir>/extensions/<category>` recursively for
    /// archives, then processes registered builtin archives for the
    /// category. An archive counts as loaded when at least one of its
    /// modules completes the load hook. Replaces the category's
    /// loaded-filename list and returns it.
    pub fn load_extensions(
        &self,
        host: &HostContext,
        required_capability: &str,
        category: &str,
        label: &str,
    ) -> Result<Vec<String>> {
        if !self.capabilities.read().contains(required_capability) {
            warn!("[{}] Unknown capability: {}", label, required_capability);
            return Err(ExtensionError::CapabilityNotFound(
                required_capability.to_string(),
            ));
        }

        let dir = host.extension_dir(category);
        std::fs::create_dir_all(&dir).map_err(|source| ExtensionError::DirectoryUnavailable {
            path: dir.clone(),
            source,
        })?;

        let archives = scanner::scan_archives(&dir);
        let builtin_filenames = self
            .builtins
            .read()
            .get(category)
            .cloned()
            .unwrap_or_default();

        if archives.is_empty() && builtin_filenames.is_empty() {
            info!("[{}] No {} found.", label, category);
            self.registry.record_loaded(category, Vec::new());
            return Ok(Vec::new());
        }

        let invoker = LifecycleInvoker {
            host,
            identities: &self.identities,
            label,
        };

        let mut loaded = Vec::new();
        let mut seen = HashSet::new();

        for path in &archives {
            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    debug!("[{}] Skipping archive with non-UTF-8 name", label);
                    continue;
                }
            };
            if !seen.insert(filename.clone()) {
                debug!("[{}] Skipping duplicate archive name: {}", label, filename);
                continue;
            }

            info!("[{}] Scanning archive: {}", label, filename);
            let context = match self.contexts.get_or_create(&filename, path) {
                Ok(context) => context,
                Err(err) => {
                    warn!("[{}] Failed to open {}: {}", label, filename, err);
                    continue;
                }
            };

            if self.load_one(&invoker, &context, required_capability, label) {
                loaded.push(filename);
            }
        }

        for filename in builtin_filenames {
            if !seen.insert(filename.clone()) {
                continue;
            }
            let context = match self.contexts.get(&filename) {
                Some(context) => context,
                None => continue,
            };
            if self.load_one(&invoker, &context, required_capability, label) {
                loaded.push(filename);
            }
        }

        self.registry.record_loaded(category, loaded.clone());
        Ok(loaded)
    }

    fn load_one(
        &self,
        invoker: &LifecycleInvoker<'_>,
        context: &LoaderContext,
        required_capability: &str,
        label: &str,
    ) -> bool {
        preload::preload(context, label);
        self.registry
            .record_modules(context.filename(), context.module_names());

        let count = invoker.load_archive(context, required_capability);
        if count == 0 {
            warn!(
                "[{}] No qualifying modules found in: {}",
                label,
                context.filename()
            );
            return false;
        }
        true
    }

    /// Runs teardown for every archive loaded under the category, then
    /// clears the category's loaded-filename list. Loader contexts and
    /// issued identities are retained.
    pub fn unload_extensions(&self, host: &HostContext, category: &str, label: &str) {
        let filenames = self.registry.loaded_filenames(category);
        if filenames.is_empty() {
            info!("[{}] No previously loaded extensions to unload.", label);
            return;
        }

        let invoker = LifecycleInvoker {
            host,
            identities: &self.identities,
            label,
        };

        for filename in &filenames {
            let context = match self.contexts.get(filename) {
                Some(context) => context,
                None => {
                    debug!("[{}] No cached context for: {}", label, filename);
                    continue;
                }
            };
            let names = match self.registry.module_list(filename) {
                Some(names) => names,
                None => {
                    debug!("[{}] No module list recorded for: {}", label, filename);
                    continue;
                }
            };
            invoker.unload_archive(&context, &names);
        }

        self.registry.remove_category(category);
    }

    /// Archive filenames currently loaded under the category.
    pub fn loaded_filenames(&self, category: &str) -> Vec<String> {
        self.registry.loaded_filenames(category)
    }

    /// Every identity ever issued by this host.
    pub fn all_issued_identities(&self) -> Vec<String> {
        self.identities.all()
    }

    /// Reserves a caller-supplied identity, as used by extensions that
    /// bring their own stable IDs.
    pub fn issue_identity(&self, id: &str) -> Result<()> {
        self.identities.issue(id)
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn contexts(&self) -> &LoaderContextCache {
        &self.contexts
    }
}
