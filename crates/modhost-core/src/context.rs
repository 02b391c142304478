//! Archive loader contexts and the process-wide context cache.
//!
//! Each archive that has ever been opened keeps a [`LoaderContext`] in
//! the [`LoaderContextCache`], keyed by filename. Contexts hold the
//! open library handle, so cached archives stay mapped even after their
//! extensions are unloaded. Unloading a category never evicts its
//! contexts; a later load reuses them without touching the filesystem.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use libloading::Library;
use modhost_extension_sdk::abi::{RawModuleTable, ABI_VERSION_SYMBOL, MODULE_TABLE_SYMBOL};
use modhost_extension_sdk::MODHOST_ABI_VERSION;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ExtensionError, Result};
use crate::module::{records_from_table, BuiltinModule, ModuleRecord};

/// A loaded archive: its module records plus the library handle that
/// keeps the code mapped.
#[derive(Debug)]
pub struct LoaderContext {
    filename: String,
    modules: Vec<ModuleRecord>,
    loaded_at: DateTime<Utc>,
    // Must outlive every record's fn pointers. None for builtins.
    _library: Option<Library>,
}

impl LoaderContext {
    /// Opens a native archive and reads its exported module table.
    pub fn open_native(path: &Path, filename: &str) -> Result<Self> {
        let library = unsafe { Library::new(path) }
            .map_err(|err| ExtensionError::LoadFailed(format!("{}: {}", path.display(), err)))?;

        let abi_version = unsafe {
            let symbol = library
                .get::<unsafe extern "C" fn() -> u32>(ABI_VERSION_SYMBOL)
                .map_err(|_| {
                    ExtensionError::SymbolNotFound(format!(
                        "{}: modhost_extension_abi_version",
                        filename
                    ))
                })?;
            symbol()
        };
        if abi_version != MODHOST_ABI_VERSION {
            return Err(ExtensionError::IncompatibleAbi {
                expected: MODHOST_ABI_VERSION,
                got: abi_version,
            });
        }

        let modules = unsafe {
            let symbol = library
                .get::<unsafe extern "C" fn() -> *const RawModuleTable>(MODULE_TABLE_SYMBOL)
                .map_err(|_| {
                    ExtensionError::SymbolNotFound(format!(
                        "{}: modhost_extension_modules",
                        filename
                    ))
                })?;
            records_from_table(symbol())?
        };

        Ok(Self {
            filename: filename.to_string(),
            modules,
            loaded_at: Utc::now(),
            _library: Some(library),
        })
    }

    fn from_builtins(filename: &str, builtins: &[BuiltinModule]) -> Self {
        Self {
            filename: filename.to_string(),
            modules: builtins.iter().map(ModuleRecord::from_builtin).collect(),
            loaded_at: Utc::now(),
            _library: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn find_module(&self, name: &str) -> Option<&ModuleRecord> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_builtin(&self) -> bool {
        self._library.is_none()
    }
}

/// Cache of loader contexts keyed by archive filename.
#[derive(Default)]
pub struct LoaderContextCache {
    contexts: RwLock<HashMap<String, Arc<LoaderContext>>>,
}

impl LoaderContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached context for `filename`, opening the archive
    /// at `path` on first use.
    pub fn get_or_create(&self, filename: &str, path: &Path) -> Result<Arc<LoaderContext>> {
        if let Some(context) = self.contexts.read().get(filename) {
            return Ok(Arc::clone(context));
        }

        let mut contexts = self.contexts.write();
        // Racing loads may have filled the slot while we waited.
        if let Some(context) = contexts.get(filename) {
            return Ok(Arc::clone(context));
        }

        debug!("Opening extension archive: {}", path.display());
        let context = Arc::new(LoaderContext::open_native(path, filename)?);
        contexts.insert(filename.to_string(), Arc::clone(&context));
        Ok(context)
    }

    /// Seeds the cache with a builtin archive under a virtual filename.
    pub fn insert_builtin(&self, filename: &str, builtins: &[BuiltinModule]) -> Arc<LoaderContext> {
        let context = Arc::new(LoaderContext::from_builtins(filename, builtins));
        self.contexts
            .write()
            .insert(filename.to_string(), Arc::clone(&context));
        context
    }

    pub fn get(&self, filename: &str) -> Option<Arc<LoaderContext>> {
        self.contexts.read().get(filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.contexts.read().contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }

    /// Drops a cached context. Callers are expected to have run module
    /// teardown first; releasing the library invalidates every fn
    /// pointer handed out from it.
    pub fn evict(&self, filename: &str) -> bool {
        self.contexts.write().remove(filename).is_some()
    }
}
