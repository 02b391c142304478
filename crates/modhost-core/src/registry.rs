//! Bookkeeping of what is currently loaded, per category.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Tracks loaded archive filenames per category, plus the module names
/// each archive contributed. The module-name cache outlives unloads so
/// a later reload can find its teardown targets.
#[derive(Default)]
pub struct ExtensionRegistry {
    loaded: RwLock<HashMap<String, Vec<String>>>,
    modules: RwLock<HashMap<String, Vec<String>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded-filename list for a category.
    pub fn record_loaded(&self, category: &str, filenames: Vec<String>) {
        self.loaded.write().insert(category.to_string(), filenames);
    }

    /// Filenames currently loaded under the category, empty if none.
    pub fn loaded_filenames(&self, category: &str) -> Vec<String> {
        self.loaded
            .read()
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn remove_category(&self, category: &str) -> Vec<String> {
        self.loaded
            .write()
            .remove(category)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<String> {
        self.loaded.read().keys().cloned().collect()
    }

    /// Remembers which module names an archive exposed. Retained even
    /// after the archive's category is unloaded.
    pub fn record_modules(&self, filename: &str, names: Vec<String>) {
        self.modules.write().insert(filename.to_string(), names);
    }

    pub fn module_list(&self, filename: &str) -> Option<Vec<String>> {
        self.modules.read().get(filename).cloned()
    }
}
