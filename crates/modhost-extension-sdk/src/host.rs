//! The host-context handle passed to extension hooks.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Handle to the host application, passed to every lifecycle hook.
///
/// Carries the host's name, its data directory (under which
/// `extensions/<category>/` trees live), and the host configuration map.
#[derive(Debug, Clone)]
pub struct HostContext {
    host_name: String,
    data_dir: PathBuf,
    config: Value,
}

impl HostContext {
    pub fn new(host_name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host_name: host_name.into(),
            data_dir: data_dir.into(),
            config: Value::Null,
        }
    }

    /// Attaches a configuration map (a JSON object tree).
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root directory for all extension categories.
    pub fn extensions_root(&self) -> PathBuf {
        self.data_dir.join("extensions")
    }

    /// Directory scanned for one category, e.g. `addons`.
    pub fn extension_dir(&self, category: &str) -> PathBuf {
        self.extensions_root().join(category)
    }

    /// Raw config value at `path` (dotted, e.g. `"tools.threadpool"`)
    /// and `variable` below it.
    pub fn config_value(&self, path: &str, variable: &str) -> Option<&Value> {
        let mut node = &self.config;
        for part in path.split('.').filter(|p| !p.is_empty()) {
            node = node.get(part)?;
        }
        node.get(variable)
    }

    /// String value, or `None` if absent or not a string.
    pub fn config_string(&self, path: &str, variable: &str) -> Option<String> {
        self.config_value(path, variable)?
            .as_str()
            .map(str::to_string)
    }

    /// Boolean value, defaulting to `false` if absent or mistyped.
    pub fn config_bool(&self, path: &str, variable: &str) -> bool {
        self.config_value(path, variable)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Integer value, defaulting to `0` if absent or mistyped.
    pub fn config_i64(&self, path: &str, variable: &str) -> i64 {
        self.config_value(path, variable)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// Float value, defaulting to `0.0` if absent or mistyped.
    pub fn config_f64(&self, path: &str, variable: &str) -> f64 {
        self.config_value(path, variable)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}
