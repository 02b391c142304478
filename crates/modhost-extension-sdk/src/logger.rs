//! Prefixed logger for extension code.
//!
//! Example output: `[AddOn] [weather] enabled`.

/// Logger that prepends a context label and component name to each
/// message, forwarding to `tracing`.
#[derive(Debug, Clone)]
pub struct ExtensionLogger {
    prefix: String,
}

impl ExtensionLogger {
    /// `context_label` identifies the component kind (e.g. "AddOn",
    /// "DLC"); `name` the specific component.
    pub fn new(context_label: &str, name: &str) -> Self {
        Self {
            prefix: format!("[{context_label}] [{name}]"),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{} {}", self.prefix, message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{} {}", self.prefix, message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{} {}", self.prefix, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_format() {
        let log = ExtensionLogger::new("AddOn", "weather");
        assert_eq!(log.prefix(), "[AddOn] [weather]");
    }
}
