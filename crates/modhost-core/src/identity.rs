//! Process-wide extension identities.
//!
//! Identities are append only: once issued, an identity stays reserved
//! for the lifetime of the process, surviving category unloads.

use std::collections::HashSet;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{ExtensionError, Result};

/// The append-only set of every extension identity ever issued.
#[derive(Default)]
pub struct IdentityRegistry {
    ids: Mutex<HashSet<String>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a caller-supplied identity. Empty and already-taken
    /// identities are rejected without mutating the set.
    pub fn issue(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(ExtensionError::NullIdentity);
        }
        let mut ids = self.ids.lock();
        if !ids.insert(id.to_string()) {
            return Err(ExtensionError::DuplicateIdentity(id.to_string()));
        }
        Ok(())
    }

    /// Generates and reserves a fresh random identity.
    pub fn register(&self) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.issue(&id)?;
        Ok(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.lock().contains(id)
    }

    pub fn all(&self) -> Vec<String> {
        self.ids.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_rejects_empty() {
        let registry = IdentityRegistry::new();
        assert!(matches!(
            registry.issue("").unwrap_err(),
            ExtensionError::NullIdentity
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_issue_rejects_duplicate() {
        let registry = IdentityRegistry::new();
        registry.issue("one").unwrap();
        assert!(matches!(
            registry.issue("one").unwrap_err(),
            ExtensionError::DuplicateIdentity(id) if id == "one"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_yields_unique_ids() {
        let registry = IdentityRegistry::new();
        let a = registry.register().unwrap();
        let b = registry.register().unwrap();
        assert_ne!(a, b);
        assert!(registry.contains(&a));
        assert!(registry.contains(&b));
        assert_eq!(registry.len(), 2);
    }
}
