//! Qualification checks deciding which modules of an archive belong to
//! the category being loaded.

use modhost_extension_sdk::abi::entry_points;
use tracing::debug;

use crate::module::ModuleRecord;

/// Whether the module qualifies for loading under the given capability.
///
/// A qualifying module is instantiable, provides exactly the required
/// capability, and exports both the load and the identity entry points.
/// Each rejection is logged at debug level with the reason.
pub(crate) fn qualifies(record: &ModuleRecord, required_capability: &str, label: &str) -> bool {
    if !record.is_instantiable() {
        debug!(
            "[{}] Skipping {}: module is not instantiable",
            label,
            record.name()
        );
        return false;
    }
    if record.capability() != required_capability {
        debug!(
            "[{}] Skipping {}: provides capability {:?}, not {:?}",
            label,
            record.name(),
            record.capability(),
            required_capability
        );
        return false;
    }
    if !record.has_entry_point(entry_points::LOAD) {
        debug!(
            "[{}] Skipping {}: missing load entry point",
            label,
            record.name()
        );
        return false;
    }
    if !record.has_entry_point(entry_points::SET_ID) {
        debug!(
            "[{}] Skipping {}: missing identity entry point",
            label,
            record.name()
        );
        return false;
    }
    true
}
