//! Eager initialization of every module in an archive.

use tracing::{debug, trace};

use crate::context::LoaderContext;

/// Runs the init hook of every module in the archive, regardless of
/// capability. A failing module is logged and skipped; it does not
/// prevent its siblings from initializing. Returns the success count.
pub(crate) fn preload(context: &LoaderContext, label: &str) -> usize {
    let mut initialized = 0;
    for record in context.modules() {
        match record.preload() {
            Ok(()) => {
                trace!("[{}] Preloaded module: {}", label, record.name());
                initialized += 1;
            }
            Err(err) => {
                debug!(
                    "[{}] Failed to preload module {} from {}: {}",
                    label,
                    record.name(),
                    context.filename(),
                    err
                );
            }
        }
    }
    initialized
}
