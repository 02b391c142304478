//! A minimal extension archive for smoke testing the native loading
//! path. Drop the built library into an `addons` category directory
//! and the host will pick it up.

use modhost_extension_sdk::prelude::*;

#[derive(Default)]
pub struct SmokeProbe {
    id: String,
}

impl ExtensionModule for SmokeProbe {
    fn init() -> Result<(), HookError> {
        tracing::debug!("smoke probe initialized");
        Ok(())
    }

    fn on_load(&mut self, host: &HostContext) -> Result<(), HookError> {
        let logger = ExtensionLogger::new("AddOn", "SmokeProbe");
        logger.info(&format!(
            "loaded on {} with ID {}",
            host.host_name(),
            self.id
        ));
        if host.config_bool("smoke", "fail_on_load") {
            return Err(HookError::init("failure requested via configuration"));
        }
        Ok(())
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn on_unload(&mut self, _host: &HostContext) -> Result<(), HookError> {
        ExtensionLogger::new("AddOn", "SmokeProbe").info("unloaded");
        Ok(())
    }
}

modhost_extension_sdk::export_extension_modules! {
    module SmokeProbe {
        name: "modhost.smoke.SmokeProbe",
        capability: "modhost.addon",
        teardown: true,
    },
}
