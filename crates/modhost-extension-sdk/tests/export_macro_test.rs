//! Exercises the full export surface the way the host consumes it:
//! exported symbols, table layout, entry-point flags, and the
//! create/destroy wrappers.

use modhost_extension_sdk::abi::{self, entry_points, MODHOST_ABI_VERSION};
use modhost_extension_sdk::prelude::*;

#[derive(Default)]
struct Alpha {
    id: String,
}

impl ExtensionModule for Alpha {
    fn on_load(&mut self, _host: &HostContext) -> Result<(), HookError> {
        Ok(())
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn on_unload(&mut self, _host: &HostContext) -> Result<(), HookError> {
        Ok(())
    }
}

#[derive(Default)]
struct Beta;

impl ExtensionModule for Beta {
    fn init() -> Result<(), HookError> {
        Err(HookError::init("beta never initializes"))
    }

    fn on_load(&mut self, _host: &HostContext) -> Result<(), HookError> {
        Ok(())
    }

    fn set_id(&mut self, _id: &str) {}
}

modhost_extension_sdk::export_extension_modules! {
    module Alpha {
        name: "test.Alpha",
        capability: "modhost.addon",
        teardown: true,
    },
    module Beta {
        name: "test.Beta",
        capability: "modhost.dlc",
        teardown: false,
    },
}

fn read_str(ptr: *const u8, len: usize) -> &'static str {
    let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
    std::str::from_utf8(bytes).unwrap()
}

#[test]
fn test_exported_abi_version() {
    assert_eq!(modhost_extension_abi_version(), MODHOST_ABI_VERSION);
}

#[test]
fn test_table_layout() {
    let table = unsafe { &*modhost_extension_modules() };
    assert_eq!(table.abi_version, MODHOST_ABI_VERSION);
    assert_eq!(table.len, 2);

    let entries = unsafe { std::slice::from_raw_parts(table.entries, table.len) };

    assert_eq!(read_str(entries[0].name, entries[0].name_len), "test.Alpha");
    assert_eq!(
        read_str(entries[0].capability, entries[0].capability_len),
        "modhost.addon"
    );
    assert_ne!(entries[0].entry_points & entry_points::LOAD, 0);
    assert_ne!(entries[0].entry_points & entry_points::SET_ID, 0);
    assert_ne!(entries[0].entry_points & entry_points::UNLOAD, 0);

    assert_eq!(read_str(entries[1].name, entries[1].name_len), "test.Beta");
    assert_eq!(entries[1].entry_points & entry_points::UNLOAD, 0);
}

#[test]
fn test_create_and_destroy_through_table() {
    let table = unsafe { &*modhost_extension_modules() };
    let entries = unsafe { std::slice::from_raw_parts(table.entries, table.len) };

    let create = entries[0].create_fn.expect("create fn");
    let destroy = entries[0].destroy_fn.expect("destroy fn");

    let ptr = unsafe { create() };
    assert!(!ptr.is_null());

    let instance: &mut abi::ModuleInstance = unsafe { &mut *ptr };
    instance.module_mut().set_id("alpha-0");

    unsafe { destroy(ptr) };
}

#[test]
fn test_init_hook_status_codes() {
    let table = unsafe { &*modhost_extension_modules() };
    let entries = unsafe { std::slice::from_raw_parts(table.entries, table.len) };

    let alpha_init = entries[0].init_fn.expect("init fn");
    assert_eq!(unsafe { alpha_init() }, 0);

    let beta_init = entries[1].init_fn.expect("init fn");
    assert_ne!(unsafe { beta_init() }, 0);
}
