//! C-compatible module table shared between the host and extension
//! archives.
//!
//! Every archive exports two symbols:
//! - `modhost_extension_abi_version() -> u32`, checked before anything
//!   else is trusted.
//! - `modhost_extension_modules() -> *const RawModuleTable`, the list of
//!   modules packaged in the archive.
//!
//! Strings are passed as pointer + length into `'static` data, the same
//! layout the table entries themselves use. Instances cross the boundary
//! as `*mut ModuleInstance`, a plain Rust box: host and extension are
//! assumed to be built by the same toolchain, guarded by the ABI version
//! symbol.

use std::panic::{self, AssertUnwindSafe};

use crate::module::ExtensionModule;

/// ABI version for dynamic loading. Incremented on breaking changes to
/// the extension interface.
pub const MODHOST_ABI_VERSION: u32 = 1;

/// Name of the exported ABI-version symbol.
pub const ABI_VERSION_SYMBOL: &[u8] = b"modhost_extension_abi_version";

/// Name of the exported module-table symbol.
pub const MODULE_TABLE_SYMBOL: &[u8] = b"modhost_extension_modules";

/// Entry-point flags describing which hooks a module exposes.
pub mod entry_points {
    /// Module exposes `on_load(&HostContext)`.
    pub const LOAD: u32 = 1 << 0;
    /// Module exposes `set_id(&str)`.
    pub const SET_ID: u32 = 1 << 1;
    /// Module opts into `on_unload(&HostContext)` at category teardown.
    pub const UNLOAD: u32 = 1 << 2;
}

/// Maps the macro's `teardown:` field to its entry-point flag.
pub const fn teardown_flag(teardown: bool) -> u32 {
    if teardown {
        entry_points::UNLOAD
    } else {
        0
    }
}

/// Boxed extension object crossing the library boundary.
pub struct ModuleInstance {
    module: Box<dyn ExtensionModule>,
}

impl ModuleInstance {
    pub fn new(module: Box<dyn ExtensionModule>) -> Self {
        Self { module }
    }

    pub fn module_mut(&mut self) -> &mut dyn ExtensionModule {
        self.module.as_mut()
    }
}

/// Per-module setup hook. Returns 0 on success.
pub type InitFn = unsafe extern "C" fn() -> i32;

/// Constructor. Returns null if construction failed.
pub type CreateFn = unsafe extern "C" fn() -> *mut ModuleInstance;

/// Destructor for instances produced by the matching [`CreateFn`].
pub type DestroyFn = unsafe extern "C" fn(*mut ModuleInstance);

/// One module packaged in an archive.
#[repr(C)]
pub struct RawModuleEntry {
    /// Qualified module name (UTF-8, not NUL-terminated).
    pub name: *const u8,
    pub name_len: usize,
    /// Capability the module provides (UTF-8, not NUL-terminated).
    pub capability: *const u8,
    pub capability_len: usize,
    /// Bitwise OR of [`entry_points`] flags.
    pub entry_points: u32,
    pub init_fn: Option<InitFn>,
    pub create_fn: Option<CreateFn>,
    pub destroy_fn: Option<DestroyFn>,
}

/// The table returned by `modhost_extension_modules`.
#[repr(C)]
pub struct RawModuleTable {
    pub abi_version: u32,
    pub len: usize,
    pub entries: *const RawModuleEntry,
}

// Tables emitted by `export_extension_modules!` point exclusively at
// 'static data, so sharing them across threads is fine.
unsafe impl Send for RawModuleEntry {}
unsafe impl Sync for RawModuleEntry {}
unsafe impl Send for RawModuleTable {}
unsafe impl Sync for RawModuleTable {}

/// Constructor wrapper referenced by `export_extension_modules!`.
///
/// Panics in `Default::default` are caught and reported as a null
/// return, so they never unwind across the library boundary.
pub extern "C" fn create_instance<T>() -> *mut ModuleInstance
where
    T: ExtensionModule + Default + 'static,
{
    match panic::catch_unwind(|| ModuleInstance::new(Box::new(T::default()))) {
        Ok(instance) => Box::into_raw(Box::new(instance)),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Destructor wrapper referenced by `export_extension_modules!`.
pub extern "C" fn destroy_instance(instance: *mut ModuleInstance) {
    if !instance.is_null() {
        // SAFETY: the pointer was produced by `create_instance`.
        drop(unsafe { Box::from_raw(instance) });
    }
}

/// Init-hook wrapper referenced by `export_extension_modules!`. Returns
/// 0 on success; panics are caught and reported as failure.
pub extern "C" fn init_module<T>() -> i32
where
    T: ExtensionModule,
{
    match panic::catch_unwind(AssertUnwindSafe(T::init)) {
        Ok(Ok(())) => 0,
        _ => -1,
    }
}
