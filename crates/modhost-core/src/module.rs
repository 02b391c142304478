//! Module records and instances.
//!
//! A [`ModuleRecord`] is the host-side view of one module in an archive:
//! its name, the capability it provides, which lifecycle entry points it
//! exports, and how to construct it. Records come from two places: the
//! exported module table of a native archive, or builtin registrations
//! made directly by the host process.

use std::panic::{self, AssertUnwindSafe};

use modhost_extension_sdk::abi::{
    entry_points, CreateFn, DestroyFn, InitFn, ModuleInstance, RawModuleTable, MODHOST_ABI_VERSION,
};
use modhost_extension_sdk::{ExtensionModule, HookError};
use tracing::debug;

use crate::error::{ExtensionError, Result};

/// Constructor for a builtin module, living in the host binary itself.
pub type BuiltinConstructor = fn() -> Box<dyn ExtensionModule>;

/// Optional preload hook for a builtin module.
pub type BuiltinInit = fn() -> std::result::Result<(), HookError>;

/// A module compiled into the host process rather than loaded from an
/// archive on disk.
pub struct BuiltinModule {
    pub name: String,
    pub capability: String,
    pub teardown: bool,
    pub init: Option<BuiltinInit>,
    pub construct: BuiltinConstructor,
}

fn construct_builtin<T: ExtensionModule + Default + 'static>() -> Box<dyn ExtensionModule> {
    Box::new(T::default())
}

fn init_builtin<T: ExtensionModule + Default + 'static>() -> std::result::Result<(), HookError> {
    T::init()
}

impl BuiltinModule {
    /// Describes `T` as a builtin module with the given name and
    /// capability.
    pub fn of<T: ExtensionModule + Default + 'static>(
        name: &str,
        capability: &str,
        teardown: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            capability: capability.to_string(),
            teardown,
            init: Some(init_builtin::<T>),
            construct: construct_builtin::<T>,
        }
    }
}

/// How a module is backed.
#[derive(Debug)]
pub enum ModuleKind {
    Native {
        init: Option<InitFn>,
        create: Option<CreateFn>,
        destroy: Option<DestroyFn>,
    },
    Builtin {
        init: Option<BuiltinInit>,
        construct: BuiltinConstructor,
    },
}

/// One module as seen by the host.
#[derive(Debug)]
pub struct ModuleRecord {
    name: String,
    capability: String,
    entry_points: u32,
    kind: ModuleKind,
}

impl ModuleRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn has_entry_point(&self, flag: u32) -> bool {
        self.entry_points & flag != 0
    }

    /// Whether the record carries enough to produce an instance.
    pub fn is_instantiable(&self) -> bool {
        match &self.kind {
            ModuleKind::Native { create, destroy, .. } => create.is_some() && destroy.is_some(),
            ModuleKind::Builtin { .. } => true,
        }
    }

    pub(crate) fn from_builtin(builtin: &BuiltinModule) -> Self {
        let mut flags = entry_points::LOAD | entry_points::SET_ID;
        if builtin.teardown {
            flags |= entry_points::UNLOAD;
        }
        Self {
            name: builtin.name.clone(),
            capability: builtin.capability.clone(),
            entry_points: flags,
            kind: ModuleKind::Builtin {
                init: builtin.init,
                construct: builtin.construct,
            },
        }
    }

    /// Runs the module's init hook, if it exports one.
    pub fn preload(&self) -> Result<()> {
        match &self.kind {
            ModuleKind::Native { init, .. } => {
                if let Some(init) = *init {
                    let status = unsafe { init() };
                    if status != 0 {
                        return Err(ExtensionError::Preload(format!(
                            "{} init returned status {}",
                            self.name, status
                        )));
                    }
                }
                Ok(())
            }
            ModuleKind::Builtin { init, .. } => {
                if let Some(init) = init {
                    match panic::catch_unwind(AssertUnwindSafe(init)) {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(err)) => Err(ExtensionError::Preload(format!(
                            "{}: {}",
                            self.name, err
                        ))),
                        Err(_) => Err(ExtensionError::Preload(format!(
                            "{} init panicked",
                            self.name
                        ))),
                    }
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Produces a fresh instance of the module.
    pub fn instantiate(&self) -> Result<InstanceHandle> {
        match &self.kind {
            ModuleKind::Native { create, destroy, .. } => {
                let create =
                    (*create).ok_or_else(|| ExtensionError::Instantiation(self.name.clone()))?;
                let destroy =
                    (*destroy).ok_or_else(|| ExtensionError::Instantiation(self.name.clone()))?;
                let ptr = unsafe { create() };
                if ptr.is_null() {
                    return Err(ExtensionError::Instantiation(self.name.clone()));
                }
                Ok(InstanceHandle::Native { ptr, destroy })
            }
            ModuleKind::Builtin { construct, .. } => {
                match panic::catch_unwind(AssertUnwindSafe(construct)) {
                    Ok(module) => Ok(InstanceHandle::Builtin(module)),
                    Err(_) => Err(ExtensionError::Instantiation(self.name.clone())),
                }
            }
        }
    }
}

/// An owned, live module instance. Native instances release themselves
/// through the archive's destroy entry point on drop.
pub enum InstanceHandle {
    Native {
        ptr: *mut ModuleInstance,
        destroy: DestroyFn,
    },
    Builtin(Box<dyn ExtensionModule>),
}

impl InstanceHandle {
    pub fn module_mut(&mut self) -> &mut dyn ExtensionModule {
        match self {
            InstanceHandle::Native { ptr, .. } => unsafe { (**ptr).module_mut() },
            InstanceHandle::Builtin(module) => module.as_mut(),
        }
    }
}

impl Drop for InstanceHandle {
    fn drop(&mut self) {
        if let InstanceHandle::Native { ptr, destroy } = self {
            if !ptr.is_null() {
                unsafe { (*destroy)(*ptr) };
            }
        }
    }
}

unsafe fn read_str(ptr: *const u8, len: usize) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let bytes = std::slice::from_raw_parts(ptr, len);
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// Parses the exported module table of a native archive into records.
///
/// # Safety
///
/// `table` must point at a valid [`RawModuleTable`] whose entries and
/// strings stay alive for the lifetime of the library.
pub(crate) unsafe fn records_from_table(table: *const RawModuleTable) -> Result<Vec<ModuleRecord>> {
    if table.is_null() {
        return Err(ExtensionError::LoadFailed(
            "archive exported a null module table".to_string(),
        ));
    }

    let table = &*table;
    if table.abi_version != MODHOST_ABI_VERSION {
        return Err(ExtensionError::IncompatibleAbi {
            expected: MODHOST_ABI_VERSION,
            got: table.abi_version,
        });
    }
    if table.entries.is_null() {
        return Err(ExtensionError::LoadFailed(
            "archive exported a table with null entries".to_string(),
        ));
    }

    let entries = std::slice::from_raw_parts(table.entries, table.len);
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = match read_str(entry.name, entry.name_len) {
            Some(name) if !name.is_empty() => name,
            _ => {
                debug!("Skipping module entry with missing or invalid name");
                continue;
            }
        };
        let capability = read_str(entry.capability, entry.capability_len).unwrap_or_default();

        records.push(ModuleRecord {
            name,
            capability,
            entry_points: entry.entry_points,
            kind: ModuleKind::Native {
                init: entry.init_fn,
                create: entry.create_fn,
                destroy: entry.destroy_fn,
            },
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhost_extension_sdk::HostContext;

    #[derive(Default)]
    struct Noop;

    impl ExtensionModule for Noop {
        fn on_load(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            Ok(())
        }

        fn set_id(&mut self, _id: &str) {}
    }

    #[derive(Default)]
    struct FailsInit;

    impl ExtensionModule for FailsInit {
        fn init() -> std::result::Result<(), HookError> {
            Err(HookError::init("nope"))
        }

        fn on_load(&mut self, _host: &HostContext) -> std::result::Result<(), HookError> {
            Ok(())
        }

        fn set_id(&mut self, _id: &str) {}
    }

    #[test]
    fn test_builtin_record_flags() {
        let record = ModuleRecord::from_builtin(&BuiltinModule::of::<Noop>(
            "test.Noop",
            "modhost.addon",
            true,
        ));
        assert!(record.has_entry_point(entry_points::LOAD));
        assert!(record.has_entry_point(entry_points::SET_ID));
        assert!(record.has_entry_point(entry_points::UNLOAD));
        assert!(record.is_instantiable());
    }

    #[test]
    fn test_builtin_without_teardown() {
        let record = ModuleRecord::from_builtin(&BuiltinModule::of::<Noop>(
            "test.Noop",
            "modhost.addon",
            false,
        ));
        assert!(!record.has_entry_point(entry_points::UNLOAD));
    }

    #[test]
    fn test_builtin_preload_and_instantiate() {
        let record = ModuleRecord::from_builtin(&BuiltinModule::of::<Noop>(
            "test.Noop",
            "modhost.addon",
            true,
        ));
        record.preload().unwrap();
        let mut instance = record.instantiate().unwrap();
        instance.module_mut().set_id("n-1");
    }

    #[test]
    fn test_builtin_preload_failure() {
        let record = ModuleRecord::from_builtin(&BuiltinModule::of::<FailsInit>(
            "test.FailsInit",
            "modhost.addon",
            false,
        ));
        let err = record.preload().unwrap_err();
        assert!(matches!(err, ExtensionError::Preload(_)));
    }

    #[test]
    fn test_table_abi_mismatch() {
        let table = RawModuleTable {
            abi_version: MODHOST_ABI_VERSION + 1,
            len: 0,
            entries: std::ptr::NonNull::<modhost_extension_sdk::RawModuleEntry>::dangling()
                .as_ptr(),
        };
        let err = unsafe { records_from_table(&table) }.unwrap_err();
        assert!(matches!(err, ExtensionError::IncompatibleAbi { .. }));
    }
}
