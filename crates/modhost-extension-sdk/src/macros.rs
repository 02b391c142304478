//! Export macro for extension archives.

/// Exports the module table for an extension archive.
///
/// Lists every module packaged in the archive; the host enumerates the
/// table, preloads each module's [`init`] hook, and instantiates the
/// modules that qualify for the requested capability. Module types must
/// implement [`ExtensionModule`] and `Default`.
///
/// `teardown: true` opts the module into `on_unload` when its category
/// is unloaded.
///
/// # Example
///
/// ```rust,ignore
/// modhost_extension_sdk::export_extension_modules! {
///     module WeatherAddOn {
///         name: "weather.WeatherAddOn",
///         capability: "modhost.addon",
///         teardown: true,
///     },
///     module ForecastAddOn {
///         name: "weather.ForecastAddOn",
///         capability: "modhost.addon",
///         teardown: false,
///     },
/// }
/// ```
///
/// [`init`]: crate::module::ExtensionModule::init
/// [`ExtensionModule`]: crate::module::ExtensionModule
#[macro_export]
macro_rules! export_extension_modules {
    ($(module $ty:ty {
        name: $name:expr,
        capability: $capability:expr,
        teardown: $teardown:expr $(,)?
    }),+ $(,)?) => {
        #[no_mangle]
        pub extern "C" fn modhost_extension_abi_version() -> u32 {
            $crate::abi::MODHOST_ABI_VERSION
        }

        #[no_mangle]
        pub extern "C" fn modhost_extension_modules() -> *const $crate::abi::RawModuleTable {
            static ENTRIES: &[$crate::abi::RawModuleEntry] = &[
                $($crate::abi::RawModuleEntry {
                    name: $name.as_ptr(),
                    name_len: $name.len(),
                    capability: $capability.as_ptr(),
                    capability_len: $capability.len(),
                    entry_points: $crate::abi::entry_points::LOAD
                        | $crate::abi::entry_points::SET_ID
                        | $crate::abi::teardown_flag($teardown),
                    init_fn: Some($crate::abi::init_module::<$ty> as $crate::abi::InitFn),
                    create_fn: Some(
                        $crate::abi::create_instance::<$ty> as $crate::abi::CreateFn,
                    ),
                    destroy_fn: Some($crate::abi::destroy_instance as $crate::abi::DestroyFn),
                }),+
            ];
            static TABLE: $crate::abi::RawModuleTable = $crate::abi::RawModuleTable {
                abi_version: $crate::abi::MODHOST_ABI_VERSION,
                len: ENTRIES.len(),
                entries: ENTRIES.as_ptr(),
            };
            &TABLE
        }
    };
}
