//! Function table for the native library
//!
//! The table is either resolved at link time from the `interop-native` rlib
//! or looked up by symbol name in a shared library opened with `libloading`.

use crate::error::{BoundaryError, Result};
use interop_native::contract::{
    symbols, AddNumbersFn, BufferCallbackFn, FibonacciFn, FreeStringFn, ProcessStringFn,
};
use libloading::Library;
use std::path::{Path, PathBuf};

/// One function pointer per exported symbol
#[derive(Debug, Clone, Copy)]
pub struct FunctionTable {
    pub add_numbers: AddNumbersFn,
    pub process_string: ProcessStringFn,
    pub free_string: FreeStringFn,
    pub fibonacci: FibonacciFn,
    pub process_data_with_callback: BufferCallbackFn,
    pub sum_with_callback: BufferCallbackFn,
}

impl FunctionTable {
    /// Table backed by the native library linked into this executable
    pub fn linked() -> Self {
        use interop_native::exports;

        Self {
            add_numbers: exports::add_numbers,
            process_string: exports::process_string,
            free_string: exports::free_rust_string,
            fibonacci: exports::fibonacci,
            process_data_with_callback: exports::process_data_with_callback,
            sum_with_callback: exports::sum_with_callback,
        }
    }
}

/// A shared library opened at runtime together with its resolved table
///
/// The function pointers are only valid while the library stays loaded, so
/// the table is only reachable through a borrow of this struct.
pub struct NativeLibrary {
    table: FunctionTable,
    path: PathBuf,
    // Declared last: dropped after the table that points into it
    _library: Library,
}

impl NativeLibrary {
    /// Open the shared library at `path` and resolve every contract symbol
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading native library: {:?}", path);

        // Runs the library's initialisers
        let library = unsafe { Library::new(path) }.map_err(|source| BoundaryError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let table = unsafe {
            FunctionTable {
                add_numbers: resolve(&library, symbols::ADD_NUMBERS)?,
                process_string: resolve(&library, symbols::PROCESS_STRING)?,
                free_string: resolve(&library, symbols::FREE_STRING)?,
                fibonacci: resolve(&library, symbols::FIBONACCI)?,
                process_data_with_callback: resolve(
                    &library,
                    symbols::PROCESS_DATA_WITH_CALLBACK,
                )?,
                sum_with_callback: resolve(&library, symbols::SUM_WITH_CALLBACK)?,
            }
        };

        log::debug!("Resolved all native symbols from {:?}", path);

        Ok(Self {
            table,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Look up one symbol and copy out its function pointer
///
/// # Safety
///
/// `T` must be the exact function pointer type the symbol was exported with,
/// and the result must not outlive `library`.
unsafe fn resolve<T: Copy>(library: &Library, name: &[u8]) -> Result<T> {
    library
        .get::<T>(name)
        .map(|symbol| *symbol)
        .map_err(|source| BoundaryError::MissingSymbol {
            symbol: String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name))
                .into_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_table_calls_through() {
        let table = FunctionTable::linked();
        assert_eq!(unsafe { (table.add_numbers)(2, 3) }, 5);
        assert_eq!(unsafe { (table.fibonacci)(10) }, 55);
    }

    #[test]
    fn test_load_missing_library() {
        let result = NativeLibrary::load(Path::new("definitely/not/here/libinterop_native.so"));
        match result {
            Err(err @ BoundaryError::Load { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "failed to load native library \"definitely/not/here/libinterop_native.so\""
                );
                assert!(std::error::Error::source(&err).is_some());
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("loading a missing library should fail"),
        }
    }

    /// The workspace cdylib cargo built alongside this test binary
    fn built_library() -> PathBuf {
        let exe = std::env::current_exe().unwrap();
        // target/<profile>/deps/<test binary>
        let deps = exe.parent().unwrap();
        let profile = deps.parent().unwrap();

        let name = crate::loader::platform_library_name();
        let candidates = vec![deps.join(&name), profile.join(&name)];
        crate::loader::find_in(&candidates)
            .unwrap_or_else(|| panic!("{} was not built into {:?}", name, candidates))
            .to_path_buf()
    }

    #[test]
    fn test_missing_symbol_names_the_symbol() {
        let library = unsafe { Library::new(built_library()) }.unwrap();
        let err = unsafe { resolve::<AddNumbersFn>(&library, b"no_such_export\0") }.unwrap_err();

        assert_eq!(err.to_string(), "native library is missing symbol `no_such_export`");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_built_cdylib() {
        let path = built_library();
        let library = NativeLibrary::load(&path).unwrap();
        assert_eq!(library.path(), path.as_path());
        let api = crate::native::NativeApi::new(library.table());
        assert_eq!(api.add(5, 7), 12);
        assert_eq!(api.process_string("hi").unwrap(), "Processed: HI");

        let mut seen = Vec::new();
        assert_eq!(api.sum_buffer(&[10, 20, 30, 40], |v| seen.push(v)).unwrap(), 100);
        assert_eq!(seen, vec![10, 30, 60, 100]);
    }
}
