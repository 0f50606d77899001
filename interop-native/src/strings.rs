//! Ownership tracking for strings handed out across the boundary
//!
//! Debug builds record every pointer returned by `process_string` in a
//! process-wide live set. Releasing a pointer that is not live (a foreign
//! pointer, or a second free of the same one) aborts instead of corrupting
//! the heap. Release builds keep no state.

use std::ffi::CString;
use std::os::raw::c_char;

#[cfg(debug_assertions)]
mod registry {
    use std::collections::HashSet;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn live() -> MutexGuard<'static, HashSet<usize>> {
        static LIVE: OnceLock<Mutex<HashSet<usize>>> = OnceLock::new();
        LIVE.get_or_init(|| Mutex::new(HashSet::new()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(ptr: usize) {
        live().insert(ptr);
    }

    pub fn remove(ptr: usize) -> bool {
        live().remove(&ptr)
    }

    pub fn contains(ptr: usize) -> bool {
        live().contains(&ptr)
    }
}

/// Move an owned string to the foreign side
pub(crate) fn into_foreign(value: CString) -> *mut c_char {
    let ptr = value.into_raw();
    #[cfg(debug_assertions)]
    registry::insert(ptr as usize);
    ptr
}

/// Take back ownership of a string previously returned by [`into_foreign`]
///
/// # Safety
///
/// `ptr` must be non-null and come from [`into_foreign`], and must not have
/// been reclaimed already.
pub(crate) unsafe fn reclaim(ptr: *mut c_char) -> CString {
    #[cfg(debug_assertions)]
    {
        if !registry::remove(ptr as usize) {
            log::error!("free of a string not owned by this library: {:p}", ptr);
            std::process::abort();
        }
    }
    CString::from_raw(ptr)
}

/// Whether `ptr` is a string handed out by this library and not yet freed
#[cfg(debug_assertions)]
pub fn is_live_string(ptr: *const c_char) -> bool {
    registry::contains(ptr as usize)
}

/// Release builds do not track allocations
#[cfg(not(debug_assertions))]
pub fn is_live_string(_ptr: *const c_char) -> bool {
    false
}
