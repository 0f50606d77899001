//! Boundary contract shared by the native library and its hosts
//!
//! Everything in this module must match the C declarations bit-for-bit:
//!
//! ```c
//! typedef struct {
//!     int* data;
//!     int length;
//!     void (*callback)(int);
//! } DataWithCallback;
//!
//! int add_numbers(int a, int b);
//! char* process_string(const char* input);
//! void free_rust_string(char* s);
//! unsigned long long fibonacci(unsigned int n);
//! int process_data_with_callback(DataWithCallback data_struct);
//! int sum_with_callback(DataWithCallback data_struct);
//! ```

use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

/// Callback invoked by the native side once per element
pub type ValueCallback = unsafe extern "C" fn(value: c_int);

pub type AddNumbersFn = unsafe extern "C" fn(a: c_int, b: c_int) -> c_int;
pub type ProcessStringFn = unsafe extern "C" fn(input: *const c_char) -> *mut c_char;
pub type FreeStringFn = unsafe extern "C" fn(s: *mut c_char);
pub type FibonacciFn = unsafe extern "C" fn(n: u32) -> u64;
pub type BufferCallbackFn = unsafe extern "C" fn(data: DataWithCallback) -> c_int;

/// Exported symbol names, null-terminated for dynamic symbol lookup
pub mod symbols {
    pub const ADD_NUMBERS: &[u8] = b"add_numbers\0";
    pub const PROCESS_STRING: &[u8] = b"process_string\0";
    pub const FREE_STRING: &[u8] = b"free_rust_string\0";
    pub const FIBONACCI: &[u8] = b"fibonacci\0";
    pub const PROCESS_DATA_WITH_CALLBACK: &[u8] = b"process_data_with_callback\0";
    pub const SUM_WITH_CALLBACK: &[u8] = b"sum_with_callback\0";
}

/// Buffer-with-callback descriptor passed by value across the boundary
///
/// `data` is borrowed for the duration of a single call and never owned.
/// `callback` is invoked synchronously and never stored. A null callback
/// (`None`) is permitted; elements are then processed silently.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DataWithCallback {
    pub data: *const c_int,
    pub length: c_int,
    pub callback: Option<ValueCallback>,
}

impl DataWithCallback {
    /// Build a descriptor over a borrowed slice
    ///
    /// Returns `None` if the slice has more elements than `c_int` can count.
    pub fn from_slice(data: &[i32], callback: Option<ValueCallback>) -> Option<Self> {
        let length = c_int::try_from(data.len()).ok()?;
        let data = if data.is_empty() { ptr::null() } else { data.as_ptr() };
        Some(Self {
            data,
            length,
            callback,
        })
    }

    /// View the described buffer as a slice
    ///
    /// A null `data` pointer or a non-positive `length` yields an empty slice.
    ///
    /// # Safety
    ///
    /// When non-null, `data` must point to at least `length` initialized
    /// elements that stay valid and unmodified for the returned lifetime.
    pub unsafe fn as_slice<'a>(&self) -> &'a [i32] {
        if self.data.is_null() || self.length <= 0 {
            &[]
        } else {
            slice::from_raw_parts(self.data, self.length as usize)
        }
    }
}
