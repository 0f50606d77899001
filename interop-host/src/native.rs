//! Safe façade over the native function table
//!
//! Every method upholds the boundary preconditions before crossing:
//! strings are NUL-checked, buffers are borrowed for exactly one call and
//! length-checked, closures are bridged through [`crate::callbacks`], and
//! foreign-allocated results are released through the table they came from.

use crate::bindings::FunctionTable;
use crate::callbacks;
use crate::error::{BoundaryError, Result};
use interop_native::contract::{BufferCallbackFn, DataWithCallback, FreeStringFn};
use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::ptr;

/// A string allocated by the native library and owned by the host
///
/// Released exactly once through the native `free_rust_string`, either
/// explicitly with [`ForeignString::release`] or on drop.
pub struct ForeignString<'t> {
    ptr: *mut c_char,
    free: FreeStringFn,
    _table: PhantomData<&'t FunctionTable>,
}

impl<'t> ForeignString<'t> {
    /// Take ownership of a native string; `None` for a null pointer
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must have been returned by the `process_string` of
    /// the same table `free` comes from, and must not be released elsewhere.
    unsafe fn from_raw(ptr: *mut c_char, free: FreeStringFn) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self {
                ptr,
                free,
                _table: PhantomData,
            })
        }
    }

    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: non-null and owned by us until release
        unsafe { CStr::from_ptr(self.ptr) }
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.as_c_str().to_string_lossy()
    }

    #[cfg(test)]
    fn as_ptr(&self) -> *const c_char {
        self.ptr
    }

    /// Hand the string back to the native allocator
    pub fn release(mut self) {
        self.release_in_place();
    }

    fn release_in_place(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        // SAFETY: `ptr` came from this table's process_string and is
        // tombstoned right after, so it is freed at most once.
        unsafe { (self.free)(self.ptr) };
        self.ptr = ptr::null_mut();
    }
}

impl Drop for ForeignString<'_> {
    fn drop(&mut self) {
        self.release_in_place();
    }
}

/// Safe interface to one native function table
#[derive(Debug, Clone, Copy)]
pub struct NativeApi<'t> {
    table: &'t FunctionTable,
}

impl<'t> NativeApi<'t> {
    pub fn new(table: &'t FunctionTable) -> Self {
        Self { table }
    }

    /// Two's-complement wrapping addition performed by the native side
    pub fn add(&self, a: i32, b: i32) -> i32 {
        let sum = unsafe { (self.table.add_numbers)(a, b) };
        log::debug!("add_numbers({}, {}) = {}", a, b, sum);
        sum
    }

    /// Transform `input` natively and keep the result as a foreign string
    pub fn process_string_foreign(&self, input: &str) -> Result<ForeignString<'t>> {
        let input = CString::new(input).map_err(|e| BoundaryError::InteriorNul {
            position: e.nul_position(),
        })?;

        // `input` outlives the call; the result is ours to release
        unsafe {
            let raw = (self.table.process_string)(input.as_ptr());
            ForeignString::from_raw(raw, self.table.free_string).ok_or(BoundaryError::NullString)
        }
    }

    /// Transform `input` natively and copy the result into a `String`
    pub fn process_string(&self, input: &str) -> Result<String> {
        let foreign = self.process_string_foreign(input)?;
        let processed = foreign.to_string_lossy().into_owned();
        foreign.release();
        log::debug!("process_string({:?}) = {:?}", input, processed);
        Ok(processed)
    }

    /// Fibonacci number `n`, wrapping on 64-bit overflow
    pub fn fibonacci(&self, n: u32) -> u64 {
        let fib = unsafe { (self.table.fibonacci)(n) };
        log::debug!("fibonacci({}) = {}", n, fib);
        fib
    }

    /// Have the native side double every element, calling `on_value` with
    /// each doubled value in index order
    ///
    /// Returns the number of elements processed.
    pub fn process_buffer<F>(&self, data: &[i32], on_value: F) -> Result<i32>
    where
        F: FnMut(i32),
    {
        self.call_with_buffer(self.table.process_data_with_callback, data, on_value)
    }

    /// Have the native side sum the buffer, calling `on_total` with the
    /// running total after each element
    ///
    /// Returns the final total.
    pub fn sum_buffer<F>(&self, data: &[i32], on_total: F) -> Result<i32>
    where
        F: FnMut(i32),
    {
        self.call_with_buffer(self.table.sum_with_callback, data, on_total)
    }

    fn call_with_buffer<F>(
        &self,
        function: BufferCallbackFn,
        data: &[i32],
        handler: F,
    ) -> Result<i32>
    where
        F: FnMut(i32),
    {
        let descriptor = DataWithCallback::from_slice(data, Some(callbacks::dispatch))
            .ok_or(BoundaryError::BufferTooLarge { len: data.len() })?;
        log::trace!("Crossing boundary with {} element(s)", data.len());

        // `data` is borrowed for the whole call and the handler stays
        // registered until the call returns
        callbacks::with_handler(handler, || unsafe { function(descriptor) })
    }
}
