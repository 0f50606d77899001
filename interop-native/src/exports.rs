//! Exported C ABI functions
//!
//! Thin translations between raw boundary values and the safe functions in
//! [`crate::ops`]. Nothing here may panic: unwinding out of an
//! `extern "C"` function aborts the calling process.

use crate::contract::DataWithCallback;
use crate::ops;
use crate::strings;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Substituted for input that is not valid UTF-8
const INVALID_INPUT: &str = "invalid";

/// Add two integers with two's-complement wraparound
#[no_mangle]
pub extern "C" fn add_numbers(a: c_int, b: c_int) -> c_int {
    ops::add(a, b)
}

/// Return a newly allocated, transformed copy of `input`
///
/// The result must be released with [`free_rust_string`]. Returns null only
/// when `input` is null.
///
/// # Safety
///
/// `input` must be null or point to a valid null-terminated string that
/// stays alive for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn process_string(input: *const c_char) -> *mut c_char {
    if input.is_null() {
        log::warn!("process_string called with a null input");
        return ptr::null_mut();
    }

    let text = CStr::from_ptr(input).to_str().unwrap_or(INVALID_INPUT);
    log::trace!("process_string({:?})", text);

    match CString::new(ops::transform_string(text)) {
        Ok(processed) => strings::into_foreign(processed),
        Err(_) => ptr::null_mut(),
    }
}

/// Release a string returned by [`process_string`]; null is a no-op
///
/// # Safety
///
/// `s` must be null or a pointer returned by [`process_string`] that has not
/// been released yet.
#[no_mangle]
pub unsafe extern "C" fn free_rust_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(strings::reclaim(s));
}

/// Fibonacci number `n`, wrapping on 64-bit overflow
#[no_mangle]
pub extern "C" fn fibonacci(n: u32) -> u64 {
    ops::fibonacci(n)
}

/// Double every element and call back with each result, in index order
///
/// Returns the number of elements processed.
///
/// # Safety
///
/// `data_struct.data` must be null or point to `data_struct.length` valid
/// elements for the whole call, and `data_struct.callback` must be null or a
/// valid function for the whole call.
#[no_mangle]
pub unsafe extern "C" fn process_data_with_callback(data_struct: DataWithCallback) -> c_int {
    let data = data_struct.as_slice();
    let callback = data_struct.callback;
    log::debug!("process_data_with_callback: {} element(s)", data.len());

    ops::double_each(data, |value| {
        if let Some(callback) = callback {
            unsafe { callback(value) };
        }
    })
}

/// Call back with the running total after each element, in index order
///
/// Returns the final total.
///
/// # Safety
///
/// Same requirements as [`process_data_with_callback`].
#[no_mangle]
pub unsafe extern "C" fn sum_with_callback(data_struct: DataWithCallback) -> c_int {
    let data = data_struct.as_slice();
    let callback = data_struct.callback;
    log::debug!("sum_with_callback: {} element(s)", data.len());

    ops::running_sum(data, |total| {
        if let Some(callback) = callback {
            unsafe { callback(total) };
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static SEEN: RefCell<Vec<c_int>> = const { RefCell::new(Vec::new()) };
    }

    extern "C" fn record(value: c_int) {
        SEEN.with(|seen| seen.borrow_mut().push(value));
    }

    fn take_seen() -> Vec<c_int> {
        SEEN.with(|seen| seen.borrow_mut().drain(..).collect())
    }

    #[test]
    fn test_process_data_with_callback() {
        let data = [1, 2, 3, 4, 5];
        let descriptor = DataWithCallback::from_slice(&data, Some(record)).unwrap();

        let count = unsafe { process_data_with_callback(descriptor) };
        assert_eq!(count, 5);
        assert_eq!(take_seen(), vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_sum_with_callback() {
        let data = [10, 20, 30, 40];
        let descriptor = DataWithCallback::from_slice(&data, Some(record)).unwrap();

        let total = unsafe { sum_with_callback(descriptor) };
        assert_eq!(total, 100);
        assert_eq!(take_seen(), vec![10, 30, 60, 100]);
    }

    #[test]
    fn test_null_callback_still_processes() {
        let data = [1, 2, 3];
        let descriptor = DataWithCallback::from_slice(&data, None).unwrap();

        assert_eq!(unsafe { process_data_with_callback(descriptor) }, 3);
        assert_eq!(unsafe { sum_with_callback(descriptor) }, 6);
    }

    #[test]
    fn test_process_string_null_input() {
        assert!(unsafe { process_string(ptr::null()) }.is_null());
    }

    #[test]
    fn test_process_string_invalid_utf8() {
        let input = CString::new(vec![0xff, 0xfe]).unwrap();
        let result = unsafe { process_string(input.as_ptr()) };
        assert!(!result.is_null());

        let text = unsafe { CStr::from_ptr(result) }.to_str().unwrap().to_owned();
        unsafe { free_rust_string(result) };
        assert_eq!(text, "Processed: INVALID");
    }
}
