//! Native Interop Library
//!
//! The native side of a host/native boundary, built as both a `cdylib` (for
//! foreign hosts) and an `rlib` (for Rust hosts linking it statically).
//!
//! # Architecture
//!
//! - [`contract`] declares the flat C ABI: the `DataWithCallback` descriptor,
//!   callback and function pointer types, and exported symbol names
//! - [`ops`] holds the safe implementations (wrapping arithmetic, string
//!   transform, buffer walks with a `FnMut` handler)
//! - [`exports`] exposes them as `#[no_mangle] extern "C"` functions
//!
//! The library keeps no state between calls. Debug builds track strings
//! handed to the host so that a double free aborts loudly.
//!
//! # Example Usage
//!
//! ```
//! use interop_native::contract::DataWithCallback;
//! use interop_native::exports::sum_with_callback;
//!
//! extern "C" fn on_total(total: i32) {
//!     println!("running total: {}", total);
//! }
//!
//! let data = [10, 20, 30, 40];
//! let descriptor = DataWithCallback::from_slice(&data, Some(on_total)).unwrap();
//! let total = unsafe { sum_with_callback(descriptor) };
//! assert_eq!(total, 100);
//! ```

// Public modules
pub mod contract;
pub mod exports;
pub mod ops;

mod strings;

// Re-export main types for convenience
pub use contract::{DataWithCallback, ValueCallback};
pub use strings::is_live_string;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
