//! C ABI entry points.
//!
//! Exported under `fastmem_*` names so they never shadow the platform
//! `memcpy`/`memmove`/`memset` the compiler itself emits calls to.
#![allow(unsafe_code)]

use core::ffi::{c_int, c_void};

/// # Safety
///
/// Same contract as [`crate::memcpy::tiered_memcpy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastmem_copy(dst: *mut c_void, src: *const c_void, len: usize) -> *mut c_void {
    unsafe { crate::memcpy::tiered_memcpy(dst.cast(), src.cast(), len) }.cast()
}

/// # Safety
///
/// Same contract as [`crate::memmove::tiered_memmove`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastmem_move(dst: *mut c_void, src: *const c_void, len: usize) -> *mut c_void {
    unsafe { crate::memmove::tiered_memmove(dst.cast(), src.cast(), len) }.cast()
}

/// Only the low byte of `value` is stored, as with C `memset`.
///
/// # Safety
///
/// Same contract as [`crate::memset::tiered_memset`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastmem_fill(dst: *mut c_void, value: c_int, len: usize) -> *mut c_void {
    unsafe { crate::memset::tiered_memset(dst.cast(), value as u8, len) }.cast()
}
