//! Alignment-tiered memcpy.
#![allow(unsafe_code)]

use crate::dispatch::{DEFAULT, Dispatcher, overlaps};
use crate::primitive::TransferPrimitives;
use crate::select::select;

/// Copy `n` bytes with the default dispatcher (portable primitives, copy
/// ladder `32, 8, 4, 2, 1`).
///
/// # Safety
///
/// - `dest` must be valid for writes and `src` for reads of `n` bytes
/// - The memory regions must not overlap unless `dest == src`
#[inline]
pub unsafe fn tiered_memcpy(dest: *mut u8, src: *const u8, n: usize) -> *mut u8 {
    // SAFETY: forwarded contract.
    unsafe { DEFAULT.memcpy(dest, src, n) }
}

impl<P: TransferPrimitives> Dispatcher<P> {
    /// Non-overlapping copy. Returns `dest`.
    ///
    /// Each pass asks the selector for the widest tier the current cursors
    /// allow, hands the whole aligned run to the primitive, then re-selects on
    /// the tail. Identical pointers are a no-op.
    ///
    /// # Safety
    ///
    /// - `dest` must be valid for writes and `src` for reads of `n` bytes
    /// - The memory regions must not overlap unless `dest == src`; use
    ///   [`Dispatcher::memmove`] for overlapping ranges
    pub unsafe fn memcpy(&self, dest: *mut u8, src: *const u8, n: usize) -> *mut u8 {
        if n == 0 || core::ptr::eq(dest as *const u8, src) {
            return dest;
        }
        debug_assert!(
            !overlaps(dest as usize, src as usize, n),
            "memcpy on overlapping regions: dest={dest:p} src={src:p} n={n}"
        );

        let ladder = self.config.copy.as_slice();
        let mut d = dest;
        let mut s = src;
        let mut remaining = n;

        while remaining > 0 {
            let sel = select(s as usize, d as usize, remaining, ladder);
            log::trace!("memcpy {} x{} at {:p}", sel.tier, sel.units(), d);
            // SAFETY: `sel.tier` is aligned for both cursors and
            // `sel.consumed <= remaining`, so the run stays inside the caller's
            // regions.
            unsafe {
                self.prims.copy_units(sel.tier, d, s, sel.units());
                d = d.add(sel.consumed);
                s = s.add(sel.consumed);
            }
            remaining -= sel.consumed;
        }

        dest
    }
}
