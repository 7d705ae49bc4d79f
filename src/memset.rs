//! Alignment-tiered memset with a dedicated zero path.
#![allow(unsafe_code)]

use crate::dispatch::{DEFAULT, Dispatcher};
use crate::primitive::{Pattern, TransferPrimitives};
use crate::select::select;
use crate::tier::Tier;

/// Fill `n` bytes at `dest` with `value` using the default dispatcher.
///
/// # Safety
///
/// - `dest` must be valid for writes of `n` bytes
#[inline]
pub unsafe fn tiered_memset(dest: *mut u8, value: u8, n: usize) -> *mut u8 {
    // SAFETY: forwarded contract.
    unsafe { DEFAULT.memset(dest, value, n) }
}

impl<P: TransferPrimitives> Dispatcher<P> {
    /// Store `value` into every byte of `[dest, dest + n)`. Returns `dest`.
    ///
    /// The zero and nonzero paths are picked once, up front. Both tier on the
    /// destination alignment alone and produce identical bytes for zero.
    ///
    /// # Safety
    ///
    /// - `dest` must be valid for writes of `n` bytes
    pub unsafe fn memset(&self, dest: *mut u8, value: u8, n: usize) -> *mut u8 {
        if n == 0 {
            return dest;
        }

        if value == 0 {
            // SAFETY: forwarded contract.
            unsafe {
                self.fill_runs(dest, n, |tier, d, units| {
                    self.prims.zero_units(tier, d, units)
                })
            }
        } else {
            let pattern = Pattern::splat(value);
            unsafe {
                self.fill_runs(dest, n, |tier, d, units| {
                    self.prims.fill_units(tier, d, &pattern, units)
                })
            }
        }

        dest
    }

    /// Walk `[dest, dest + n)` in selector-sized runs, handing each to `store`.
    #[inline(always)]
    unsafe fn fill_runs<F>(&self, dest: *mut u8, n: usize, mut store: F)
    where
        F: FnMut(Tier, *mut u8, usize),
    {
        let ladder = self.config.fill.as_slice();
        let mut d = dest;
        let mut remaining = n;

        while remaining > 0 {
            let sel = select(d as usize, d as usize, remaining, ladder);
            log::trace!("memset {} x{} at {:p}", sel.tier, sel.units(), d);
            store(sel.tier, d, sel.units());
            // SAFETY: `sel.consumed <= remaining`.
            d = unsafe { d.add(sel.consumed) };
            remaining -= sel.consumed;
        }
    }
}
