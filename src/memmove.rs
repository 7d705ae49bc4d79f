//! Alignment-tiered memmove with overlap-aware traversal.
#![allow(unsafe_code)]

use crate::dispatch::{DEFAULT, Dispatcher, overlaps};
use crate::primitive::TransferPrimitives;
use crate::select::select;

/// Traversal order of an overlap-safe move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Low to high addresses.
    Forward,
    /// High to low addresses.
    Backward,
}

impl Direction {
    /// Backward only when `dest` lies above `src` inside the source range;
    /// everything else, disjoint ranges included, goes forward.
    #[inline(always)]
    pub fn choose(dest: usize, src: usize, n: usize) -> Direction {
        if dest > src && overlaps(dest, src, n) {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

/// Overlap-safe copy with the default dispatcher (move ladder `8, 4, 1`).
///
/// # Safety
///
/// - `dest` must be valid for writes and `src` for reads of `n` bytes
/// - Regions may overlap
#[inline]
pub unsafe fn tiered_memmove(dest: *mut u8, src: *const u8, n: usize) -> *mut u8 {
    // SAFETY: forwarded contract.
    unsafe { DEFAULT.memmove(dest, src, n) }
}

impl<P: TransferPrimitives> Dispatcher<P> {
    /// Overlap-safe copy. Returns `dest`.
    ///
    /// The result is the same as copying `src` into a scratch buffer first.
    /// Backward moves select tiers on the end addresses of the unconsumed
    /// range and retreat both cursors together.
    ///
    /// # Safety
    ///
    /// - `dest` must be valid for writes and `src` for reads of `n` bytes
    /// - Regions may overlap
    pub unsafe fn memmove(&self, dest: *mut u8, src: *const u8, n: usize) -> *mut u8 {
        if n == 0 || core::ptr::eq(dest as *const u8, src) {
            return dest;
        }

        let ladder = self.config.moves.as_slice();
        let mut remaining = n;

        match Direction::choose(dest as usize, src as usize, n) {
            Direction::Forward => {
                let mut d = dest;
                let mut s = src;
                while remaining > 0 {
                    let sel = select(s as usize, d as usize, remaining, ladder);
                    log::trace!("memmove fwd {} x{} at {:p}", sel.tier, sel.units(), d);
                    // SAFETY: aligned run inside both regions; writes stay
                    // below the next unread source byte when dest < src.
                    unsafe {
                        self.prims.move_forward(sel.tier, d, s, sel.units());
                        d = d.add(sel.consumed);
                        s = s.add(sel.consumed);
                    }
                    remaining -= sel.consumed;
                }
            }
            Direction::Backward => {
                // SAFETY: one past the end of regions valid for `n` bytes.
                let (mut d, mut s) = unsafe { (dest.add(n), src.add(n)) };
                while remaining > 0 {
                    // End and chunk start share alignment: `consumed` is a
                    // multiple of the tier width.
                    let sel = select(s as usize, d as usize, remaining, ladder);
                    // SAFETY: the chunk `[d - consumed, d)` lies inside the
                    // destination; every source byte above it was read already.
                    unsafe {
                        d = d.sub(sel.consumed);
                        s = s.sub(sel.consumed);
                        log::trace!("memmove bwd {} x{} at {:p}", sel.tier, sel.units(), d);
                        self.prims.move_backward(sel.tier, d, s, sel.units());
                    }
                    remaining -= sel.consumed;
                }
            }
        }

        dest
    }
}
