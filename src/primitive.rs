//! Fixed-width transfer primitives.
//!
//! A primitive moves `units` items of exactly one [`Tier`] width and trusts its
//! caller to have checked alignment. The dispatcher never hands a primitive a
//! pointer that fails `tier.align()`; [`Portable`] re-checks this with
//! `debug_assert!` so a selector defect shows up as a panic in debug builds.
//!
//! Platform-tuned implementations (wide FPU pair moves, cache-line blocks,
//! store queues) plug in behind [`TransferPrimitives`] without touching the
//! dispatch logic.
#![allow(unsafe_code)]

use crate::tier::Tier;

/// A fill byte replicated to every word width the primitives store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub byte: u8,
    pub half: u16,
    pub word: u32,
    pub double: u64,
}

impl Pattern {
    pub const ZERO: Pattern = Pattern::splat(0);

    #[inline(always)]
    pub const fn splat(value: u8) -> Pattern {
        Pattern {
            byte: value,
            half: (value as u16) * 0x0101,
            word: (value as u32) * 0x0101_0101,
            double: (value as u64) * 0x0101_0101_0101_0101,
        }
    }
}

/// Tier-keyed bulk transfer capability.
///
/// # Safety
///
/// Every method shares the same contract:
/// - `dst` (and `src` where present) are aligned to `tier.align()`
/// - the regions are valid for `units * tier.width()` bytes
/// - `units == 0` is a no-op
pub trait TransferPrimitives {
    /// Copy `units` units from `src` to `dst`. The regions must not overlap.
    unsafe fn copy_units(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize);

    /// Copy ascending. Must stay correct when the regions overlap with
    /// `dst < src`.
    unsafe fn move_forward(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize);

    /// Copy descending, starting from the last unit of the chunk that begins at
    /// `dst`/`src`. Must stay correct when the regions overlap with `dst > src`.
    unsafe fn move_backward(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize);

    /// Store `pattern` into `units` units at `dst`.
    unsafe fn fill_units(&self, tier: Tier, dst: *mut u8, pattern: &Pattern, units: usize);

    /// Zero `units` units at `dst`.
    ///
    /// Implementations can override this when a zero store is cheaper to set up
    /// than a general pattern store.
    unsafe fn zero_units(&self, tier: Tier, dst: *mut u8, units: usize) {
        // SAFETY: forwarded contract.
        unsafe { self.fill_units(tier, dst, &Pattern::ZERO, units) }
    }
}

impl<T: TransferPrimitives + ?Sized> TransferPrimitives for &T {
    #[inline(always)]
    unsafe fn copy_units(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize) {
        unsafe { (**self).copy_units(tier, dst, src, units) }
    }

    #[inline(always)]
    unsafe fn move_forward(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize) {
        unsafe { (**self).move_forward(tier, dst, src, units) }
    }

    #[inline(always)]
    unsafe fn move_backward(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize) {
        unsafe { (**self).move_backward(tier, dst, src, units) }
    }

    #[inline(always)]
    unsafe fn fill_units(&self, tier: Tier, dst: *mut u8, pattern: &Pattern, units: usize) {
        unsafe { (**self).fill_units(tier, dst, pattern, units) }
    }

    #[inline(always)]
    unsafe fn zero_units(&self, tier: Tier, dst: *mut u8, units: usize) {
        unsafe { (**self).zero_units(tier, dst, units) }
    }
}

// =============================================================================
// PORTABLE PRIMITIVES: aligned word loads and stores
// =============================================================================

/// Word-at-a-time primitives that work on any target.
///
/// Block tiers are `[u64; 2]` and `[u64; 4]` values: the whole block is loaded
/// before any of it is stored, like the paired double moves of a tuned loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Portable;

type Block16 = [u64; 2];
type Block32 = [u64; 4];

macro_rules! per_tier {
    ($tier:expr, $f:ident($($arg:expr),*)) => {
        match $tier {
            Tier::Byte => $f::<u8>($($arg),*),
            Tier::Half => $f::<u16>($($arg),*),
            Tier::Word => $f::<u32>($($arg),*),
            Tier::Double => $f::<u64>($($arg),*),
            Tier::Block16 => $f::<Block16>($($arg),*),
            Tier::Block32 => $f::<Block32>($($arg),*),
        }
    };
}

#[inline(always)]
fn check_aligned(tier: Tier, dst: *const u8, src: *const u8) {
    debug_assert!(
        ((dst as usize) | (src as usize)) & (tier.align() - 1) == 0,
        "misaligned {tier} primitive: dst={dst:p} src={src:p}"
    );
}

#[inline(always)]
unsafe fn ascend<T: Copy>(dst: *mut u8, src: *const u8, units: usize) {
    let d = dst.cast::<T>();
    let s = src.cast::<T>();
    for i in 0..units {
        // SAFETY: caller guarantees alignment to T and `units` valid items.
        // Each unit is fully read before it is written.
        unsafe {
            let v = s.add(i).read();
            d.add(i).write(v);
        }
    }
}

#[inline(always)]
unsafe fn descend<T: Copy>(dst: *mut u8, src: *const u8, units: usize) {
    let d = dst.cast::<T>();
    let s = src.cast::<T>();
    let mut i = units;
    while i > 0 {
        i -= 1;
        // SAFETY: as in `ascend`, walking from the last unit down.
        unsafe {
            let v = s.add(i).read();
            d.add(i).write(v);
        }
    }
}

#[inline(always)]
unsafe fn store<T: Copy>(dst: *mut u8, value: T, units: usize) {
    let d = dst.cast::<T>();
    for i in 0..units {
        // SAFETY: caller guarantees alignment to T and `units` writable items.
        unsafe { d.add(i).write(value) };
    }
}

impl TransferPrimitives for Portable {
    #[inline]
    unsafe fn copy_units(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize) {
        check_aligned(tier, dst, src);
        unsafe { per_tier!(tier, ascend(dst, src, units)) }
    }

    #[inline]
    unsafe fn move_forward(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize) {
        check_aligned(tier, dst, src);
        unsafe { per_tier!(tier, ascend(dst, src, units)) }
    }

    #[inline]
    unsafe fn move_backward(&self, tier: Tier, dst: *mut u8, src: *const u8, units: usize) {
        check_aligned(tier, dst, src);
        unsafe { per_tier!(tier, descend(dst, src, units)) }
    }

    #[inline]
    unsafe fn fill_units(&self, tier: Tier, dst: *mut u8, pattern: &Pattern, units: usize) {
        check_aligned(tier, dst, dst);
        let d = pattern.double;
        unsafe {
            match tier {
                Tier::Byte => store(dst, pattern.byte, units),
                Tier::Half => store(dst, pattern.half, units),
                Tier::Word => store(dst, pattern.word, units),
                Tier::Double => store(dst, d, units),
                Tier::Block16 => store::<Block16>(dst, [d; 2], units),
                Tier::Block32 => store::<Block32>(dst, [d; 4], units),
            }
        }
    }

    #[inline]
    unsafe fn zero_units(&self, tier: Tier, dst: *mut u8, units: usize) {
        check_aligned(tier, dst, dst);
        // Constant stores: no pattern to load per iteration.
        unsafe {
            match tier {
                Tier::Byte => store(dst, 0u8, units),
                Tier::Half => store(dst, 0u16, units),
                Tier::Word => store(dst, 0u32, units),
                Tier::Double => store(dst, 0u64, units),
                Tier::Block16 => store::<Block16>(dst, [0; 2], units),
                Tier::Block32 => store::<Block32>(dst, [0; 4], units),
            }
        }
    }
}
