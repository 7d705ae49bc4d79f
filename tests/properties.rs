//! Property-based tests for the tiered transfer engines
//!
//! Every engine is checked against the plain byte-level transformation it
//! stands in for: slice copies, `copy_within` and `slice::fill`.

use fastmem::dispatch::Dispatcher;
use fastmem::primitive::Portable;
use fastmem::tier::Ladder;
use fastmem::{DispatchConfig, mem, tiered_memcpy, tiered_memmove, tiered_memset};
use proptest::prelude::*;

// =============================================================================
// HELPERS
// =============================================================================

const GUARD: u8 = 0xEE;
const SLACK: usize = 64;

/// Byte buffer with a 32-byte aligned base and guard-filled slack on both sides.
struct Arena {
    buf: Vec<u8>,
    base: usize,
}

impl Arena {
    fn new(len: usize) -> Self {
        let buf = vec![GUARD; len + 3 * SLACK];
        let base = SLACK + buf[SLACK..].as_ptr().align_offset(32);
        Self { buf, base }
    }

    fn ptr(&mut self, off: usize) -> *mut u8 {
        unsafe { self.buf.as_mut_ptr().add(self.base + off) }
    }

    fn window(&self, off: usize, len: usize) -> &[u8] {
        &self.buf[self.base + off..self.base + off + len]
    }

    fn untouched_outside(&self, off: usize, len: usize) -> bool {
        let start = self.base + off;
        self.buf[..start].iter().all(|&b| b == GUARD)
            && self.buf[start + len..].iter().all(|&b| b == GUARD)
    }
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

fn copy_ladder_strategy() -> impl Strategy<Value = Ladder> {
    prop_oneof![
        Just("32,8,4,2,1"),
        Just("32,16,8,4,2,1"),
        Just("16,8,1"),
        Just("8,4,2,1"),
        Just("4,1"),
        Just("1"),
    ]
    .prop_map(|s| s.parse::<Ladder>().unwrap())
}

fn move_ladder_strategy() -> impl Strategy<Value = Ladder> {
    prop_oneof![Just("8,4,1"), Just("8,4,2,1"), Just("4,2,1"), Just("2,1"), Just("1")]
        .prop_map(|s| s.parse::<Ladder>().unwrap())
}

// =============================================================================
// COPY
// =============================================================================

proptest! {
    #[test]
    fn prop_copy_matches_source(
        data in prop::collection::vec(any::<u8>(), 0..600),
        src_off in 0usize..8,
        dst_off in 0usize..8,
    ) {
        let len = data.len();
        let mut src = Arena::new(len);
        let mut dst = Arena::new(len);
        unsafe { core::ptr::copy_nonoverlapping(data.as_ptr(), src.ptr(src_off), len) };

        let ret = unsafe { tiered_memcpy(dst.ptr(dst_off), src.ptr(src_off), len) };

        prop_assert_eq!(ret, dst.ptr(dst_off));
        prop_assert_eq!(dst.window(dst_off, len), &data[..]);
        prop_assert!(dst.untouched_outside(dst_off, len));
        prop_assert_eq!(src.window(src_off, len), &data[..]);
    }

    #[test]
    fn prop_copy_ladder_does_not_change_result(
        ladder in copy_ladder_strategy(),
        len in 0usize..300,
        src_off in 0usize..8,
        dst_off in 0usize..8,
    ) {
        let engine = Dispatcher::with_config(Portable, DispatchConfig::default().with_copy(ladder)).unwrap();
        let data = pattern(len);
        let mut src = Arena::new(len);
        let mut dst = Arena::new(len);
        unsafe { core::ptr::copy_nonoverlapping(data.as_ptr(), src.ptr(src_off), len) };

        unsafe { engine.memcpy(dst.ptr(dst_off), src.ptr(src_off), len) };

        prop_assert_eq!(dst.window(dst_off, len), &data[..]);
        prop_assert!(dst.untouched_outside(dst_off, len));
    }
}

// =============================================================================
// MOVE
// =============================================================================

proptest! {
    #[test]
    fn prop_move_matches_copy_within(
        len in 1usize..400,
        start in 0usize..400,
        count in 0usize..400,
        dest in 0usize..400,
    ) {
        let start = start % len;
        let count = count % (len - start + 1);
        let dest = dest % (len - count + 1);

        let mut expected = pattern(len);
        expected.copy_within(start..start + count, dest);

        let mut buf = pattern(len);
        prop_assert_eq!(mem::move_within(&mut buf, start..start + count, dest), Ok(count));
        prop_assert_eq!(buf, expected);
    }

    #[test]
    fn prop_move_every_overlap_offset(
        ladder in move_ladder_strategy(),
        len in 1usize..200,
        delta in 1usize..40,
        upward in any::<bool>(),
    ) {
        let engine = Dispatcher::with_config(Portable, DispatchConfig::default().with_move(ladder)).unwrap();
        let total = len + delta;
        let mut arena = Arena::new(total);
        let data = pattern(total);
        unsafe { core::ptr::copy_nonoverlapping(data.as_ptr(), arena.ptr(0), total) };

        let (src_off, dst_off) = if upward { (0, delta) } else { (delta, 0) };
        let mut expected = data.clone();
        expected.copy_within(src_off..src_off + len, dst_off);

        unsafe { engine.memmove(arena.ptr(dst_off), arena.ptr(src_off), len) };

        prop_assert_eq!(arena.window(0, total), &expected[..]);
        prop_assert!(arena.untouched_outside(0, total));
    }

    #[test]
    fn prop_move_equals_copy_when_disjoint(
        data in prop::collection::vec(any::<u8>(), 0..300),
        src_off in 0usize..8,
        dst_off in 0usize..8,
    ) {
        let len = data.len();
        let mut src = Arena::new(len);
        let mut by_copy = Arena::new(len);
        let mut by_move = Arena::new(len);
        unsafe {
            core::ptr::copy_nonoverlapping(data.as_ptr(), src.ptr(src_off), len);
            tiered_memcpy(by_copy.ptr(dst_off), src.ptr(src_off), len);
            tiered_memmove(by_move.ptr(dst_off), src.ptr(src_off), len);
        }

        prop_assert_eq!(by_move.window(dst_off, len), by_copy.window(dst_off, len));
        prop_assert!(by_move.untouched_outside(dst_off, len));
    }
}

// =============================================================================
// FILL
// =============================================================================

proptest! {
    #[test]
    fn prop_fill_sets_exactly_the_range(
        len in 0usize..600,
        dst_off in 0usize..8,
        value in any::<u8>(),
    ) {
        let mut arena = Arena::new(len);
        let ret = unsafe { tiered_memset(arena.ptr(dst_off), value, len) };

        prop_assert_eq!(ret, arena.ptr(dst_off));
        prop_assert!(arena.window(dst_off, len).iter().all(|&b| b == value));
        prop_assert!(arena.untouched_outside(dst_off, len));
    }

    #[test]
    fn prop_fill_is_idempotent(
        data in prop::collection::vec(any::<u8>(), 0..300),
        value in any::<u8>(),
    ) {
        let mut once = data.clone();
        mem::fill(&mut once, value);
        let mut twice = once.clone();
        mem::fill(&mut twice, value);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_zero_fill_independent_of_ladder(
        len in 0usize..300,
        dst_off in 0usize..8,
    ) {
        // A ladder without the 8-byte tier still has to clear every byte.
        let ladder: Ladder = "4,2,1".parse().unwrap();
        let narrow = Dispatcher::with_config(Portable, DispatchConfig::default().with_fill(ladder)).unwrap();

        let mut zeroed = Arena::new(len);
        let mut narrow_zeroed = Arena::new(len);
        unsafe {
            tiered_memset(zeroed.ptr(dst_off), 0, len);
            narrow.memset(narrow_zeroed.ptr(dst_off), 0, len);
        }

        prop_assert!(zeroed.window(dst_off, len).iter().all(|&b| b == 0));
        prop_assert_eq!(zeroed.window(dst_off, len), narrow_zeroed.window(dst_off, len));
        prop_assert!(zeroed.untouched_outside(dst_off, len));
        prop_assert!(narrow_zeroed.untouched_outside(dst_off, len));
    }
}

// =============================================================================
// BOUNDARIES AND NO-OPS
// =============================================================================

const GRID_LENGTHS: [usize; 14] = [0, 1, 2, 3, 4, 7, 8, 9, 15, 16, 17, 31, 32, 33];
const GRID_ALIGNMENTS: [usize; 4] = [0, 1, 2, 4];

#[test]
fn test_boundary_grid() {
    for len in GRID_LENGTHS {
        for src_off in GRID_ALIGNMENTS {
            for dst_off in GRID_ALIGNMENTS {
                let data = pattern(len);
                let mut src = Arena::new(len);
                let mut dst = Arena::new(len);
                unsafe {
                    core::ptr::copy_nonoverlapping(data.as_ptr(), src.ptr(src_off), len);
                    tiered_memcpy(dst.ptr(dst_off), src.ptr(src_off), len);
                }
                assert_eq!(dst.window(dst_off, len), &data[..], "copy len {len} s{src_off} d{dst_off}");
                assert!(dst.untouched_outside(dst_off, len));

                let mut moved = Arena::new(len);
                unsafe { tiered_memmove(moved.ptr(dst_off), src.ptr(src_off), len) };
                assert_eq!(moved.window(dst_off, len), &data[..], "move len {len} s{src_off} d{dst_off}");
            }

            let mut filled = Arena::new(len);
            unsafe { tiered_memset(filled.ptr(src_off), 0xC3, len) };
            assert!(filled.window(src_off, len).iter().all(|&b| b == 0xC3), "fill len {len} d{src_off}");
            assert!(filled.untouched_outside(src_off, len));
        }
    }
}

#[test]
fn test_noops() {
    let mut arena = Arena::new(32);
    unsafe { core::ptr::copy_nonoverlapping(pattern(32).as_ptr(), arena.ptr(0), 32) };
    let before = arena.buf.clone();

    let p = arena.ptr(3);
    unsafe {
        assert_eq!(tiered_memcpy(p, p, 29), p);
        assert_eq!(tiered_memmove(p, p, 29), p);
        assert_eq!(tiered_memcpy(p, arena.ptr(9), 0), p);
        assert_eq!(tiered_memmove(p, arena.ptr(1), 0), p);
        assert_eq!(tiered_memset(p, 0xFF, 0), p);
    }
    assert_eq!(arena.buf, before);

    let dangling = core::ptr::NonNull::<u8>::dangling().as_ptr();
    unsafe {
        assert_eq!(tiered_memcpy(dangling, dangling, 0), dangling);
        assert_eq!(tiered_memset(dangling, 1, 0), dangling);
    }
}

#[test]
fn test_slice_wrappers_reject_bad_ranges() {
    let mut buf = [0u8; 8];
    assert!(mem::move_within(&mut buf, 4..9, 0).is_err());
    assert!(mem::move_within(&mut buf, 0..4, 5).is_err());
    #[allow(clippy::reversed_empty_ranges)]
    let backwards = 5..2;
    assert!(mem::move_within(&mut buf, backwards, 0).is_err());
    assert_eq!(mem::copy(&mut buf, b"abc"), 3);
    assert_eq!(&buf[..3], b"abc");
}
