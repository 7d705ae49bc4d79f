//! Granularity selection.

use crate::tier::Tier;

/// Tier chosen for the next run and how many bytes that run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub tier: Tier,
    /// Largest multiple of `tier.width()` not exceeding the remaining length.
    pub consumed: usize,
}

impl Selection {
    /// Number of primitive units in the run.
    #[inline(always)]
    pub fn units(&self) -> usize {
        self.consumed / self.tier.width()
    }
}

/// Pick the widest tier in `ladder` both addresses are aligned for and that
/// still fits in `remaining`, falling back to single bytes.
///
/// One selection accounts for the whole aligned run. The cursors advance by a
/// multiple of the tier width, so their alignment cannot change mid-run.
/// Callers short-circuit `remaining == 0`.
#[inline(always)]
pub fn select(src: usize, dst: usize, remaining: usize, ladder: &[Tier]) -> Selection {
    debug_assert!(remaining > 0, "select called with nothing left to move");

    let mask = src | dst;
    let tier = ladder
        .iter()
        .copied()
        .find(|t| mask & (t.align() - 1) == 0 && remaining >= t.width())
        .unwrap_or(Tier::Byte);

    Selection {
        tier,
        consumed: remaining - remaining % tier.width(),
    }
}
