//! Clocks and interrupt masking for the benchmark sweep.

use std::time::Instant;

/// Nanosecond time source.
pub trait Clock {
    fn now_ns(&self) -> u64;
}

/// Wall clock backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        // Saturates after ~584 years.
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Keeps preemption out of a measured interval.
///
/// Interrupts stay masked until the returned guard is dropped. Masking only
/// reduces timing jitter; transfers are correct either way.
pub trait InterruptMask {
    type Guard;

    fn mask(&self) -> Self::Guard;
}

/// Hosted targets cannot mask interrupts from user space.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMask;

impl InterruptMask for NoMask {
    type Guard = ();

    #[inline]
    fn mask(&self) -> Self::Guard {}
}
