//! The adaptive dispatcher shared by the copy, move and fill engines.
//!
//! A [`Dispatcher`] is a set of transfer primitives plus one tier ladder per
//! engine. The engines themselves live in [`crate::memcpy`], [`crate::memmove`]
//! and [`crate::memset`] as inherent methods.

use crate::error::ConfigError;
use crate::primitive::{Portable, TransferPrimitives};
use crate::tier::Ladder;

/// Tier ladders used by each engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub copy: Ladder,
    pub moves: Ladder,
    pub fill: Ladder,
}

impl DispatchConfig {
    pub const fn reference() -> Self {
        Self {
            copy: Ladder::COPY,
            moves: Ladder::MOVE,
            fill: Ladder::FILL,
        }
    }

    pub fn with_copy(mut self, ladder: Ladder) -> Self {
        self.copy = ladder;
        self
    }

    pub fn with_move(mut self, ladder: Ladder) -> Self {
        self.moves = ladder;
        self
    }

    pub fn with_fill(mut self, ladder: Ladder) -> Self {
        self.fill = ladder;
        self
    }

    /// Every ladder must be strictly descending and end at the byte tier;
    /// the move ladder may not contain block tiers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.copy.check("copy")?;
        self.moves.check("move")?;
        self.fill.check("fill")?;
        if let Some(&tier) = self.moves.as_slice().iter().find(|t| t.is_block()) {
            return Err(ConfigError::BlockTierInMove(tier));
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Copy, move and fill engines over one set of primitives.
///
/// Holds no mutable state; calls on disjoint regions may run concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<P = Portable> {
    pub(crate) prims: P,
    pub(crate) config: DispatchConfig,
}

/// Dispatcher used by the free functions `tiered_memcpy` and friends.
pub static DEFAULT: Dispatcher = Dispatcher::new();

impl Dispatcher<Portable> {
    /// Portable primitives with the reference ladders.
    pub const fn new() -> Self {
        Self {
            prims: Portable,
            config: DispatchConfig::reference(),
        }
    }
}

impl Default for Dispatcher<Portable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TransferPrimitives> Dispatcher<P> {
    pub fn with_config(prims: P, config: DispatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "dispatcher ladders: copy [{}], move [{}], fill [{}]",
            config.copy,
            config.moves,
            config.fill
        );
        Ok(Self { prims, config })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn primitives(&self) -> &P {
        &self.prims
    }
}

/// Whether `[a, a + n)` and `[b, b + n)` share any byte.
#[inline(always)]
pub(crate) fn overlaps(a: usize, b: usize, n: usize) -> bool {
    a.abs_diff(b) < n
}
