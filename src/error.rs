//! Error types.
//!
//! The transfer engines themselves never fail at runtime: misaligned primitive
//! calls and overlapping `memcpy` input are debug assertions. The errors here
//! cover configuration, the safe slice wrappers and the benchmark sweep.

use thiserror::Error;

use crate::tier::Tier;

/// Invalid tier ladder or dispatcher configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A ladder entry is not one of the supported tier widths
    #[error("unsupported tier width: {0:?}")]
    UnknownWidth(String),

    /// A ladder must name at least one tier
    #[error("{ladder} ladder is empty")]
    EmptyLadder {
        /// Which engine the ladder belongs to
        ladder: &'static str,
    },

    /// More tiers than exist
    #[error("ladder has {len} entries, at most {max} are allowed")]
    TooManyTiers {
        /// Number of entries supplied
        len: usize,
        /// Maximum ladder length
        max: usize,
    },

    /// Tiers must be listed widest first without repeats
    #[error("{ladder} ladder is not strictly descending at {tier:?}")]
    NotDescending {
        /// Which engine the ladder belongs to
        ladder: &'static str,
        /// First out-of-order tier
        tier: Tier,
    },

    /// The byte tier is the fallback that guarantees progress
    #[error("{ladder} ladder must end with the 1-byte tier")]
    MissingByteTier {
        /// Which engine the ladder belongs to
        ladder: &'static str,
    },

    /// Block primitives are not overlap-safe
    #[error("move ladder cannot use block tier {0:?}")]
    BlockTierInMove(Tier),
}

/// Errors from the safe slice wrappers in [`crate::mem`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemError {
    /// Requested range does not fit inside the buffer
    #[error("range {start}..{end} out of bounds for buffer of {len} bytes")]
    OutOfBounds {
        /// Range start
        start: usize,
        /// Range end (exclusive)
        end: usize,
        /// Buffer length
        len: usize,
    },

    /// Range start is past its end
    #[error("invalid range {start}..{end}")]
    InvalidRange {
        /// Range start
        start: usize,
        /// Range end (exclusive)
        end: usize,
    },
}

/// Errors from a benchmark sweep run.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Rejected sweep configuration
    #[error("invalid sweep config: {0}")]
    Config(String),

    /// Writing the report failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A variant produced bytes different from the reference transformation
    #[error(
        "{variant} {op} mismatch at byte {index}: len {len}, src_off {src_off}, dst_off {dst_off}, expected {expected:#04x}, got {actual:#04x}"
    )]
    Mismatch {
        /// Operation under test
        op: &'static str,
        /// Variant that failed
        variant: &'static str,
        /// Transfer length
        len: usize,
        /// Source offset from the aligned base
        src_off: usize,
        /// Destination offset from the aligned base
        dst_off: usize,
        /// First differing byte, counted from the aligned destination base
        index: usize,
        /// Reference byte
        expected: u8,
        /// Byte the variant produced
        actual: u8,
    },

    /// Dispatcher configuration rejected
    #[error(transparent)]
    Dispatch(#[from] ConfigError),
}
