//! Transfer granularities, alignment classes and tier ladders.

use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;

/// Widest natural word; block tiers only require this much alignment.
pub const MAX_ALIGN: usize = 8;

/// Number of bytes moved per unit by a transfer primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tier {
    Byte = 1,
    Half = 2,
    Word = 4,
    Double = 8,
    Block16 = 16,
    Block32 = 32,
}

impl Tier {
    /// Every tier, widest first.
    pub const ALL: [Tier; 6] = [
        Tier::Block32,
        Tier::Block16,
        Tier::Double,
        Tier::Word,
        Tier::Half,
        Tier::Byte,
    ];

    /// Bytes per unit.
    #[inline(always)]
    pub const fn width(self) -> usize {
        self as usize
    }

    /// Alignment both pointers need before this tier may be used.
    #[inline(always)]
    pub const fn align(self) -> usize {
        if self.width() > MAX_ALIGN {
            MAX_ALIGN
        } else {
            self.width()
        }
    }

    /// Multi-word block tiers built from several `u64` moves.
    #[inline(always)]
    pub const fn is_block(self) -> bool {
        self.width() > MAX_ALIGN
    }

    pub const fn from_width(width: usize) -> Option<Tier> {
        match width {
            1 => Some(Tier::Byte),
            2 => Some(Tier::Half),
            4 => Some(Tier::Word),
            8 => Some(Tier::Double),
            16 => Some(Tier::Block16),
            32 => Some(Tier::Block32),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.width())
    }
}

/// Largest of {1, 2, 4, 8} that divides `addr`.
///
/// Address zero is treated as maximally aligned.
#[inline(always)]
pub const fn alignment_class(addr: usize) -> usize {
    let tz = addr.trailing_zeros();
    // MAX_ALIGN == 1 << 3
    if tz >= 3 { MAX_ALIGN } else { 1 << tz }
}

/// Ordered set of tiers one engine may use, widest first, ending at
/// [`Tier::Byte`].
///
/// Stored inline so a ladder is `Copy` and can live in a `const`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ladder {
    tiers: [Tier; 6],
    len: u8,
}

impl Ladder {
    /// Reference copy ladder: 32-byte blocks, then 8, 4, 2, 1.
    pub const COPY: Ladder = Ladder::from_array([
        Tier::Block32,
        Tier::Double,
        Tier::Word,
        Tier::Half,
        Tier::Byte,
    ]);

    /// Reference move ladder. No block tiers: those are not overlap-safe.
    pub const MOVE: Ladder = Ladder::from_array([Tier::Double, Tier::Word, Tier::Byte]);

    /// Reference fill ladder.
    pub const FILL: Ladder = Ladder::from_array([Tier::Double, Tier::Word, Tier::Byte]);

    const fn from_array<const N: usize>(src: [Tier; N]) -> Ladder {
        let mut tiers = [Tier::Byte; 6];
        let mut i = 0;
        while i < N {
            tiers[i] = src[i];
            i += 1;
        }
        Ladder {
            tiers,
            len: N as u8,
        }
    }

    /// Build a ladder from a tier list. Only the length is checked here;
    /// ordering rules are enforced by [`Ladder::check`].
    pub fn new(src: &[Tier]) -> Result<Ladder, ConfigError> {
        if src.len() > Tier::ALL.len() {
            return Err(ConfigError::TooManyTiers {
                len: src.len(),
                max: Tier::ALL.len(),
            });
        }
        let mut tiers = [Tier::Byte; 6];
        tiers[..src.len()].copy_from_slice(src);
        Ok(Ladder {
            tiers,
            len: src.len() as u8,
        })
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Tier] {
        &self.tiers[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Non-empty, strictly descending, terminated by the byte tier.
    pub fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        let tiers = self.as_slice();
        let Some(last) = tiers.last() else {
            return Err(ConfigError::EmptyLadder { ladder: name });
        };
        for pair in tiers.windows(2) {
            if pair[1] >= pair[0] {
                return Err(ConfigError::NotDescending {
                    ladder: name,
                    tier: pair[1],
                });
            }
        }
        if *last != Tier::Byte {
            return Err(ConfigError::MissingByteTier { ladder: name });
        }
        Ok(())
    }
}

impl fmt::Debug for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl fmt::Display for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tier) in self.as_slice().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", tier.width())?;
        }
        Ok(())
    }
}

/// Parses comma-separated widths such as `"32,8,4,2,1"`.
impl FromStr for Ladder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tiers = Vec::with_capacity(Tier::ALL.len());
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let tier = part
                .parse::<usize>()
                .ok()
                .and_then(Tier::from_width)
                .ok_or_else(|| ConfigError::UnknownWidth(part.to_string()))?;
            tiers.push(tier);
        }
        Ladder::new(&tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_class() {
        assert_eq!(alignment_class(0), 8);
        assert_eq!(alignment_class(1), 1);
        assert_eq!(alignment_class(2), 2);
        assert_eq!(alignment_class(6), 2);
        assert_eq!(alignment_class(12), 4);
        assert_eq!(alignment_class(0x1000), 8);
        assert_eq!(alignment_class(0x1003), 1);
        assert_eq!(alignment_class(usize::MAX - 1), 2);
    }

    #[test]
    fn test_tier_alignment() {
        assert_eq!(Tier::Block32.align(), 8);
        assert_eq!(Tier::Block16.align(), 8);
        assert_eq!(Tier::Double.align(), 8);
        assert_eq!(Tier::Half.align(), 2);
        assert!(Tier::Block16.is_block());
        assert!(!Tier::Double.is_block());
        for tier in Tier::ALL {
            assert_eq!(Tier::from_width(tier.width()), Some(tier));
        }
        assert_eq!(Tier::from_width(3), None);
    }

    #[test]
    fn test_reference_ladders_are_valid() {
        Ladder::COPY.check("copy").unwrap();
        Ladder::MOVE.check("move").unwrap();
        Ladder::FILL.check("fill").unwrap();
        assert_eq!(Ladder::COPY.to_string(), "32,8,4,2,1");
        assert_eq!(Ladder::MOVE.to_string(), "8,4,1");
    }

    #[test]
    fn test_ladder_parse() {
        let ladder: Ladder = "16, 8,2,1".parse().unwrap();
        assert_eq!(
            ladder.as_slice(),
            &[Tier::Block16, Tier::Double, Tier::Half, Tier::Byte]
        );
        assert_eq!(
            "8,3,1".parse::<Ladder>(),
            Err(ConfigError::UnknownWidth("3".to_string()))
        );
        assert!(matches!(
            "1,1,1,1,1,1,1".parse::<Ladder>(),
            Err(ConfigError::TooManyTiers { len: 7, .. })
        ));
    }

    #[test]
    fn test_ladder_check_rejects() {
        let empty: Ladder = "".parse().unwrap();
        assert!(empty.is_empty());
        assert_eq!(
            empty.check("copy"),
            Err(ConfigError::EmptyLadder { ladder: "copy" })
        );

        let unordered: Ladder = "4,8,1".parse().unwrap();
        assert_eq!(
            unordered.check("copy"),
            Err(ConfigError::NotDescending {
                ladder: "copy",
                tier: Tier::Double
            })
        );

        let repeated: Ladder = "8,8,1".parse().unwrap();
        assert!(matches!(
            repeated.check("fill"),
            Err(ConfigError::NotDescending { .. })
        ));

        let no_byte: Ladder = "8,4".parse().unwrap();
        assert_eq!(
            no_byte.check("fill"),
            Err(ConfigError::MissingByteTier { ladder: "fill" })
        );
    }
}
