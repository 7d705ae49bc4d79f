//! Safe slice wrappers over the tiered engines.

use core::ops::Range;

use crate::error::MemError;

/// Copy bytes from source to destination.
///
/// Copies `min(dest.len(), src.len())` bytes and returns that count. Two
/// slices borrowed like this can never overlap, so the copy engine is always
/// sound here.
///
/// # Examples
/// ```
/// use fastmem::mem::copy;
/// let mut dest = [0u8; 5];
/// assert_eq!(copy(&mut dest, b"hello"), 5);
/// assert_eq!(&dest, b"hello");
/// ```
pub fn copy(dest: &mut [u8], src: &[u8]) -> usize {
    let n = dest.len().min(src.len());
    // SAFETY: both slices are valid for `n` bytes and cannot alias.
    unsafe { crate::memcpy::tiered_memcpy(dest.as_mut_ptr(), src.as_ptr(), n) };
    n
}

/// Move `buf[src]` to start at `buf[dest]`, handling overlap.
///
/// Returns the number of bytes moved.
///
/// # Examples
/// ```
/// use fastmem::mem::move_within;
/// let mut buf = *b"abcdef";
/// assert_eq!(move_within(&mut buf, 0..4, 2), Ok(4));
/// assert_eq!(&buf, b"ababcd");
/// ```
pub fn move_within(buf: &mut [u8], src: Range<usize>, dest: usize) -> Result<usize, MemError> {
    let Range { start, end } = src;
    if start > end {
        return Err(MemError::InvalidRange { start, end });
    }
    if end > buf.len() {
        return Err(MemError::OutOfBounds {
            start,
            end,
            len: buf.len(),
        });
    }
    let n = end - start;
    if dest > buf.len() - n {
        return Err(MemError::OutOfBounds {
            start: dest,
            end: dest.saturating_add(n),
            len: buf.len(),
        });
    }

    let base = buf.as_mut_ptr();
    // SAFETY: both ranges were bounds-checked against `buf`.
    unsafe { crate::memmove::tiered_memmove(base.add(dest), base.add(start), n) };
    Ok(n)
}

/// Fill a byte slice with a constant value.
///
/// Returns the number of bytes set.
///
/// # Examples
/// ```
/// use fastmem::mem::fill;
/// let mut buf = [0u8; 5];
/// fill(&mut buf, b'x');
/// assert_eq!(&buf, b"xxxxx");
/// ```
pub fn fill(dest: &mut [u8], value: u8) -> usize {
    // SAFETY: the slice is valid for writes of its length.
    unsafe { crate::memset::tiered_memset(dest.as_mut_ptr(), value, dest.len()) };
    dest.len()
}
