//! fastmem: alignment-tiered memcpy, memmove and memset.
//!
//! Each engine asks a granularity selector for the widest transfer unit the
//! current pointer alignment allows, hands the whole aligned run to a
//! fixed-width primitive, and re-selects on the tail until nothing is left.

pub mod dispatch;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod mem;
pub mod memcpy;
pub mod memmove;
pub mod memset;
pub mod primitive;
pub mod select;
pub mod sweep;
pub mod tier;
pub mod timing;

pub use dispatch::{DispatchConfig, Dispatcher};
pub use memcpy::tiered_memcpy;
pub use memmove::tiered_memmove;
pub use memset::tiered_memset;
