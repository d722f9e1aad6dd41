//! Scalar byte codecs
//!
//! Building blocks used by the format interpreter:
//!
//! - **Byte order**: `ByteOrder` markers and the memoized native order detection
//! - **Integer codec**: fixed-width integers to/from bytes in either order
//! - **IEEE-754 codec**: floats to/from their bit patterns

pub mod byte_order;
pub mod conversions;
pub mod ieee754;

pub use byte_order::{native_endian, ByteOrder, Endian};
pub use conversions::*;
pub use ieee754::{pack_ieee754, unpack_ieee754, FloatFormat};
