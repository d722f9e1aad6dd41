//! Format-string driven binary packing
//!
//! Converts between typed value lists and fixed-layout byte buffers, driven
//! by a compact format mini-language:
//! - byte-order markers: `@`/`=` native, `<` little, `>`/`!` big (network)
//! - type codes: `x ? b B h H i I l L q Q e f d s p`
//! - decimal repeat counts before a type code (`4b`, `10s`)
//!
//! ```
//! use structpack::{calcsize, pack_to_vec, unpack, Slot, Value};
//!
//! let format = ">bhbl";
//! assert_eq!(calcsize(format).unwrap(), 8);
//!
//! let buf = pack_to_vec(
//!     format,
//!     &[Value::I8(-1), Value::I16(-2), Value::I8(-3), Value::I32(-4)],
//! )
//! .unwrap();
//! assert_eq!(buf, [0xFF, 0xFF, 0xFE, 0xFD, 0xFF, 0xFF, 0xFF, 0xFC]);
//!
//! let (mut a, mut b, mut c, mut d) = (0i8, 0i16, 0i8, 0i32);
//! unpack(
//!     &buf,
//!     format,
//!     &mut [
//!         Slot::from(&mut a),
//!         Slot::from(&mut b),
//!         Slot::from(&mut c),
//!         Slot::from(&mut d),
//!     ],
//! )
//! .unwrap();
//! assert_eq!((a, b, c, d), (-1, -2, -3, -4));
//! ```

pub mod bytes;
pub mod error;
pub mod format;
pub mod value;

mod packer;

pub use bytes::{native_endian, ByteOrder, Endian, FloatFormat};
pub use error::{Result, StructError};
pub use format::{calcsize, parse, Directive, FormatParser, TypeCode};
pub use packer::{
    pack, pack_into, pack_to_vec, unpack, unpack_from, unpack_values, unpack_values_from,
};
pub use value::{Slot, Value, ValueKind};
