//! Typed value lists
//!
//! `Value` is what `pack` consumes and `unpack_values` produces; `Slot` is a
//! typed mutable destination for `unpack`. Every type code accepts exactly one
//! kind, so the interpreter dispatches on the variant tag instead of trusting
//! the caller to line up untyped arguments.

use serde::{Deserialize, Serialize};

/// Kind tag shared by `Value`, `Slot` and `TypeCode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bytes,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bytes => "bytes",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scalar or byte-string field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::U8(_) => ValueKind::U8,
            Self::I16(_) => ValueKind::I16,
            Self::U16(_) => ValueKind::U16,
            Self::I32(_) => ValueKind::I32,
            Self::U32(_) => ValueKind::U32,
            Self::I64(_) => ValueKind::I64,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Bytes(_) => ValueKind::Bytes,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Bytes(bytes) => {
                f.write_str("b\"")?;
                for &byte in bytes {
                    write!(f, "{}", std::ascii::escape_default(byte))?;
                }
                f.write_str("\"")
            },
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl<'a> From<&'a mut $ty> for Slot<'a> {
                fn from(target: &'a mut $ty) -> Self {
                    Slot::$variant(target)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Vec<u8> => Bytes,
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(s.into_bytes())
    }
}

/// Typed mutable destination for one unpacked field
///
/// Built with `.into()` from a `&mut` to the target:
///
/// ```
/// use structpack::Slot;
///
/// let mut id = 0u8;
/// let mut name: Vec<u8> = Vec::new();
/// let slots: [Slot<'_>; 2] = [(&mut id).into(), (&mut name).into()];
/// assert_eq!(slots.len(), 2);
/// ```
#[derive(Debug)]
pub enum Slot<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    U8(&'a mut u8),
    I16(&'a mut i16),
    U16(&'a mut u16),
    I32(&'a mut i32),
    U32(&'a mut u32),
    I64(&'a mut i64),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
    /// Replaced with exactly the field's bytes
    Bytes(&'a mut Vec<u8>),
}

impl Slot<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::U8(_) => ValueKind::U8,
            Self::I16(_) => ValueKind::I16,
            Self::U16(_) => ValueKind::U16,
            Self::I32(_) => ValueKind::I32,
            Self::U32(_) => ValueKind::U32,
            Self::I64(_) => ValueKind::I64,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Write `value` through the slot
    ///
    /// Returns the value back if its kind does not match the slot.
    pub fn store(&mut self, value: Value) -> std::result::Result<(), Value> {
        match (self, value) {
            (Self::Bool(t), Value::Bool(v)) => **t = v,
            (Self::I8(t), Value::I8(v)) => **t = v,
            (Self::U8(t), Value::U8(v)) => **t = v,
            (Self::I16(t), Value::I16(v)) => **t = v,
            (Self::U16(t), Value::U16(v)) => **t = v,
            (Self::I32(t), Value::I32(v)) => **t = v,
            (Self::U32(t), Value::U32(v)) => **t = v,
            (Self::I64(t), Value::I64(v)) => **t = v,
            (Self::U64(t), Value::U64(v)) => **t = v,
            (Self::F32(t), Value::F32(v)) => **t = v,
            (Self::F64(t), Value::F64(v)) => **t = v,
            (Self::Bytes(t), Value::Bytes(v)) => **t = v,
            (_, other) => return Err(other),
        }
        Ok(())
    }
}
