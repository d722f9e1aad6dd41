//! Pack and unpack entry points
//!
//! Each call walks the format once, advancing a cursor through the buffer by
//! exactly the width of every directive. Directives are executed as they are
//! parsed: when a later directive fails (malformed character, missing value,
//! short buffer, ...) the bytes and slots written for earlier directives stay
//! written. Nothing is rolled back.

use std::ops::Range;

use tracing::trace;

use crate::bytes::{get_int, get_uint, put_int, put_uint, Endian, FloatFormat};
use crate::error::{Result, StructError};
use crate::format::{calcsize, Directive, FormatParser, TypeCode};
use crate::value::{Slot, Value, ValueKind};

/// Drive `visit` over every directive, returning the bytes advanced
///
/// Capacity is checked per directive before `visit` sees its byte range.
fn walk<F>(offset: usize, available: usize, format: &str, mut visit: F) -> Result<usize>
where
    F: FnMut(&Directive, Range<usize>) -> Result<()>,
{
    if offset > available {
        return Err(StructError::buffer_too_small(offset, available));
    }

    let mut cursor = offset;
    for directive in FormatParser::new(format) {
        let directive = directive?;
        let end = cursor
            .checked_add(directive.size())
            .ok_or(StructError::RepeatCountOverflow {
                position: directive.position,
            })?;
        if end > available {
            return Err(StructError::buffer_too_small(end, available));
        }

        visit(&directive, cursor..end)?;
        cursor = end;
    }

    Ok(cursor - offset)
}

fn check_kind(directive: &Directive, index: usize, found: ValueKind) -> Result<()> {
    match directive.code.value_kind() {
        Some(expected) if expected != found => Err(StructError::TypeMismatch {
            index,
            code: directive.ch,
            expected: expected.as_str(),
            found: found.as_str(),
        }),
        _ => Ok(()),
    }
}

fn float_format(code: TypeCode) -> FloatFormat {
    match code {
        TypeCode::Float16 => FloatFormat::Half,
        TypeCode::Float64 => FloatFormat::Double,
        _ => FloatFormat::Single,
    }
}

/// Encode one value into `dst`, whose length is the item width
/// (or the whole field for `s` and `p`)
fn encode(code: TypeCode, value: &Value, dst: &mut [u8], endian: Endian) {
    match value {
        Value::Bytes(bytes) if code == TypeCode::PascalBytes => encode_pascal(bytes, dst),
        Value::Bool(v) => dst[0] = u8::from(*v),
        Value::I8(v) => put_int(dst, *v as i64, endian),
        Value::U8(v) => put_uint(dst, *v as u64, endian),
        Value::I16(v) => put_int(dst, *v as i64, endian),
        Value::U16(v) => put_uint(dst, *v as u64, endian),
        Value::I32(v) => put_int(dst, *v as i64, endian),
        Value::U32(v) => put_uint(dst, *v as u64, endian),
        Value::I64(v) => put_int(dst, *v, endian),
        Value::U64(v) => put_uint(dst, *v, endian),
        Value::F32(v) => put_uint(dst, float_format(code).encode(*v as f64), endian),
        Value::F64(v) => put_uint(dst, FloatFormat::Double.encode(*v), endian),
        Value::Bytes(bytes) => {
            // Shorter strings are zero-padded, longer ones truncated
            let n = bytes.len().min(dst.len());
            dst[..n].copy_from_slice(&bytes[..n]);
            dst[n..].fill(0);
        },
    }
}

/// Length byte, then at most `dst.len() - 1` (and 255) bytes, zero-padded
fn encode_pascal(bytes: &[u8], dst: &mut [u8]) {
    let Some((len, data)) = dst.split_first_mut() else {
        return;
    };
    let n = bytes.len().min(data.len()).min(u8::MAX as usize);
    *len = n as u8;
    data[..n].copy_from_slice(&bytes[..n]);
    data[n..].fill(0);
}

/// String stored after the length byte, capped at the field size
fn decode_pascal(src: &[u8]) -> Vec<u8> {
    match src.split_first() {
        Some((&len, data)) => data[..(len as usize).min(data.len())].to_vec(),
        None => Vec::new(),
    }
}

/// Decode one item of a non-padding directive
fn decode(code: TypeCode, src: &[u8], endian: Endian) -> Value {
    match code {
        TypeCode::Bool => Value::Bool(src[0] != 0),
        TypeCode::Int8 => Value::I8(get_int(src, endian) as i8),
        TypeCode::UInt8 => Value::U8(src[0]),
        TypeCode::Int16 => Value::I16(get_int(src, endian) as i16),
        TypeCode::UInt16 => Value::U16(get_uint(src, endian) as u16),
        TypeCode::Int32 => Value::I32(get_int(src, endian) as i32),
        TypeCode::UInt32 => Value::U32(get_uint(src, endian) as u32),
        TypeCode::Int64 => Value::I64(get_int(src, endian)),
        TypeCode::UInt64 => Value::U64(get_uint(src, endian)),
        TypeCode::Float16 | TypeCode::Float32 => {
            Value::F32(float_format(code).decode(get_uint(src, endian)) as f32)
        },
        TypeCode::Float64 => Value::F64(FloatFormat::Double.decode(get_uint(src, endian))),
        TypeCode::PascalBytes => Value::Bytes(decode_pascal(src)),
        TypeCode::Bytes | TypeCode::Pad => Value::Bytes(src.to_vec()),
    }
}

/// Split a directive's byte range into the per-item ranges that each consume
/// one value or slot
fn items(directive: &Directive, range: Range<usize>) -> impl Iterator<Item = Range<usize>> {
    let width = match directive.code {
        TypeCode::Bytes | TypeCode::PascalBytes => range.len().max(1),
        code => code.width(),
    };
    let count = directive.value_count();
    let start = range.start;
    let end = range.end;
    (0..count).map(move |i| {
        let item_start = start + i * width;
        item_start..(item_start + width).min(end)
    })
}

/// Pack `values` into `buf` starting at offset 0
///
/// See [`pack_into`].
pub fn pack(buf: &mut [u8], format: &str, values: &[Value]) -> Result<usize> {
    pack_into(0, buf, format, values)
}

/// Pack `values` into `buf` starting at `offset`
///
/// Values are matched positionally: one per repeat-count iteration, exactly
/// one per `s` or `p` field, none for `x`. Each value's variant must match its type
/// code (`i`/`l` take `I32`, `e`/`f` take `F32`, `s`/`p` take `Bytes`, ...).
///
/// Returns the number of bytes written, which always equals
/// `calcsize(format)` on success.
///
/// # Errors
///
/// Format errors, `BufferTooSmall`, `MissingValue`, `TypeMismatch` and
/// `UnusedValues`. Bytes written for directives before the failing one remain
/// in `buf`.
pub fn pack_into(offset: usize, buf: &mut [u8], format: &str, values: &[Value]) -> Result<usize> {
    trace!(format, offset, values = values.len(), "pack");

    let available = buf.len();
    let mut next = 0usize;
    let written = walk(offset, available, format, |directive, range| {
        if directive.code == TypeCode::Pad {
            buf[range].fill(0);
            return Ok(());
        }

        for item in items(directive, range) {
            let value = values.get(next).ok_or(StructError::MissingValue {
                index: next,
                code: directive.ch,
            })?;
            check_kind(directive, next, value.kind())?;
            encode(directive.code, value, &mut buf[item], directive.order.resolve());
            next += 1;
        }
        Ok(())
    })?;

    if next < values.len() {
        return Err(StructError::UnusedValues {
            consumed: next,
            provided: values.len(),
        });
    }
    Ok(written)
}

/// Pack `values` into a freshly allocated buffer of `calcsize(format)` bytes
pub fn pack_to_vec(format: &str, values: &[Value]) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; calcsize(format)?];
    pack(&mut buf, format, values)?;
    Ok(buf)
}

/// Unpack `buf` starting at offset 0 into `slots`
///
/// See [`unpack_from`].
pub fn unpack(buf: &[u8], format: &str, slots: &mut [Slot<'_>]) -> Result<usize> {
    unpack_from(0, buf, format, slots)
}

/// Unpack `buf` starting at `offset`, writing each field through the next slot
///
/// Slots are matched with the same positional rules as pack values. A `Bytes`
/// slot is replaced with exactly the field's bytes for `s`, and with the
/// length-prefixed string for `p`.
///
/// Returns the number of bytes read, which always equals `calcsize(format)`
/// on success.
///
/// # Errors
///
/// Format errors, `BufferTooSmall`, `MissingSlot`, `TypeMismatch` and
/// `UnusedSlots`. Slots filled before the failing directive keep their new
/// values.
pub fn unpack_from(
    offset: usize,
    buf: &[u8],
    format: &str,
    slots: &mut [Slot<'_>],
) -> Result<usize> {
    trace!(format, offset, slots = slots.len(), "unpack");

    let provided = slots.len();
    let mut next = 0usize;
    let read = walk(offset, buf.len(), format, |directive, range| {
        if directive.code == TypeCode::Pad {
            return Ok(());
        }

        for item in items(directive, range) {
            let slot = slots.get_mut(next).ok_or(StructError::MissingSlot {
                index: next,
                code: directive.ch,
            })?;
            check_kind(directive, next, slot.kind())?;
            let value = decode(directive.code, &buf[item], directive.order.resolve());
            slot.store(value).map_err(|value| StructError::TypeMismatch {
                index: next,
                code: directive.ch,
                expected: value.kind().as_str(),
                found: slot.kind().as_str(),
            })?;
            next += 1;
        }
        Ok(())
    })?;

    if next < provided {
        return Err(StructError::UnusedSlots {
            consumed: next,
            provided,
        });
    }
    Ok(read)
}

/// Unpack `buf` from offset 0 into owned values
pub fn unpack_values(buf: &[u8], format: &str) -> Result<Vec<Value>> {
    unpack_values_from(0, buf, format)
}

/// Unpack `buf` from `offset` into owned values, one per field
pub fn unpack_values_from(offset: usize, buf: &[u8], format: &str) -> Result<Vec<Value>> {
    trace!(format, offset, "unpack values");

    let mut values = Vec::new();
    walk(offset, buf.len(), format, |directive, range| {
        if directive.code == TypeCode::Pad {
            return Ok(());
        }

        let endian = directive.order.resolve();
        values.extend(items(directive, range).map(|item| decode(directive.code, &buf[item], endian)));
        Ok(())
    })?;
    Ok(values)
}
