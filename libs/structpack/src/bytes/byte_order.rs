//! Byte order markers and host endianness detection
//!
//! A format string selects its byte order with a single marker character.
//! `Native` is resolved lazily against the host's detected order, which is
//! detected once per process.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Byte order selected by a format string marker
///
/// | Marker      | Variant        |
/// |-------------|----------------|
/// | `@` `=`     | `Native`       |
/// | `<`         | `LittleEndian` |
/// | `>` `!`     | `BigEndian`    |
///
/// For the 16-bit value `0x1234`:
/// - `BigEndian`: [0x12, 0x34]
/// - `LittleEndian`: [0x34, 0x12]
/// - `Native`: whichever of the two the host uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Host byte order, resolved through [`native_endian`]
    #[default]
    #[serde(rename = "native")]
    Native,

    /// Least significant byte first
    #[serde(rename = "little", alias = "le")]
    LittleEndian,

    /// Most significant byte first (network byte order)
    #[serde(rename = "big", alias = "be", alias = "network")]
    BigEndian,
}

/// Concrete byte order after `Native` has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

static NATIVE_ENDIAN: OnceLock<Endian> = OnceLock::new();

/// Host byte order
///
/// Writes a known multi-byte integer to memory and inspects its
/// lowest-addressed byte. Computed at most once per process; every later call
/// returns the cached value.
pub fn native_endian() -> Endian {
    *NATIVE_ENDIAN.get_or_init(detect_endian)
}

fn detect_endian() -> Endian {
    let word = 0x0001u16.to_ne_bytes();
    if word[0] == 0x01 {
        Endian::Little
    } else {
        Endian::Big
    }
}

impl ByteOrder {
    /// Parse a format string byte-order marker
    pub fn from_marker(ch: char) -> Option<Self> {
        match ch {
            '@' | '=' => Some(Self::Native),
            '<' => Some(Self::LittleEndian),
            '>' | '!' => Some(Self::BigEndian),
            _ => None,
        }
    }

    /// Canonical marker character
    pub fn marker(&self) -> char {
        match self {
            Self::Native => '=',
            Self::LittleEndian => '<',
            Self::BigEndian => '>',
        }
    }

    /// Resolve to a concrete order, consulting the host order for `Native`
    pub fn resolve(&self) -> Endian {
        match self {
            Self::Native => native_endian(),
            Self::LittleEndian => Endian::Little,
            Self::BigEndian => Endian::Big,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_marker() {
        assert_eq!(ByteOrder::from_marker('='), Some(ByteOrder::Native));
        assert_eq!(ByteOrder::from_marker('@'), Some(ByteOrder::Native));
        assert_eq!(ByteOrder::from_marker('<'), Some(ByteOrder::LittleEndian));
        assert_eq!(ByteOrder::from_marker('>'), Some(ByteOrder::BigEndian));
        assert_eq!(ByteOrder::from_marker('!'), Some(ByteOrder::BigEndian));
        assert_eq!(ByteOrder::from_marker('h'), None);
        assert_eq!(ByteOrder::from_marker('4'), None);
    }

    #[test]
    fn test_native_detection_matches_target() {
        let expected = if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        };
        assert_eq!(native_endian(), expected);
        // Memoized value is stable
        assert_eq!(native_endian(), native_endian());
        assert_eq!(ByteOrder::Native.resolve(), expected);
    }

    #[test]
    fn test_resolve_explicit_orders() {
        assert_eq!(ByteOrder::LittleEndian.resolve(), Endian::Little);
        assert_eq!(ByteOrder::BigEndian.resolve(), Endian::Big);
    }

    #[test]
    fn test_default() {
        assert_eq!(ByteOrder::default(), ByteOrder::Native);
    }
}
