//! Format string interpreter
//!
//! Tokenizes the format mini-language into [`Directive`]s in a single lazy
//! pass. Callers act on each directive as it is produced, so a malformed
//! character is only discovered once everything before it has been executed.
//!
//! ```text
//! format     := directive*
//! order      := '@' | '=' | '<' | '>' | '!'
//! directive  := order | (digits? typecode)
//! typecode   := 'x'|'?'|'b'|'B'|'h'|'H'|'i'|'I'|'l'|'L'|'q'|'Q'|'e'|'f'|'d'|'s'|'p'
//! ```

use std::str::CharIndices;

use tracing::debug;

use crate::bytes::{ByteOrder, FloatFormat};
use crate::error::{Result, StructError};
use crate::value::ValueKind;

/// Type codes of the format mini-language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    /// `x`: zero byte on pack, skipped on unpack, consumes no value
    Pad,
    /// `?`
    Bool,
    /// `b`
    Int8,
    /// `B`
    UInt8,
    /// `h`
    Int16,
    /// `H`
    UInt16,
    /// `i` or `l`
    Int32,
    /// `I` or `L`
    UInt32,
    /// `q`
    Int64,
    /// `Q`
    UInt64,
    /// `e`: IEEE-754 binary16, carried as `f32`
    Float16,
    /// `f`
    Float32,
    /// `d`
    Float64,
    /// `s`: the repeat count is the field length in bytes
    Bytes,
    /// `p`: like `s`, but the first byte holds the string length
    PascalBytes,
}

impl TypeCode {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'x' => Some(Self::Pad),
            '?' => Some(Self::Bool),
            'b' => Some(Self::Int8),
            'B' => Some(Self::UInt8),
            'h' => Some(Self::Int16),
            'H' => Some(Self::UInt16),
            'i' | 'l' => Some(Self::Int32),
            'I' | 'L' => Some(Self::UInt32),
            'q' => Some(Self::Int64),
            'Q' => Some(Self::UInt64),
            'e' => Some(Self::Float16),
            'f' => Some(Self::Float32),
            'd' => Some(Self::Float64),
            's' => Some(Self::Bytes),
            'p' => Some(Self::PascalBytes),
            _ => None,
        }
    }

    /// Byte width of one item
    ///
    /// This table is the only place widths are defined; sizing, packing and
    /// unpacking all go through it.
    pub fn width(&self) -> usize {
        match self {
            Self::Pad
            | Self::Bool
            | Self::Int8
            | Self::UInt8
            | Self::Bytes
            | Self::PascalBytes => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 => 4,
            Self::Int64 | Self::UInt64 => 8,
            Self::Float16 => FloatFormat::Half.size(),
            Self::Float32 => FloatFormat::Single.size(),
            Self::Float64 => FloatFormat::Double.size(),
        }
    }

    /// Total bytes occupied by a directive with this code and repeat count
    ///
    /// For `s` and `p` this is the field length itself. `None` on overflow.
    pub fn size(&self, count: usize) -> Option<usize> {
        self.width().checked_mul(count)
    }

    /// Number of values (or output slots) a directive consumes
    pub fn value_count(&self, count: usize) -> usize {
        match self {
            Self::Pad => 0,
            Self::Bytes | Self::PascalBytes => 1,
            _ => count,
        }
    }

    /// Kind of value or slot this code reads and writes; `None` for padding
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Pad => None,
            Self::Bool => Some(ValueKind::Bool),
            Self::Int8 => Some(ValueKind::I8),
            Self::UInt8 => Some(ValueKind::U8),
            Self::Int16 => Some(ValueKind::I16),
            Self::UInt16 => Some(ValueKind::U16),
            Self::Int32 => Some(ValueKind::I32),
            Self::UInt32 => Some(ValueKind::U32),
            Self::Int64 => Some(ValueKind::I64),
            Self::UInt64 => Some(ValueKind::U64),
            Self::Float16 | Self::Float32 => Some(ValueKind::F32),
            Self::Float64 => Some(ValueKind::F64),
            Self::Bytes | Self::PascalBytes => Some(ValueKind::Bytes),
        }
    }
}

/// One `(byte order, repeat count, type code)` unit of a format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    /// Byte order in effect when the type code was read
    pub order: ByteOrder,
    /// Resolved repeat count (1 when no digits were given)
    pub count: usize,
    pub code: TypeCode,
    /// Type code character as written (`i` and `l` share a `TypeCode`)
    pub ch: char,
    /// Byte position of the type code in the format string
    pub position: usize,
}

impl Directive {
    /// Bytes this directive occupies in the buffer
    pub fn size(&self) -> usize {
        // Checked when the directive was parsed
        self.code.width() * self.count
    }

    /// Values consumed on pack / slots filled on unpack
    pub fn value_count(&self) -> usize {
        self.code.value_count(self.count)
    }
}

/// Lazy, single-pass tokenizer over a format string
///
/// Yields one `Directive` per type code. Byte-order markers update the order
/// for every later directive and leave a pending repeat count untouched.
/// After the first error the iterator is exhausted.
pub struct FormatParser<'a> {
    chars: CharIndices<'a>,
    order: ByteOrder,
    /// Pending repeat count and the position of its first digit
    pending: Option<(usize, usize)>,
    finished: bool,
}

impl<'a> FormatParser<'a> {
    pub fn new(format: &'a str) -> Self {
        Self::with_order(format, ByteOrder::Native)
    }

    /// Start with `order` in effect until the format selects another one
    pub fn with_order(format: &'a str, order: ByteOrder) -> Self {
        Self {
            chars: format.char_indices(),
            order,
            pending: None,
            finished: false,
        }
    }

    fn fail(&mut self, err: StructError) -> Option<Result<Directive>> {
        debug!("Rejected format: {}", err);
        self.finished = true;
        Some(Err(err))
    }
}

impl Iterator for FormatParser<'_> {
    type Item = Result<Directive>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while let Some((position, ch)) = self.chars.next() {
            if let Some(order) = ByteOrder::from_marker(ch) {
                self.order = order;
                continue;
            }

            if let Some(digit) = ch.to_digit(10) {
                let (count, start) = self.pending.unwrap_or((0, position));
                let count = match count
                    .checked_mul(10)
                    .and_then(|c| c.checked_add(digit as usize))
                {
                    Some(count) => count,
                    None => return self.fail(StructError::RepeatCountOverflow { position: start }),
                };
                self.pending = Some((count, start));
                continue;
            }

            if ch.is_whitespace() && self.pending.is_none() {
                continue;
            }

            let Some(code) = TypeCode::from_char(ch) else {
                return self.fail(StructError::malformed(ch, position));
            };

            let count = self.pending.take().map_or(1, |(count, _)| count);
            if code.size(count).is_none() {
                return self.fail(StructError::RepeatCountOverflow { position });
            }

            return Some(Ok(Directive {
                order: self.order,
                count,
                code,
                ch,
                position,
            }));
        }

        self.finished = true;
        if let Some((_, position)) = self.pending.take() {
            return self.fail(StructError::DanglingRepeatCount { position });
        }
        None
    }
}

/// Parse a whole format string up front
///
/// Useful for inspecting a layout; `pack` and `unpack` parse lazily instead.
pub fn parse(format: &str) -> Result<Vec<Directive>> {
    FormatParser::new(format).collect()
}

/// Total byte length `format` occupies
///
/// Runs the same parser as pack/unpack and sums [`TypeCode::size`] for every
/// directive; byte-order markers do not affect the result.
pub fn calcsize(format: &str) -> Result<usize> {
    let mut total = 0usize;
    for directive in FormatParser::new(format) {
        let directive = directive?;
        total = total
            .checked_add(directive.size())
            .ok_or(StructError::RepeatCountOverflow {
                position: directive.position,
            })?;
    }
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_calcsize_single_codes() {
        let cases = [
            ("x", 1),
            ("?", 1),
            ("b", 1),
            ("B", 1),
            ("h", 2),
            ("H", 2),
            ("i", 4),
            ("I", 4),
            ("l", 4),
            ("L", 4),
            ("q", 8),
            ("Q", 8),
            ("e", 2),
            ("f", 4),
            ("d", 8),
            ("s", 1),
            ("32s", 32),
            ("p", 1),
            ("32p", 32),
        ];

        for (format, expected) in cases {
            assert_eq!(calcsize(format).unwrap(), expected, "format {:?}", format);
        }
    }

    #[test]
    fn test_calcsize_composite() {
        assert_eq!(calcsize("4b").unwrap(), 4);
        assert_eq!(calcsize("bhbl").unwrap(), 1 + 2 + 1 + 4);
        assert_eq!(calcsize(">2h3Q10s").unwrap(), 4 + 24 + 10);
        assert_eq!(calcsize("").unwrap(), 0);
        assert_eq!(calcsize("0h0s").unwrap(), 0);
    }

    #[test]
    fn test_order_markers_do_not_change_size() {
        for format in ["=ihq", "<ihq", ">ihq", "!ihq", "@ihq", "i<h>q"] {
            assert_eq!(calcsize(format).unwrap(), 14, "format {:?}", format);
        }
    }

    #[test]
    fn test_malformed_character() {
        assert_eq!(calcsize("z"), Err(StructError::malformed('z', 0)));
        assert_eq!(calcsize(">hhz"), Err(StructError::malformed('z', 3)));
        // Varint codes from other struct dialects are rejected
        assert!(matches!(
            calcsize("v"),
            Err(StructError::MalformedFormat { ch: 'v', .. })
        ));
        assert!(matches!(
            calcsize("V"),
            Err(StructError::MalformedFormat { ch: 'V', .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_rejected_format_is_logged() {
        assert!(calcsize("bhz").is_err());
        assert!(logs_contain("Rejected format"));
    }

    #[test]
    fn test_dangling_repeat_count() {
        assert_eq!(
            calcsize("h12"),
            Err(StructError::DanglingRepeatCount { position: 1 })
        );
    }

    #[test]
    fn test_repeat_count_overflow() {
        let format = format!("{}0b", usize::MAX);
        assert_eq!(
            calcsize(&format),
            Err(StructError::RepeatCountOverflow { position: 0 })
        );

        let format = format!("{}q", usize::MAX);
        assert!(matches!(
            calcsize(&format),
            Err(StructError::RepeatCountOverflow { .. })
        ));

        let format = format!("{}s{}s", usize::MAX, usize::MAX);
        assert!(matches!(
            calcsize(&format),
            Err(StructError::RepeatCountOverflow { .. })
        ));
    }

    #[test]
    fn test_whitespace_between_directives() {
        assert_eq!(calcsize("> h  2i\tq\n").unwrap(), 2 + 8 + 8);
        assert_eq!(calcsize("2 h"), Err(StructError::malformed(' ', 1)));
    }

    #[test]
    fn test_parser_tracks_order() {
        let directives = parse("h<h>h!h=h").unwrap();
        let orders: Vec<_> = directives.iter().map(|d| d.order).collect();
        assert_eq!(
            orders,
            vec![
                ByteOrder::Native,
                ByteOrder::LittleEndian,
                ByteOrder::BigEndian,
                ByteOrder::BigEndian,
                ByteOrder::Native,
            ]
        );
    }

    #[test]
    fn test_order_marker_keeps_pending_count() {
        let directives = parse("2<h").unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].count, 2);
        assert_eq!(directives[0].order, ByteOrder::LittleEndian);
    }

    #[test]
    fn test_directive_value_counts() {
        let directives = parse("3x4b10s8p").unwrap();
        let counts: Vec<_> = directives.iter().map(|d| d.value_count()).collect();
        assert_eq!(counts, vec![0, 4, 1, 1]);
        assert_eq!(directives[3].size(), 8);
        assert_eq!(directives[2].size(), 10);
        assert_eq!(directives[1].ch, 'b');
        assert_eq!(directives[2].position, 6);
    }

    #[test]
    fn test_parser_stops_after_error() {
        let mut parser = FormatParser::new("bzb");
        assert!(parser.next().unwrap().is_ok());
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_with_order_default() {
        let directives: Vec<_> = FormatParser::with_order("h<h", ByteOrder::BigEndian)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(directives[0].order, ByteOrder::BigEndian);
        assert_eq!(directives[1].order, ByteOrder::LittleEndian);
    }
}
