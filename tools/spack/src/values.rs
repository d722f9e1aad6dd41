//! Command line value parsing
//!
//! Each textual argument is parsed according to the type code it feeds, so
//! `">bH" -1 0xFFFF` becomes `[I8(-1), U16(65535)]`.

use structpack::{FormatParser, StructError, TypeCode, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error(transparent)]
    Format(#[from] StructError),

    #[error("Invalid value #{index} {input:?} for '{code}': {reason}")]
    Invalid {
        index: usize,
        code: char,
        input: String,
        reason: &'static str,
    },

    #[error("Format takes {consumed} values but {provided} were given")]
    Unused { consumed: usize, provided: usize },
}

/// Parse `args` positionally against the directives of `format`
///
/// Stops quietly when `args` runs out; packing reports the missing value
/// with its type code.
pub fn parse_values(format: &str, args: &[String]) -> Result<Vec<Value>, ValueError> {
    let mut values = Vec::with_capacity(args.len());
    let mut inputs = args.iter();

    for directive in FormatParser::new(format) {
        let directive = directive?;
        for _ in 0..directive.value_count() {
            let Some(input) = inputs.next() else {
                return Ok(values);
            };
            let value = parse_one(directive.code, input).map_err(|reason| ValueError::Invalid {
                index: values.len(),
                code: directive.ch,
                input: input.clone(),
                reason,
            })?;
            values.push(value);
        }
    }

    if values.len() < args.len() {
        return Err(ValueError::Unused {
            consumed: values.len(),
            provided: args.len(),
        });
    }
    Ok(values)
}

fn parse_one(code: TypeCode, input: &str) -> Result<Value, &'static str> {
    match code {
        TypeCode::Bool => match input.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err("expected true, false, 1 or 0"),
        },
        TypeCode::Int8 => int(input).map(Value::I8),
        TypeCode::UInt8 => int(input).map(Value::U8),
        TypeCode::Int16 => int(input).map(Value::I16),
        TypeCode::UInt16 => int(input).map(Value::U16),
        TypeCode::Int32 => int(input).map(Value::I32),
        TypeCode::UInt32 => int(input).map(Value::U32),
        TypeCode::Int64 => int(input).map(Value::I64),
        TypeCode::UInt64 => int(input).map(Value::U64),
        TypeCode::Float16 | TypeCode::Float32 => input
            .parse::<f32>()
            .map(Value::F32)
            .map_err(|_| "expected a number"),
        TypeCode::Float64 => input
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|_| "expected a number"),
        TypeCode::Bytes | TypeCode::PascalBytes => Ok(Value::from(input)),
        TypeCode::Pad => Err("padding takes no value"),
    }
}

fn int<T: TryFrom<i128>>(input: &str) -> Result<T, &'static str> {
    let value = parse_int(input).ok_or("expected a decimal or 0x-prefixed integer")?;
    T::try_from(value).map_err(|_| "out of range")
}

/// Decimal or `0x` hex with an optional sign
fn parse_int(input: &str) -> Option<i128> {
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if digits.starts_with(|c: char| c == '+' || c == '-') {
        return None;
    }

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if !hex.starts_with(|c: char| c == '+' || c == '-') => {
            i128::from_str_radix(hex, 16).ok()?
        },
        Some(_) => return None,
        None => digits.parse::<i128>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_int() {
        let cases = [
            ("42", Some(42)),
            ("-42", Some(-42)),
            ("+7", Some(7)),
            ("0x1F", Some(31)),
            ("-0x10", Some(-16)),
            ("0X10", Some(16)),
            ("--1", None),
            ("0x-1", None),
            ("1.5", None),
            ("", None),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_int(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_parse_values_by_code() {
        let values = parse_values(
            ">?bBhHiIqQefd3s",
            &args(&[
                "true", "-1", "255", "-300", "0xFFFF", "-5", "4000000000", "-9", "18446744073709551615",
                "0.5", "inf", "-2.25", "abc",
            ]),
        )
        .unwrap();

        assert_eq!(
            values,
            vec![
                Value::Bool(true),
                Value::I8(-1),
                Value::U8(255),
                Value::I16(-300),
                Value::U16(0xFFFF),
                Value::I32(-5),
                Value::U32(4_000_000_000),
                Value::I64(-9),
                Value::U64(u64::MAX),
                Value::F32(0.5),
                Value::F32(f32::INFINITY),
                Value::F64(-2.25),
                Value::from("abc"),
            ]
        );
    }

    #[test]
    fn test_repeat_counts_and_padding() {
        let values = parse_values("2x2b", &args(&["1", "2"])).unwrap();
        assert_eq!(values, vec![Value::I8(1), Value::I8(2)]);
    }

    #[test]
    fn test_pascal_string_takes_one_value() {
        let values = parse_values("4pb", &args(&["ab", "-1"])).unwrap();
        assert_eq!(values, vec![Value::from("ab"), Value::I8(-1)]);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_values("bB", &args(&["1", "256"])),
            Err(ValueError::Invalid {
                index: 1,
                code: 'B',
                input: "256".to_string(),
                reason: "out of range",
            })
        );
        assert!(matches!(
            parse_values("?", &args(&["yes"])),
            Err(ValueError::Invalid { code: '?', .. })
        ));
        assert!(matches!(
            parse_values("l", &args(&["x"])),
            Err(ValueError::Invalid { code: 'l', .. })
        ));
    }

    #[test]
    fn test_count_mismatches() {
        assert_eq!(parse_values("hh", &args(&["1"])).unwrap(), vec![Value::I16(1)]);
        assert_eq!(
            parse_values("h", &args(&["1", "2"])),
            Err(ValueError::Unused {
                consumed: 1,
                provided: 2,
            })
        );
        assert_eq!(
            parse_values("hz", &args(&["1"])),
            Err(ValueError::Format(StructError::malformed('z', 1)))
        );
    }
}
