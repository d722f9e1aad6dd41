//! Struct Packing Error Types
//!
//! Errors raised while interpreting a format string or moving values
//! between a buffer and a value list.

use thiserror::Error;

/// Result type for structpack operations
pub type Result<T> = std::result::Result<T, StructError>;

/// Packing and unpacking errors
///
/// None of these errors roll anything back: directives processed before the
/// failing one have already written their bytes (pack) or filled their slots
/// (unpack).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructError {
    /// Character that is neither a byte-order marker, a digit nor a type code
    #[error("Malformed format: unexpected character {ch:?} at position {position}")]
    MalformedFormat { ch: char, position: usize },

    /// Repeat count at the end of the format with no type code after it
    #[error("Malformed format: repeat count at position {position} is not followed by a type code")]
    DanglingRepeatCount { position: usize },

    /// Repeat count or total size does not fit in usize
    #[error("Repeat count overflow at position {position}")]
    RepeatCountOverflow { position: usize },

    /// Buffer cannot hold the next directive
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Value list ran out before the format did
    #[error("Missing value #{index} for '{code}'")]
    MissingValue { index: usize, code: char },

    /// Slot list ran out before the format did
    #[error("Missing output slot #{index} for '{code}'")]
    MissingSlot { index: usize, code: char },

    /// Value or slot kind does not match its type code
    #[error("Type mismatch at #{index}: '{code}' expects {expected}, got {found}")]
    TypeMismatch {
        index: usize,
        code: char,
        expected: &'static str,
        found: &'static str,
    },

    /// More values supplied than the format consumes
    #[error("Format consumed {consumed} values but {provided} were provided")]
    UnusedValues { consumed: usize, provided: usize },

    /// More slots supplied than the format fills
    #[error("Format filled {consumed} slots but {provided} were provided")]
    UnusedSlots { consumed: usize, provided: usize },
}

// Helper methods for creating errors
impl StructError {
    pub fn malformed(ch: char, position: usize) -> Self {
        StructError::MalformedFormat { ch, position }
    }

    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        StructError::BufferTooSmall { needed, available }
    }

    /// Check if the format string itself is at fault
    ///
    /// Format errors are reported identically by `calcsize`, `pack` and
    /// `unpack` for the same format.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            StructError::MalformedFormat { .. }
                | StructError::DanglingRepeatCount { .. }
                | StructError::RepeatCountOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            StructError::malformed('z', 3).to_string(),
            "Malformed format: unexpected character 'z' at position 3"
        );
        assert_eq!(
            StructError::buffer_too_small(8, 4).to_string(),
            "Buffer too small: need 8 bytes, have 4"
        );
    }

    #[test]
    fn test_is_format_error() {
        assert!(StructError::malformed('z', 0).is_format_error());
        assert!(StructError::DanglingRepeatCount { position: 1 }.is_format_error());
        assert!(StructError::RepeatCountOverflow { position: 0 }.is_format_error());
        assert!(!StructError::buffer_too_small(1, 0).is_format_error());
        assert!(!StructError::MissingValue { index: 0, code: 'b' }.is_format_error());
    }
}
