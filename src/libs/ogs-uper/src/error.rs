//! UPER codec errors

use thiserror::Error;

/// PER codec errors
///
/// Every primitive returns one of these instead of panicking. Generated
/// `encode_uper`/`decode_uper` methods propagate the first one with `?`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerError {
    /// The encoder would grow past its declared capacity.
    #[error("Out of space: cannot write {needed} bits, {available} left")]
    OutOfSpace { needed: usize, available: usize },

    /// Fewer bits remain in the input than the operation requires.
    #[error("Buffer underrun: need {needed} bits, have {available}")]
    Underrun { needed: usize, available: usize },

    /// A decoded count or length exceeds its declared or configured maximum.
    #[error("Length {length} exceeds maximum {max}")]
    LengthOverflow { length: usize, max: usize },

    /// A CHOICE discriminant outside the known alternatives.
    #[error("Invalid choice index: {index} (max {max})")]
    InvalidChoiceTag { index: usize, max: usize },

    /// A constrained value (or enumeration index) outside its bounds.
    #[error("Value {value} not in range {lower}..={upper}")]
    ValueOutOfRange { value: i128, lower: i128, upper: i128 },

    /// An open-type block whose declared length disagrees with its content.
    #[error("Malformed extension: declared {declared_bits} bits, content used {consumed_bits}")]
    MalformedExtension {
        declared_bits: usize,
        consumed_bits: usize,
    },

    /// A character string with a character outside its alphabet.
    #[error("Invalid string: {0}")]
    InvalidString(String),

    /// Encoding an enumeration or choice that holds no value.
    #[error("Cannot encode empty value of {0}")]
    NullValue(&'static str),

    /// A present IE whose id is missing from its container's registry.
    #[error("Unregistered protocol IE id {id}")]
    UnregisteredIe { id: u16 },

    /// Nested CHOICE values deeper than the configured limit.
    #[error("Nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PerError {
    /// True when a decoder may resynchronise at the enclosing
    /// length-prefixed boundary and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PerError::MalformedExtension { .. })
    }

    pub(crate) fn out_of_range(value: impl Into<i128>, lower: impl Into<i128>, upper: impl Into<i128>) -> Self {
        PerError::ValueOutOfRange {
            value: value.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

pub type PerResult<T> = Result<T, PerError>;
