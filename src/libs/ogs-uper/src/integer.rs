//! INTEGER and BOOLEAN encoding (X.691 clauses 11.3 to 11.6, 12, 13)

use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};

/// Constraint definition for constrained integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub min: i64,
    pub max: i64,
    pub extensible: bool,
}

impl Constraint {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max, extensible: false }
    }

    /// `INTEGER (min..max, ...)`
    pub const fn extensible(min: i64, max: i64) -> Self {
        Self { min, max, extensible: true }
    }

    /// Number of values in the range, 0 for an inverted constraint.
    pub const fn range(&self) -> u128 {
        if self.max >= self.min {
            (self.max as i128 - self.min as i128) as u128 + 1
        } else {
            0
        }
    }

    /// Calculate bits needed to encode values in this range
    pub const fn bits_needed(&self) -> usize {
        let range = self.range();
        if range <= 1 {
            0
        } else {
            (128 - (range - 1).leading_zeros()) as usize
        }
    }

    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Bits needed for a constrained whole number in `0..=span`.
pub(crate) const fn bits_for_span(span: u64) -> usize {
    (64 - span.leading_zeros()) as usize
}

/// Minimal octets holding `value` as a non-negative binary integer.
fn unsigned_octets(value: u64) -> usize {
    (bits_for_span(value).max(1) + 7) / 8
}

/// Minimal octets holding `value` in two's complement.
fn signed_octets(value: i64) -> usize {
    let magnitude = (if value < 0 { !value } else { value }) as u64;
    (bits_for_span(magnitude) + 1 + 7) / 8
}

impl UperEncoder {
    /// Encode a constrained whole number, extensible or not.
    pub fn encode_integer(&mut self, value: i64, constraint: &Constraint) -> PerResult<()> {
        if constraint.extensible {
            let in_root = constraint.contains(value);
            self.pack_bit(!in_root)?;
            if !in_root {
                return self.encode_unconstrained_whole_number(value);
            }
        } else if !constraint.contains(value) {
            return Err(PerError::out_of_range(value, constraint.min, constraint.max));
        }

        let offset = (value as i128 - constraint.min as i128) as u64;
        self.pack(offset, constraint.bits_needed())
    }

    /// Encode a constrained whole number in `[lower, upper]`.
    pub fn encode_constrained_whole_number(&mut self, value: i64, lower: i64, upper: i64) -> PerResult<()> {
        self.encode_integer(value, &Constraint::new(lower, upper))
    }

    /// `INTEGER (lower..MAX)`: `value - lower` in minimal octets after an
    /// octet-count determinant.
    pub fn encode_semi_constrained_whole_number(&mut self, value: i64, lower: i64) -> PerResult<()> {
        if value < lower {
            return Err(PerError::out_of_range(value, lower, i64::MAX));
        }
        let offset = (value as i128 - lower as i128) as u64;
        self.encode_non_negative_binary(offset)
    }

    /// Unconstrained INTEGER: minimal two's complement octets after an
    /// octet-count determinant.
    pub fn encode_unconstrained_whole_number(&mut self, value: i64) -> PerResult<()> {
        let octets = signed_octets(value);
        self.encode_length_determinant(octets)?;
        self.pack(value as u64, octets * 8)
    }

    fn encode_non_negative_binary(&mut self, value: u64) -> PerResult<()> {
        let octets = unsigned_octets(value);
        self.encode_length_determinant(octets)?;
        self.pack(value, octets * 8)
    }

    /// Normally small non-negative whole number (X.691 11.6)
    pub fn encode_normally_small_non_negative(&mut self, value: u64) -> PerResult<()> {
        if value <= 63 {
            self.pack_bit(false)?;
            self.pack(value, 6)
        } else {
            self.pack_bit(true)?;
            self.encode_non_negative_binary(value)
        }
    }

    pub fn encode_boolean(&mut self, value: bool) -> PerResult<()> {
        self.pack_bit(value)
    }
}

impl<'a> UperDecoder<'a> {
    /// Decode a constrained whole number, extensible or not. A raw offset
    /// past the upper bound is `ValueOutOfRange`.
    pub fn decode_integer(&mut self, constraint: &Constraint) -> PerResult<i64> {
        if constraint.extensible && self.unpack_bit()? {
            return self.decode_unconstrained_whole_number();
        }

        let range = constraint.range();
        if range == 0 {
            return Err(PerError::out_of_range(constraint.min, constraint.min, constraint.max));
        }
        let offset = self.unpack(constraint.bits_needed())?;
        let value = constraint.min as i128 + offset as i128;
        if offset as u128 >= range {
            return Err(PerError::out_of_range(value, constraint.min, constraint.max));
        }
        Ok(value as i64)
    }

    pub fn decode_constrained_whole_number(&mut self, lower: i64, upper: i64) -> PerResult<i64> {
        self.decode_integer(&Constraint::new(lower, upper))
    }

    pub fn decode_semi_constrained_whole_number(&mut self, lower: i64) -> PerResult<i64> {
        let offset = self.decode_non_negative_binary()?;
        let value = lower as i128 + offset as i128;
        i64::try_from(value).map_err(|_| PerError::out_of_range(value, lower, i64::MAX))
    }

    pub fn decode_unconstrained_whole_number(&mut self) -> PerResult<i64> {
        let octets = self.decode_integer_octet_count()?;
        if octets == 0 {
            return Ok(0);
        }
        let bits = octets * 8;
        let raw = self.unpack(bits)?;
        // Sign-extend from the top transmitted bit.
        let shift = 64 - bits;
        Ok(((raw << shift) as i64) >> shift)
    }

    fn decode_non_negative_binary(&mut self) -> PerResult<u64> {
        let octets = self.decode_integer_octet_count()?;
        self.unpack(octets * 8)
    }

    fn decode_integer_octet_count(&mut self) -> PerResult<usize> {
        let octets = self.decode_length_determinant()?;
        if octets > 8 {
            return Err(PerError::LengthOverflow { length: octets, max: 8 });
        }
        Ok(octets)
    }

    /// Normally small non-negative whole number (X.691 11.6)
    pub fn decode_normally_small_non_negative(&mut self) -> PerResult<u64> {
        if self.unpack_bit()? {
            self.decode_non_negative_binary()
        } else {
            self.unpack(6)
        }
    }

    pub fn decode_boolean(&mut self) -> PerResult<bool> {
        self.unpack_bit()
    }
}
