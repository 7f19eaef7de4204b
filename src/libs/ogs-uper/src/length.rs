//! Length determinants and size constraints (X.691 11.9)
//!
//! Counts with an upper bound below 64K are constrained whole numbers (or
//! nothing at all for a fixed size). Everything else uses the general length
//! determinant, fragmented in 16K units once the count reaches 16384.

use std::ops::Range;

use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};
use crate::integer::bits_for_span;

/// 16K: the fragment unit and the first length needing fragmentation.
pub const FRAGMENT_UNIT: usize = 16384;

/// Upper bounds at or above this are encoded as if unconstrained.
const CONSTRAINED_LIMIT: usize = 65536;

/// `SIZE (...)` constraint on a string or SEQUENCE OF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConstraint {
    pub lower: usize,
    pub upper: Option<usize>,
    pub extensible: bool,
}

impl SizeConstraint {
    /// `SIZE (n)`
    pub const fn fixed(n: usize) -> Self {
        Self::bounded(n, n)
    }

    /// `SIZE (lower..upper)`
    pub const fn bounded(lower: usize, upper: usize) -> Self {
        Self {
            lower,
            upper: Some(upper),
            extensible: false,
        }
    }

    /// No size constraint.
    pub const fn unbounded() -> Self {
        Self::at_least(0)
    }

    /// `SIZE (lower..MAX)`
    pub const fn at_least(lower: usize) -> Self {
        Self {
            lower,
            upper: None,
            extensible: false,
        }
    }

    /// `SIZE (..., ...)`
    pub const fn extensible(self) -> Self {
        Self {
            extensible: true,
            ..self
        }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.lower && self.upper.map_or(true, |upper| count <= upper)
    }

    /// The upper bound when the count is sent as a constrained whole number.
    fn constrained_upper(&self) -> Option<usize> {
        self.upper.filter(|&upper| upper < CONSTRAINED_LIMIT && upper >= self.lower)
    }

    fn violation(&self, count: usize) -> PerError {
        let upper = self.upper.map_or(i128::MAX, |upper| upper as i128);
        PerError::out_of_range(count as i128, self.lower as i128, upper)
    }
}

/// One general length determinant as read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthFragment {
    pub len: usize,
    /// Another determinant follows this fragment's items.
    pub more: bool,
}

impl UperEncoder {
    /// Unfragmented general length determinant for `length < 16384`.
    pub fn encode_length_determinant(&mut self, length: usize) -> PerResult<()> {
        if length < 128 {
            self.pack(length as u64, 8)
        } else if length < FRAGMENT_UNIT {
            self.pack(0x8000 | length as u64, 16)
        } else {
            Err(PerError::LengthOverflow {
                length,
                max: FRAGMENT_UNIT - 1,
            })
        }
    }

    /// Write the determinant for `count` items under `size`, calling `emit`
    /// with each run of item indices the determinant covers.
    pub fn encode_sized<F>(&mut self, count: usize, size: &SizeConstraint, mut emit: F) -> PerResult<()>
    where
        F: FnMut(&mut Self, Range<usize>) -> PerResult<()>,
    {
        if size.extensible {
            let in_root = size.contains(count);
            self.pack_bit(!in_root)?;
            if !in_root {
                return self.encode_fragmented(count, emit);
            }
        } else if !size.contains(count) {
            return Err(size.violation(count));
        }

        match size.constrained_upper() {
            Some(upper) => {
                self.pack((count - size.lower) as u64, bits_for_span((upper - size.lower) as u64))?;
                emit(self, 0..count)
            }
            None => self.encode_fragmented(count, emit),
        }
    }

    fn encode_fragmented<F>(&mut self, count: usize, mut emit: F) -> PerResult<()>
    where
        F: FnMut(&mut Self, Range<usize>) -> PerResult<()>,
    {
        let mut start = 0;
        loop {
            let remaining = count - start;
            if remaining < FRAGMENT_UNIT {
                self.encode_length_determinant(remaining)?;
                return emit(self, start..count);
            }
            let units = (remaining / FRAGMENT_UNIT).min(4);
            self.pack(0b11, 2)?;
            self.pack(units as u64, 6)?;
            let end = start + units * FRAGMENT_UNIT;
            emit(self, start..end)?;
            start = end;
        }
    }
}

impl<'a> UperDecoder<'a> {
    pub fn decode_length_fragment(&mut self) -> PerResult<LengthFragment> {
        if !self.unpack_bit()? {
            let len = self.unpack(7)? as usize;
            return Ok(LengthFragment { len, more: false });
        }
        if !self.unpack_bit()? {
            let len = self.unpack(14)? as usize;
            return Ok(LengthFragment { len, more: false });
        }
        let units = self.unpack(6)?;
        if !(1..=4).contains(&units) {
            return Err(PerError::out_of_range(units, 1, 4));
        }
        Ok(LengthFragment {
            len: units as usize * FRAGMENT_UNIT,
            more: true,
        })
    }

    /// Unfragmented general length determinant.
    pub fn decode_length_determinant(&mut self) -> PerResult<usize> {
        let fragment = self.decode_length_fragment()?;
        if fragment.more {
            return Err(PerError::LengthOverflow {
                length: fragment.len,
                max: FRAGMENT_UNIT - 1,
            });
        }
        Ok(fragment.len)
    }

    /// Read the determinant(s) for a count under `size`, calling `consume`
    /// with the number of items each one covers. Returns the total count.
    ///
    /// Counts above the declared upper bound or the configured `max_length`
    /// are `LengthOverflow`, detected before `consume` runs.
    pub fn decode_sized<F>(&mut self, size: &SizeConstraint, mut consume: F) -> PerResult<usize>
    where
        F: FnMut(&mut Self, usize) -> PerResult<()>,
    {
        let max_length = self.config().max_length;

        if size.extensible && self.unpack_bit()? {
            return self.decode_fragmented(max_length, consume);
        }

        match size.constrained_upper() {
            Some(upper) => {
                let span = (upper - size.lower) as u64;
                let count = size.lower + self.unpack(bits_for_span(span))? as usize;
                if count > upper {
                    return Err(PerError::LengthOverflow { length: count, max: upper });
                }
                if count > max_length {
                    return Err(PerError::LengthOverflow {
                        length: count,
                        max: max_length,
                    });
                }
                consume(self, count)?;
                Ok(count)
            }
            None => {
                let cap = size.upper.map_or(max_length, |upper| upper.min(max_length));
                let count = self.decode_fragmented(cap, consume)?;
                if count < size.lower {
                    return Err(size.violation(count));
                }
                Ok(count)
            }
        }
    }

    fn decode_fragmented<F>(&mut self, cap: usize, mut consume: F) -> PerResult<usize>
    where
        F: FnMut(&mut Self, usize) -> PerResult<()>,
    {
        let mut total: usize = 0;
        loop {
            let fragment = self.decode_length_fragment()?;
            total = total.saturating_add(fragment.len);
            if total > cap {
                return Err(PerError::LengthOverflow { length: total, max: cap });
            }
            consume(self, fragment.len)?;
            if !fragment.more {
                return Ok(total);
            }
        }
    }
}
