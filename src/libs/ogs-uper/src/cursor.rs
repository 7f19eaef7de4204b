//! Bit cursors
//!
//! `UperEncoder` appends bits MSB first into an owned, capacity-limited
//! buffer. `UperDecoder` consumes bits MSB first from a borrowed buffer.
//! Neither supports seeking backwards.

use bitvec::prelude::*;
use bytes::Bytes;

use crate::config::CodecConfig;
use crate::error::{PerError, PerResult};

/// UPER (Unaligned PER) Encoder
#[derive(Debug)]
pub struct UperEncoder {
    buffer: BitVec<u8, Msb0>,
    capacity_bits: usize,
    config: CodecConfig,
}

impl UperEncoder {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            buffer: BitVec::new(),
            capacity_bits: config.max_message_bytes.saturating_mul(8),
            config,
        }
    }

    /// Encoder that refuses to grow past `bytes` octets.
    pub fn with_capacity(bytes: usize) -> Self {
        let config = CodecConfig {
            max_message_bytes: bytes,
            ..CodecConfig::default()
        };
        Self::with_config(config)
    }

    /// Empty encoder sharing this one's config, limited to the space this one
    /// has left. Used to build open-type contents before their length is known.
    pub(crate) fn scratch(&self) -> Self {
        Self {
            buffer: BitVec::new(),
            capacity_bits: self.remaining_bits(),
            config: self.config,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Get current bit position
    pub fn bit_position(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity_bits(&self) -> usize {
        self.capacity_bits
    }

    pub fn remaining_bits(&self) -> usize {
        self.capacity_bits.saturating_sub(self.buffer.len())
    }

    /// Octets touched so far, counting a partial trailing octet.
    pub fn bytes_written(&self) -> usize {
        (self.buffer.len() + 7) / 8
    }

    fn reserve(&self, needed: usize) -> PerResult<()> {
        let available = self.remaining_bits();
        if needed > available {
            return Err(PerError::OutOfSpace { needed, available });
        }
        Ok(())
    }

    /// Write the low `nbits` bits of `value`, most significant first.
    pub fn pack(&mut self, value: u64, nbits: usize) -> PerResult<()> {
        if nbits > 64 {
            return Err(PerError::out_of_range(nbits as i128, 0, 64));
        }
        self.reserve(nbits)?;
        self.buffer
            .extend_from_bitslice(&value.view_bits::<Msb0>()[64 - nbits..]);
        Ok(())
    }

    pub fn pack_bit(&mut self, bit: bool) -> PerResult<()> {
        self.reserve(1)?;
        self.buffer.push(bit);
        Ok(())
    }

    /// Write raw octets at the current (possibly unaligned) position.
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> PerResult<()> {
        self.reserve(bytes.len().saturating_mul(8))?;
        self.buffer.extend_from_bitslice(bytes.view_bits::<Msb0>());
        Ok(())
    }

    pub fn pack_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> PerResult<()> {
        self.reserve(bits.len())?;
        self.buffer.extend_from_bitslice(bits);
        Ok(())
    }

    /// Pad with zero bits up to the next octet boundary.
    pub fn align_to_byte(&mut self) -> PerResult<()> {
        let remainder = self.buffer.len() % 8;
        if remainder != 0 {
            self.pack(0, 8 - remainder)?;
        }
        Ok(())
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.buffer
    }

    /// Get the encoded bytes, zero-padded to an octet boundary.
    pub fn into_bytes(self) -> Bytes {
        let mut buffer = self.buffer;
        let remainder = buffer.len() % 8;
        if remainder != 0 {
            let padded = buffer.len() + 8 - remainder;
            buffer.resize(padded, false);
        }
        Bytes::from(buffer.into_vec())
    }
}

impl Default for UperEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// UPER (Unaligned PER) Decoder
#[derive(Debug)]
pub struct UperDecoder<'a> {
    data: &'a BitSlice<u8, Msb0>,
    position: usize,
    depth: usize,
    config: CodecConfig,
}

impl<'a> UperDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, CodecConfig::default())
    }

    pub fn with_config(data: &'a [u8], config: CodecConfig) -> Self {
        Self::from_bits(BitSlice::from_slice(data), config)
    }

    pub fn from_bits(data: &'a BitSlice<u8, Msb0>, config: CodecConfig) -> Self {
        Self {
            data,
            position: 0,
            depth: 0,
            config,
        }
    }

    /// Same decoder, starting at nesting level `depth`.
    pub(crate) fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one nesting level deeper, failing with `TooDeep` past the
    /// configured limit.
    pub fn nested<T, F>(&mut self, f: F) -> PerResult<T>
    where
        F: FnOnce(&mut Self) -> PerResult<T>,
    {
        if self.depth >= self.config.max_depth {
            return Err(PerError::TooDeep {
                max: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = f(&mut *self);
        self.depth -= 1;
        result
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Get current bit position
    pub fn bit_position(&self) -> usize {
        self.position
    }

    /// Get remaining bits
    pub fn remaining_bits(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.data.len()
    }

    /// The bits not yet consumed.
    pub fn remaining_slice(&self) -> &'a BitSlice<u8, Msb0> {
        let data: &'a BitSlice<u8, Msb0> = self.data;
        &data[self.position..]
    }

    fn need(&self, needed: usize) -> PerResult<()> {
        let available = self.remaining_bits();
        if needed > available {
            return Err(PerError::Underrun { needed, available });
        }
        Ok(())
    }

    /// Read `nbits` bits as a value (MSB first)
    pub fn unpack(&mut self, nbits: usize) -> PerResult<u64> {
        if nbits > 64 {
            return Err(PerError::out_of_range(nbits as i128, 0, 64));
        }
        self.need(nbits)?;

        let mut value: u64 = 0;
        for _ in 0..nbits {
            value = (value << 1) | (self.data[self.position] as u64);
            self.position += 1;
        }
        Ok(value)
    }

    pub fn unpack_bit(&mut self) -> PerResult<bool> {
        self.need(1)?;
        let bit = self.data[self.position];
        self.position += 1;
        Ok(bit)
    }

    /// Read raw octets. The whole span is checked before anything is
    /// allocated, so a hostile length cannot force a large allocation.
    pub fn unpack_bytes(&mut self, num_bytes: usize) -> PerResult<Vec<u8>> {
        let nbits = num_bytes.checked_mul(8).ok_or(PerError::Underrun {
            needed: usize::MAX,
            available: self.remaining_bits(),
        })?;
        self.need(nbits)?;

        let mut bytes = Vec::with_capacity(num_bytes);
        for _ in 0..num_bytes {
            bytes.push(self.unpack(8)? as u8);
        }
        Ok(bytes)
    }

    pub fn unpack_bits(&mut self, nbits: usize) -> PerResult<BitVec<u8, Msb0>> {
        self.need(nbits)?;
        let bits = self.data[self.position..self.position + nbits].to_bitvec();
        self.position += nbits;
        Ok(bits)
    }

    /// Move forward `nbits` without interpreting them.
    pub fn skip(&mut self, nbits: usize) -> PerResult<()> {
        self.need(nbits)?;
        self.position += nbits;
        Ok(())
    }

    /// Discard bits up to the next octet boundary. Padding is not validated.
    pub fn align_to_byte(&mut self) {
        let remainder = self.position % 8;
        if remainder != 0 {
            self.position = (self.position + 8 - remainder).min(self.data.len());
        }
    }

    /// Carve out a decoder over exactly the next `num_bytes` octets and move
    /// this decoder past them.
    pub fn block(&mut self, num_bytes: usize) -> PerResult<UperDecoder<'a>> {
        let nbits = num_bytes.checked_mul(8).ok_or(PerError::Underrun {
            needed: usize::MAX,
            available: self.remaining_bits(),
        })?;
        self.need(nbits)?;

        let data: &'a BitSlice<u8, Msb0> = self.data;
        let inner = &data[self.position..self.position + nbits];
        self.position += nbits;
        Ok(UperDecoder::from_bits(inner, self.config).at_depth(self.depth))
    }
}
