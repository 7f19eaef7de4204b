//! BIT STRING, OCTET STRING, character strings and SEQUENCE OF

use bitvec::prelude::*;

use crate::codec::{UperDecode, UperEncode};
use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};
use crate::length::SizeConstraint;

/// Known-multiplier character string types used by the protocol family.
/// Both send each character as its 7-bit code in UPER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSet {
    Printable,
    Visible,
}

impl CharacterSet {
    pub const BITS_PER_CHAR: usize = 7;

    pub fn name(self) -> &'static str {
        match self {
            CharacterSet::Printable => "PrintableString",
            CharacterSet::Visible => "VisibleString",
        }
    }

    pub fn permits(self, c: u8) -> bool {
        match self {
            CharacterSet::Printable => {
                c.is_ascii_alphanumeric()
                    || matches!(c, b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?')
            }
            CharacterSet::Visible => (0x20..=0x7E).contains(&c),
        }
    }

    fn check(self, c: u8) -> PerResult<()> {
        if self.permits(c) {
            Ok(())
        } else {
            Err(PerError::InvalidString(format!(
                "character {:#04x} not permitted in {}",
                c,
                self.name()
            )))
        }
    }
}

impl UperEncoder {
    pub fn encode_octet_string(&mut self, data: &[u8], size: &SizeConstraint) -> PerResult<()> {
        self.encode_sized(data.len(), size, |enc, range| enc.pack_bytes(&data[range]))
    }

    pub fn encode_bit_string(&mut self, bits: &BitSlice<u8, Msb0>, size: &SizeConstraint) -> PerResult<()> {
        self.encode_sized(bits.len(), size, |enc, range| enc.pack_bits(&bits[range]))
    }

    /// PrintableString / VisibleString. The whole string is validated before
    /// anything is written.
    pub fn encode_known_multiplier_string(
        &mut self,
        value: &str,
        charset: CharacterSet,
        size: &SizeConstraint,
    ) -> PerResult<()> {
        let chars = value.as_bytes();
        for &c in chars {
            charset.check(c)?;
        }
        self.encode_sized(chars.len(), size, |enc, range| {
            for &c in &chars[range] {
                enc.pack(c as u64, CharacterSet::BITS_PER_CHAR)?;
            }
            Ok(())
        })
    }

    pub fn encode_sequence_of<T: UperEncode>(&mut self, items: &[T], size: &SizeConstraint) -> PerResult<()> {
        self.encode_sized(items.len(), size, |enc, range| {
            for item in &items[range] {
                item.encode_uper(enc)?;
            }
            Ok(())
        })
    }
}

impl<'a> UperDecoder<'a> {
    pub fn decode_octet_string(&mut self, size: &SizeConstraint) -> PerResult<Vec<u8>> {
        let mut data = Vec::new();
        self.decode_sized(size, |dec, n| {
            data.extend_from_slice(&dec.unpack_bytes(n)?);
            Ok(())
        })?;
        Ok(data)
    }

    pub fn decode_bit_string(&mut self, size: &SizeConstraint) -> PerResult<BitVec<u8, Msb0>> {
        let mut bits = BitVec::new();
        self.decode_sized(size, |dec, n| {
            bits.extend_from_bitslice(&dec.unpack_bits(n)?);
            Ok(())
        })?;
        Ok(bits)
    }

    pub fn decode_known_multiplier_string(&mut self, charset: CharacterSet, size: &SizeConstraint) -> PerResult<String> {
        let mut value = String::new();
        self.decode_sized(size, |dec, n| {
            value.reserve(n.min(dec.remaining_bits() / CharacterSet::BITS_PER_CHAR));
            for _ in 0..n {
                let c = dec.unpack(CharacterSet::BITS_PER_CHAR)? as u8;
                charset.check(c)?;
                value.push(c as char);
            }
            Ok(())
        })?;
        Ok(value)
    }

    pub fn decode_sequence_of<T: UperDecode>(&mut self, size: &SizeConstraint) -> PerResult<Vec<T>> {
        let mut items = Vec::new();
        self.decode_sized(size, |dec, n| {
            // Items may be zero-width, so the count is not a safe capacity.
            items.reserve(n.min(dec.remaining_bits()));
            for _ in 0..n {
                items.push(dec.nested(T::decode_uper)?);
            }
            Ok(())
        })?;
        Ok(items)
    }
}
