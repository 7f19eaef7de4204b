//! SEQUENCE preamble: extension marker and optional-field bitmap
//!
//! A generated SEQUENCE writes its marker (if extensible) and then one bit
//! per OPTIONAL/DEFAULT root field in declaration order, before any field
//! value. The bitmap width is fixed by the type and never length-prefixed.

use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::PerResult;

impl UperEncoder {
    pub fn encode_extension_marker(&mut self, extended: bool) -> PerResult<()> {
        self.pack_bit(extended)
    }

    pub fn encode_presence(&mut self, present: &[bool]) -> PerResult<()> {
        for &bit in present {
            self.pack_bit(bit)?;
        }
        Ok(())
    }
}

impl<'a> UperDecoder<'a> {
    pub fn decode_extension_marker(&mut self) -> PerResult<bool> {
        self.unpack_bit()
    }

    /// Read the presence bits of a SEQUENCE with `N` optional root fields.
    pub fn decode_presence<const N: usize>(&mut self) -> PerResult<[bool; N]> {
        let mut present = [false; N];
        for bit in present.iter_mut() {
            *bit = self.unpack_bit()?;
        }
        Ok(present)
    }
}
