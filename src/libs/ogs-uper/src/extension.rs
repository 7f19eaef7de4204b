//! Open types and SEQUENCE extension groups (X.691 clauses 10.2, 19.6 to 19.9)
//!
//! Every extension addition travels as an open type: its encoding padded to
//! whole octets behind a general length determinant. A decoder that does not
//! know an addition skips it by length and stays in sync.

use bitvec::prelude::*;
use bytes::Bytes;

use crate::codec::{UperDecode, UperEncode};
use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};
use crate::length::SizeConstraint;

const OPEN_TYPE_SIZE: SizeConstraint = SizeConstraint::unbounded();

impl UperEncoder {
    /// Encode whatever `encode` writes as an open type. Empty contents are
    /// sent as a single zero octet.
    pub fn encode_open_type<F>(&mut self, encode: F) -> PerResult<()>
    where
        F: FnOnce(&mut UperEncoder) -> PerResult<()>,
    {
        let mut scratch = self.scratch();
        encode(&mut scratch)?;
        let mut octets = scratch.into_bytes();
        if octets.is_empty() {
            octets = Bytes::from_static(&[0]);
        }
        self.encode_open_type_bytes(&octets)
    }

    pub fn encode_open_type_value<T: UperEncode + ?Sized>(&mut self, value: &T) -> PerResult<()> {
        self.encode_open_type(|encoder| value.encode_uper(encoder))
    }

    /// Emit already-encoded open type contents.
    pub fn encode_open_type_bytes(&mut self, octets: &[u8]) -> PerResult<()> {
        self.encode_octet_string(octets, &OPEN_TYPE_SIZE)
    }
}

impl<'a> UperDecoder<'a> {
    /// Decode an open type with `decode`, which sees a decoder bounded to the
    /// declared octets.
    ///
    /// A declared length past the end of the input is `Underrun`. Contents
    /// that overrun the declared length, or leave a whole octet or more
    /// unread, are `MalformedExtension`; either way this decoder has already
    /// moved past the block.
    pub fn decode_open_type<T, F>(&mut self, decode: F) -> PerResult<T>
    where
        F: FnOnce(&mut UperDecoder<'_>) -> PerResult<T>,
    {
        let mut blocks = Vec::with_capacity(1);
        self.decode_sized(&OPEN_TYPE_SIZE, |dec, n| {
            blocks.push(dec.block(n)?);
            Ok(())
        })?;

        if blocks.len() == 1 {
            if let Some(mut block) = blocks.pop() {
                return decode_block(&mut block, decode);
            }
        }

        // Fragmented contents are joined into one owned buffer.
        let mut joined: BitVec<u8, Msb0> = BitVec::new();
        for block in &blocks {
            joined.extend_from_bitslice(block.remaining_slice());
        }
        let mut block = UperDecoder::from_bits(&joined, *self.config()).at_depth(self.depth());
        decode_block(&mut block, decode)
    }

    pub fn decode_open_type_value<T: UperDecode>(&mut self) -> PerResult<T> {
        self.decode_open_type(T::decode_uper)
    }

    /// Open type contents as raw octets.
    pub fn decode_open_type_bytes(&mut self) -> PerResult<Vec<u8>> {
        self.decode_octet_string(&OPEN_TYPE_SIZE)
    }

    /// Skip an open type, returning its length in octets.
    pub fn skip_open_type(&mut self) -> PerResult<usize> {
        self.decode_sized(&OPEN_TYPE_SIZE, |dec, n| dec.block(n).map(|_| ()))
    }
}

fn decode_block<T, F>(block: &mut UperDecoder<'_>, decode: F) -> PerResult<T>
where
    F: FnOnce(&mut UperDecoder<'_>) -> PerResult<T>,
{
    let declared_bits = block.remaining_bits();
    let result = block.nested(decode);
    let consumed_bits = block.bit_position();
    let malformed = PerError::MalformedExtension {
        declared_bits,
        consumed_bits,
    };

    match result {
        Err(PerError::Underrun { .. }) => Err(malformed),
        Err(err) => Err(err),
        Ok(value) => {
            let unread = declared_bits - consumed_bits;
            let empty_contents = consumed_bits == 0 && declared_bits == 8;
            if unread < 8 || empty_contents {
                Ok(value)
            } else {
                Err(malformed)
            }
        }
    }
}

/// Encoder side of a SEQUENCE's extension additions, listed in version
/// order. Trailing absent groups are not transmitted.
///
/// The SEQUENCE writes `any_present()` as its extension marker before its
/// root fields, and calls `encode` after them.
#[derive(Default)]
pub struct ExtensionGroups<'v> {
    groups: Vec<Option<&'v dyn UperEncode>>,
}

impl<'v> ExtensionGroups<'v> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group<G: UperEncode>(mut self, group: Option<&'v G>) -> Self {
        self.groups.push(group.map(|g| g as &dyn UperEncode));
        self
    }

    pub fn any_present(&self) -> bool {
        self.groups.iter().any(Option::is_some)
    }

    pub fn encode(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        let count = match self.groups.iter().rposition(Option::is_some) {
            Some(last) => last + 1,
            None => return Ok(()),
        };
        let groups = &self.groups[..count];

        encoder.encode_normally_small_non_negative((count - 1) as u64)?;
        for group in groups {
            encoder.pack_bit(group.is_some())?;
        }
        for group in groups.iter().flatten() {
            encoder.encode_open_type(|inner| group.encode_uper(inner))?;
        }
        Ok(())
    }
}

/// Decoder side of a SEQUENCE's extension additions.
///
/// Built from the bitmap that follows the root fields, then asked for each
/// locally known group in version order. `finish` skips whatever the sender
/// included beyond those.
#[derive(Debug, Default)]
pub struct ExtensionGroupsDecoder {
    present: Vec<bool>,
    next: usize,
}

impl ExtensionGroupsDecoder {
    /// For a SEQUENCE whose extension marker was 0.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Read the group-presence bitmap.
    pub fn decode(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let count = decoder.decode_normally_small_non_negative()?.saturating_add(1);
        let max = decoder.config().max_length;
        if count > max as u64 {
            return Err(PerError::LengthOverflow {
                length: usize::try_from(count).unwrap_or(usize::MAX),
                max,
            });
        }

        let count = count as usize;
        let mut present = Vec::with_capacity(count.min(decoder.remaining_bits()));
        for _ in 0..count {
            present.push(decoder.unpack_bit()?);
        }
        Ok(Self { present, next: 0 })
    }

    /// Number of groups the sender signalled, known or not.
    pub fn signalled(&self) -> usize {
        self.present.len()
    }

    /// Decode the next locally known group, `None` if the sender left it out.
    ///
    /// Under `MalformedExtensionPolicy::Skip` a malformed group also yields
    /// `None`, and decoding resumes after it.
    pub fn group<G: UperDecode>(&mut self, decoder: &mut UperDecoder<'_>) -> PerResult<Option<G>> {
        let index = self.next;
        self.next += 1;
        if !self.present.get(index).copied().unwrap_or(false) {
            return Ok(None);
        }

        match decoder.decode_open_type(G::decode_uper) {
            Ok(group) => Ok(Some(group)),
            Err(err) if err.is_recoverable() && decoder.config().skip_malformed() => {
                log::debug!("Skipping malformed extension group {}: {}", index, err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Skip the present groups this build does not know. Returns how many
    /// were skipped.
    pub fn finish(self, decoder: &mut UperDecoder<'_>) -> PerResult<usize> {
        let mut skipped = 0;
        for (index, _) in self
            .present
            .iter()
            .enumerate()
            .skip(self.next)
            .filter(|(_, present)| **present)
        {
            let octets = decoder.skip_open_type()?;
            log::debug!("Skipped unknown extension group {} ({} octets)", index, octets);
            skipped += 1;
        }
        Ok(skipped)
    }
}
