//! ENUMERATED encoding (X.691 clause 14)
//!
//! Root values are a constrained index over the root list. On an extensible
//! type a leading bit marks values past the root, whose offset from the root
//! count follows as a normally small number. Values this build does not know
//! decode to `EnumValue::Unknown` rather than failing.

use crate::codec::{UperDecode, UperEncode};
use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};
use crate::integer::bits_for_span;

/// A generated ENUMERATED type.
///
/// `index` numbers root values from 0 and extension values from
/// `ROOT_COUNT`, in declaration order.
pub trait Enumerated: Copy + Sized {
    const NAME: &'static str;
    const ROOT_COUNT: u32;
    const EXTENSIBLE: bool = false;
    /// Extension values declared by the schema this build was generated from.
    const EXTENSION_COUNT: u32 = 0;

    fn index(self) -> u32;
    fn from_index(index: u32) -> Option<Self>;
}

/// A decoded enumeration value, possibly from a later schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue<E> {
    Known(E),
    /// Extension index beyond the locally known values.
    Unknown(u32),
}

impl<E: Enumerated> EnumValue<E> {
    pub fn known(self) -> Option<E> {
        match self {
            EnumValue::Known(value) => Some(value),
            EnumValue::Unknown(_) => None,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            EnumValue::Known(value) => value.index(),
            EnumValue::Unknown(index) => index,
        }
    }
}

impl<E> From<E> for EnumValue<E> {
    fn from(value: E) -> Self {
        EnumValue::Known(value)
    }
}

impl UperEncoder {
    /// Encode an enumeration index
    pub fn encode_enumerated_index(&mut self, index: u32, root_count: u32, extensible: bool) -> PerResult<()> {
        if index < root_count {
            if extensible {
                self.pack_bit(false)?;
            }
            return self.pack(index as u64, bits_for_span((root_count - 1) as u64));
        }
        if !extensible {
            return Err(PerError::out_of_range(index, 0, root_count.saturating_sub(1)));
        }
        self.pack_bit(true)?;
        self.encode_normally_small_non_negative((index - root_count) as u64)
    }

    pub fn encode_enum<E: Enumerated>(&mut self, value: E) -> PerResult<()> {
        self.encode_enumerated_index(value.index(), E::ROOT_COUNT, E::EXTENSIBLE)
    }

    /// Encode an enumeration that may still hold no value.
    pub fn encode_enum_or_null<E: Enumerated>(&mut self, value: Option<E>) -> PerResult<()> {
        match value {
            Some(value) => self.encode_enum(value),
            None => Err(PerError::NullValue(E::NAME)),
        }
    }
}

impl<'a> UperDecoder<'a> {
    /// Decode an enumeration index, counting extension values from
    /// `root_count`.
    pub fn decode_enumerated_index(&mut self, root_count: u32, extensible: bool) -> PerResult<u32> {
        if extensible && self.unpack_bit()? {
            let offset = self.decode_normally_small_non_negative()?;
            let index = root_count as u64 + offset;
            return u32::try_from(index).map_err(|_| PerError::out_of_range(index, root_count, u32::MAX));
        }
        if root_count == 0 {
            return Err(PerError::out_of_range(0, 0, -1));
        }
        let index = self.unpack(bits_for_span((root_count - 1) as u64))?;
        if index >= root_count as u64 {
            return Err(PerError::out_of_range(index, 0, root_count - 1));
        }
        Ok(index as u32)
    }

    pub fn decode_enum<E: Enumerated>(&mut self) -> PerResult<EnumValue<E>> {
        let index = self.decode_enumerated_index(E::ROOT_COUNT, E::EXTENSIBLE)?;
        match E::from_index(index) {
            Some(value) => Ok(EnumValue::Known(value)),
            None if index >= E::ROOT_COUNT => Ok(EnumValue::Unknown(index)),
            None => Err(PerError::out_of_range(index, 0, E::ROOT_COUNT - 1)),
        }
    }

    /// Decode an enumeration whose unknown extension values are an error.
    pub fn decode_known_enum<E: Enumerated>(&mut self) -> PerResult<E> {
        match self.decode_enum::<E>()? {
            EnumValue::Known(value) => Ok(value),
            EnumValue::Unknown(index) => Err(PerError::out_of_range(
                index,
                0,
                (E::ROOT_COUNT + E::EXTENSION_COUNT).saturating_sub(1),
            )),
        }
    }
}

impl<E: Enumerated> UperEncode for EnumValue<E> {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        match *self {
            EnumValue::Known(value) => encoder.encode_enum(value),
            EnumValue::Unknown(index) => encoder.encode_enumerated_index(index, E::ROOT_COUNT, E::EXTENSIBLE),
        }
    }
}

impl<E: Enumerated> UperDecode for EnumValue<E> {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        decoder.decode_enum()
    }
}
