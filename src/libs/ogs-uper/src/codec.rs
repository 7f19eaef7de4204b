//! Codec traits and message entry points

use bytes::Bytes;

use crate::config::CodecConfig;
use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::PerResult;

/// Trait for types that can be UPER encoded
///
/// Implemented by every SEQUENCE, CHOICE, ENUMERATED and SEQUENCE OF type
/// in terms of the encoder primitives.
pub trait UperEncode {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()>;
}

/// Trait for types that can be UPER decoded
pub trait UperDecode: Sized {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self>;
}

impl<T: UperEncode + ?Sized> UperEncode for Box<T> {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        (**self).encode_uper(encoder)
    }
}

impl<T: UperDecode> UperDecode for Box<T> {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        T::decode_uper(decoder).map(Box::new)
    }
}

impl<T: UperEncode + ?Sized> UperEncode for &T {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        (**self).encode_uper(encoder)
    }
}

// BOOLEAN

impl UperEncode for bool {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_boolean(*self)
    }
}

impl UperDecode for bool {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        decoder.decode_boolean()
    }
}

// NULL

impl UperEncode for () {
    fn encode_uper(&self, _encoder: &mut UperEncoder) -> PerResult<()> {
        Ok(())
    }
}

impl UperDecode for () {
    fn decode_uper(_decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        Ok(())
    }
}

/// Encode a complete message, padded to an octet boundary.
pub fn encode<T: UperEncode + ?Sized>(value: &T) -> PerResult<Bytes> {
    encode_with_config(value, CodecConfig::default())
}

pub fn encode_with_config<T: UperEncode + ?Sized>(value: &T, config: CodecConfig) -> PerResult<Bytes> {
    config.validate()?;
    let mut encoder = UperEncoder::with_config(config);
    value.encode_uper(&mut encoder)?;
    encoder.align_to_byte()?;
    let bytes = encoder.into_bytes();
    // An empty outermost encoding is sent as one zero octet.
    if bytes.is_empty() {
        return Ok(Bytes::from_static(&[0]));
    }
    Ok(bytes)
}

/// Decode a complete message from the first bit of `data`. Trailing
/// padding is ignored.
pub fn decode<T: UperDecode>(data: &[u8]) -> PerResult<T> {
    decode_with_config(data, CodecConfig::default())
}

pub fn decode_with_config<T: UperDecode>(data: &[u8], config: CodecConfig) -> PerResult<T> {
    config.validate()?;
    let mut decoder = UperDecoder::with_config(data, config);
    T::decode_uper(&mut decoder)
}
