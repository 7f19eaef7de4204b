//! Common protocol IE types
//!
//! From the common definitions shared by the 3GPP application protocols
//! (NRPPa, F1AP, NGAP ...), used by every ProtocolIE container.

use crate::codec::{UperDecode, UperEncode};
use crate::cursor::{UperDecoder, UperEncoder};
use crate::enumerated::Enumerated;
use crate::error::PerResult;
use crate::integer::Constraint;

/// Criticality - indicates how to handle unrecognized IEs
/// ASN.1: Criticality ::= ENUMERATED { reject, ignore, notify }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Criticality {
    Reject = 0,
    Ignore = 1,
    Notify = 2,
}

impl Enumerated for Criticality {
    const NAME: &'static str = "Criticality";
    const ROOT_COUNT: u32 = 3;

    fn index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Criticality::Reject),
            1 => Some(Criticality::Ignore),
            2 => Some(Criticality::Notify),
            _ => None,
        }
    }
}

impl UperEncode for Criticality {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_enum(*self)
    }
}

impl UperDecode for Criticality {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        decoder.decode_known_enum()
    }
}

/// Presence - whether an IE is required in its container
/// ASN.1: Presence ::= ENUMERATED { optional, conditional, mandatory }
///
/// Only carried by the IE registries; never on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Optional,
    Conditional,
    Mandatory,
}

/// ProtocolIE-ID - identifies the Information Element
/// ASN.1: ProtocolIE-ID ::= INTEGER (0..maxProtocolIEs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolIeId(pub u16);

impl ProtocolIeId {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 65535);
}

impl UperEncode for ProtocolIeId {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_integer(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl UperDecode for ProtocolIeId {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let value = decoder.decode_integer(&Self::CONSTRAINT)?;
        Ok(ProtocolIeId(value as u16))
    }
}
