//! Protocol IE containers
//!
//! ProtocolIE-Container, ProtocolExtensionContainer and
//! ProtocolIE-SingleContainer. Each field is (id, criticality, open type).
//! Values are typed through the container's `IeRegistry`; fields with ids
//! the registry does not know are kept raw or dropped per `UnknownIePolicy`.

use crate::codec::{UperDecode, UperEncode};
use crate::config::UnknownIePolicy;
use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};
use crate::length::SizeConstraint;
use crate::registry::IeRegistry;
use crate::types::{Criticality, ProtocolIeId};

// maxProtocolIEs = 65535
pub const MAX_PROTOCOL_IES: usize = 65535;
// maxProtocolExtensions = 65535
pub const MAX_PROTOCOL_EXTENSIONS: usize = 65535;

/// ProtocolIE-Field - Single IE with ID, criticality, and value
/// ASN.1: ProtocolIE-Field ::= SEQUENCE { id, criticality, value }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolIeField {
    pub id: ProtocolIeId,
    pub criticality: Criticality,
    pub value: Vec<u8>, // Raw UPER-encoded value
}

impl UperEncode for ProtocolIeField {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        self.id.encode_uper(encoder)?;
        self.criticality.encode_uper(encoder)?;
        encoder.encode_open_type_bytes(&self.value)
    }
}

impl UperDecode for ProtocolIeField {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let id = ProtocolIeId::decode_uper(decoder)?;
        let criticality = Criticality::decode_uper(decoder)?;
        let value = decoder.decode_open_type_bytes()?;
        Ok(ProtocolIeField { id, criticality, value })
    }
}

/// The typed IEs of one container, e.g. the fields of a
/// `TRPInformation-ExtIEs` set.
pub trait IeSet: Default + 'static {
    fn registry() -> &'static IeRegistry<Self>;

    /// The IEs currently present, in the order they are sent.
    fn present(&self) -> Vec<(ProtocolIeId, &dyn UperEncode)>;

    /// Clear the field for `id`.
    fn remove(&mut self, id: ProtocolIeId);

    fn present_ids(&self) -> Vec<ProtocolIeId> {
        self.present().into_iter().map(|(id, _)| id).collect()
    }
}

fn encode_registered<C: IeSet>(encoder: &mut UperEncoder, id: ProtocolIeId, value: &dyn UperEncode) -> PerResult<()> {
    let descriptor = C::registry()
        .lookup(id)
        .ok_or(PerError::UnregisteredIe { id: id.0 })?;
    id.encode_uper(encoder)?;
    descriptor.criticality.encode_uper(encoder)?;
    encoder.encode_open_type(|inner| value.encode_uper(inner))
}

fn decode_field_into<C: IeSet>(
    decoder: &mut UperDecoder<'_>,
    ies: &mut C,
    unrecognized: &mut Vec<ProtocolIeField>,
) -> PerResult<()> {
    let id = ProtocolIeId::decode_uper(decoder)?;
    let criticality = Criticality::decode_uper(decoder)?;
    let config = *decoder.config();

    let Some(descriptor) = C::registry().lookup(id) else {
        let value = decoder.decode_open_type_bytes()?;
        match config.unknown_ies {
            UnknownIePolicy::Preserve => {
                log::debug!("Preserving unrecognized IE {} ({:?}, {} octets)", id.0, criticality, value.len());
                unrecognized.push(ProtocolIeField { id, criticality, value });
            }
            UnknownIePolicy::Drop => {
                log::debug!("Dropping unrecognized IE {} ({:?}, {} octets)", id.0, criticality, value.len());
            }
        }
        return Ok(());
    };

    match decoder.decode_open_type(|inner| (descriptor.decode)(ies, inner)) {
        Ok(()) => Ok(()),
        Err(err) if err.is_recoverable() && config.skip_malformed() => {
            log::debug!("Skipping malformed IE {} ({}): {}", id.0, descriptor.name, err);
            ies.remove(id);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn encode_container<C: IeSet>(
    encoder: &mut UperEncoder,
    ies: &C,
    unrecognized: &[ProtocolIeField],
    size: &SizeConstraint,
) -> PerResult<()> {
    let present = ies.present();
    let count = present.len() + unrecognized.len();
    encoder.encode_sized(count, size, |encoder, _| {
        for &(id, value) in &present {
            encode_registered::<C>(encoder, id, value)?;
        }
        for field in unrecognized {
            field.encode_uper(encoder)?;
        }
        Ok(())
    })
}

fn decode_container<C: IeSet>(
    decoder: &mut UperDecoder<'_>,
    size: &SizeConstraint,
) -> PerResult<(C, Vec<ProtocolIeField>)> {
    let mut ies = C::default();
    let mut unrecognized = Vec::new();
    decoder.decode_sized(size, |decoder, n| {
        for _ in 0..n {
            decode_field_into(decoder, &mut ies, &mut unrecognized)?;
        }
        Ok(())
    })?;
    Ok((ies, unrecognized))
}

/// ProtocolIE-Container - Sequence of IEs
/// ASN.1: ProtocolIE-Container ::= SEQUENCE (SIZE (0..maxProtocolIEs)) OF ProtocolIE-Field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolIeContainer<C> {
    pub ies: C,
    pub unrecognized: Vec<ProtocolIeField>,
}

impl<C: IeSet> ProtocolIeContainer<C> {
    pub const SIZE: SizeConstraint = SizeConstraint::bounded(0, MAX_PROTOCOL_IES);

    pub fn new(ies: C) -> Self {
        Self {
            ies,
            unrecognized: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ies.present().len() + self.unrecognized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find an unrecognized IE by ID
    pub fn find_unrecognized(&self, id: ProtocolIeId) -> Option<&ProtocolIeField> {
        self.unrecognized.iter().find(|ie| ie.id == id)
    }

    /// Mandatory IEs of the registry absent here. Decoding never checks this.
    pub fn missing_mandatory(&self) -> Vec<ProtocolIeId> {
        C::registry().missing_mandatory(&self.ies.present_ids())
    }
}

impl<C: IeSet> UperEncode for ProtocolIeContainer<C> {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encode_container(encoder, &self.ies, &self.unrecognized, &Self::SIZE)
    }
}

impl<C: IeSet> UperDecode for ProtocolIeContainer<C> {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let (ies, unrecognized) = decode_container(decoder, &Self::SIZE)?;
        Ok(Self { ies, unrecognized })
    }
}

/// ProtocolExtensionContainer - the `iE-Extensions` field of a SEQUENCE
/// ASN.1: ProtocolExtensionContainer ::= SEQUENCE (SIZE (1..maxProtocolExtensions)) OF ProtocolExtensionField
///
/// At least one extension must be present; an empty container is sent by
/// omitting the optional field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolExtensionContainer<C> {
    pub ies: C,
    pub unrecognized: Vec<ProtocolIeField>,
}

impl<C: IeSet> ProtocolExtensionContainer<C> {
    pub const SIZE: SizeConstraint = SizeConstraint::bounded(1, MAX_PROTOCOL_EXTENSIONS);

    pub fn new(ies: C) -> Self {
        Self {
            ies,
            unrecognized: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ies.present().len() + self.unrecognized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find_unrecognized(&self, id: ProtocolIeId) -> Option<&ProtocolIeField> {
        self.unrecognized.iter().find(|ie| ie.id == id)
    }

    pub fn missing_mandatory(&self) -> Vec<ProtocolIeId> {
        C::registry().missing_mandatory(&self.ies.present_ids())
    }
}

impl<C: IeSet> UperEncode for ProtocolExtensionContainer<C> {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encode_container(encoder, &self.ies, &self.unrecognized, &Self::SIZE)
    }
}

impl<C: IeSet> UperDecode for ProtocolExtensionContainer<C> {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let (ies, unrecognized) = decode_container(decoder, &Self::SIZE)?;
        Ok(Self { ies, unrecognized })
    }
}

/// ProtocolIE-SingleContainer - exactly one IE, no count
///
/// The payload of a CHOICE's `choice-extension` alternative.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolIeSingleContainer<C> {
    pub ies: C,
    pub unrecognized: Option<ProtocolIeField>,
}

impl<C: IeSet> ProtocolIeSingleContainer<C> {
    pub fn new(ies: C) -> Self {
        Self {
            ies,
            unrecognized: None,
        }
    }
}

impl<C: IeSet> UperEncode for ProtocolIeSingleContainer<C> {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        let present = self.ies.present();
        match (present.as_slice(), &self.unrecognized) {
            ([(id, value)], None) => encode_registered::<C>(encoder, *id, *value),
            ([], Some(field)) => field.encode_uper(encoder),
            ([], None) => Err(PerError::NullValue("ProtocolIE-SingleContainer")),
            _ => Err(PerError::out_of_range(
                (present.len() + self.unrecognized.iter().count()) as i128,
                1,
                1,
            )),
        }
    }
}

impl<C: IeSet> UperDecode for ProtocolIeSingleContainer<C> {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let mut ies = C::default();
        let mut unrecognized = Vec::with_capacity(1);
        decode_field_into(decoder, &mut ies, &mut unrecognized)?;
        Ok(Self {
            ies,
            unrecognized: unrecognized.pop(),
        })
    }
}
