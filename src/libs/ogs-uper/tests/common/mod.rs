//! Shared test schema
//!
//! Hand-written equivalents of what the code generator emits for this
//! NRPPa-flavoured module, in two versions:
//!
//! ```asn1
//! TRP-Quality ::= ENUMERATED { low, medium, high, ..., ultra }   -- ultra: v2
//!
//! TrpMeasurement ::= SEQUENCE {
//!     trp-id          INTEGER (1..65535),
//!     quality         TRP-Quality                                    OPTIONAL,
//!     beams           SEQUENCE (SIZE (1..3)) OF BIT STRING (SIZE (4)) OPTIONAL,
//!     label           PrintableString (SIZE (1..32))                 OPTIONAL,
//!     iE-Extensions   ProtocolExtensionContainer { {TrpMeasurement-ExtIEs} } OPTIONAL,
//!     ...,
//!     [[ timestamp-r17    INTEGER (0..4294967295) ]],                -- v2
//!     [[ arp-r18          OCTET STRING (SIZE (1..16)),
//!        los-r18          BOOLEAN OPTIONAL ]]                        -- v2
//! }
//!
//! TrpMeasurement-ExtIEs PROTOCOL-EXTENSION ::= {
//!     { ID 100 CRITICALITY ignore EXTENSION INTEGER (-64..63) PRESENCE optional } |
//!     { ID 101 CRITICALITY ignore EXTENSION PrintableString (SIZE (1..32)) PRESENCE optional },
//!     ...
//! }
//!
//! MeasurementReport ::= SEQUENCE {
//!     measurements    SEQUENCE (SIZE (1..4)) OF TrpMeasurement,
//!     trailer         INTEGER (0..255)
//! }
//!
//! PositioningExpr ::= CHOICE {
//!     value               INTEGER (0..255),
//!     negate              PositioningExpr,
//!     pair                ExprPair,
//!     choice-extension    ProtocolIE-SingleContainer { {PositioningExpr-ExtIEs} },
//!     ...,
//!     scaled              INTEGER (0..65535)
//! }
//!
//! ExprPair ::= SEQUENCE { left PositioningExpr, right PositioningExpr }
//!
//! PositioningExpr-ExtIEs ::= {
//!     { ID 200 CRITICALITY reject TYPE PrintableString (SIZE (1..32)) PRESENCE mandatory }
//! }
//! ```

#![allow(dead_code)]

use bitvec::prelude::*;

use ogs_uper::{
    Alternative, CharacterSet, Choice, Constraint, Criticality, EnumValue, Enumerated, ExtensionGroups,
    ExtensionGroupsDecoder, IeDescriptor, IeRegistry, IeSet, PerResult, Presence, ProtocolExtensionContainer,
    ProtocolIeId, ProtocolIeSingleContainer, SizeConstraint, UperDecode, UperDecoder, UperEncode, UperEncoder,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const TRP_ID: Constraint = Constraint::new(1, 65535);
pub const BEAMS: SizeConstraint = SizeConstraint::bounded(1, 3);
pub const BEAM_BITS: SizeConstraint = SizeConstraint::fixed(4);
pub const LABEL: SizeConstraint = SizeConstraint::bounded(1, 32);
pub const TIMESTAMP: Constraint = Constraint::new(0, 4_294_967_295);
pub const ARP: SizeConstraint = SizeConstraint::bounded(1, 16);
pub const TX_POWER: Constraint = Constraint::new(-64, 63);
pub const MEASUREMENTS: SizeConstraint = SizeConstraint::bounded(1, 4);

// ============================================================================
// TRP-Quality
// ============================================================================

/// v2 view, with `ultra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrpQuality {
    Low,
    Medium,
    High,
    Ultra,
}

impl Enumerated for TrpQuality {
    const NAME: &'static str = "TRP-Quality";
    const ROOT_COUNT: u32 = 3;
    const EXTENSIBLE: bool = true;
    const EXTENSION_COUNT: u32 = 1;

    fn index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(TrpQuality::Low),
            1 => Some(TrpQuality::Medium),
            2 => Some(TrpQuality::High),
            3 => Some(TrpQuality::Ultra),
            _ => None,
        }
    }
}

/// v1 view: root values only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrpQualityV1 {
    Low,
    Medium,
    High,
}

impl Enumerated for TrpQualityV1 {
    const NAME: &'static str = "TRP-Quality";
    const ROOT_COUNT: u32 = 3;
    const EXTENSIBLE: bool = true;

    fn index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(TrpQualityV1::Low),
            1 => Some(TrpQualityV1::Medium),
            2 => Some(TrpQualityV1::High),
            _ => None,
        }
    }
}

// ============================================================================
// BIT STRING (SIZE (4))
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beam(pub u8);

impl UperEncode for Beam {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        let bits = [self.0 << 4];
        encoder.encode_bit_string(&bits.view_bits::<Msb0>()[..4], &BEAM_BITS)
    }
}

impl UperDecode for Beam {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let bits = decoder.decode_bit_string(&BEAM_BITS)?;
        Ok(Beam(bits.load_be::<u8>()))
    }
}

// ============================================================================
// TrpMeasurement-ExtIEs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxPower(pub i8);

impl UperEncode for TxPower {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_integer(self.0 as i64, &TX_POWER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);

impl UperEncode for Label {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_known_multiplier_string(&self.0, CharacterSet::Printable, &LABEL)
    }
}

impl UperDecode for Label {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        decoder
            .decode_known_multiplier_string(CharacterSet::Printable, &LABEL)
            .map(Label)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrpMeasurementExtIes {
    pub tx_power: Option<TxPower>,
    pub site_name: Option<Label>,
}

pub const ID_TX_POWER: ProtocolIeId = ProtocolIeId(100);
pub const ID_SITE_NAME: ProtocolIeId = ProtocolIeId(101);

fn decode_tx_power(ies: &mut TrpMeasurementExtIes, decoder: &mut UperDecoder<'_>) -> PerResult<()> {
    ies.tx_power = Some(TxPower(decoder.decode_integer(&TX_POWER)? as i8));
    Ok(())
}

fn decode_site_name(ies: &mut TrpMeasurementExtIes, decoder: &mut UperDecoder<'_>) -> PerResult<()> {
    ies.site_name = Some(Label::decode_uper(decoder)?);
    Ok(())
}

static TRP_MEASUREMENT_EXT_IES: IeRegistry<TrpMeasurementExtIes> = IeRegistry::new(&[
    IeDescriptor {
        id: ID_TX_POWER,
        name: "tx-power",
        criticality: Criticality::Ignore,
        presence: Presence::Optional,
        decode: decode_tx_power,
    },
    IeDescriptor {
        id: ID_SITE_NAME,
        name: "site-name",
        criticality: Criticality::Ignore,
        presence: Presence::Optional,
        decode: decode_site_name,
    },
]);

impl IeSet for TrpMeasurementExtIes {
    fn registry() -> &'static IeRegistry<Self> {
        &TRP_MEASUREMENT_EXT_IES
    }

    fn present(&self) -> Vec<(ProtocolIeId, &dyn UperEncode)> {
        let mut present: Vec<(ProtocolIeId, &dyn UperEncode)> = Vec::new();
        if let Some(tx_power) = &self.tx_power {
            present.push((ID_TX_POWER, tx_power));
        }
        if let Some(site_name) = &self.site_name {
            present.push((ID_SITE_NAME, site_name));
        }
        present
    }

    fn remove(&mut self, id: ProtocolIeId) {
        match id {
            ID_TX_POWER => self.tx_power = None,
            ID_SITE_NAME => self.site_name = None,
            _ => {}
        }
    }
}

// ============================================================================
// TrpMeasurement
// ============================================================================

/// Root fields, identical in both versions.
#[derive(Debug, Clone, PartialEq)]
pub struct TrpRoot<Q> {
    pub trp_id: u16,
    pub quality: Option<EnumValue<Q>>,
    pub beams: Option<Vec<Beam>>,
    pub label: Option<Label>,
    pub ie_extensions: Option<ProtocolExtensionContainer<TrpMeasurementExtIes>>,
}

impl<Q: Enumerated> TrpRoot<Q> {
    fn encode_fields(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_presence(&[
            self.quality.is_some(),
            self.beams.is_some(),
            self.label.is_some(),
            self.ie_extensions.is_some(),
        ])?;
        encoder.encode_integer(self.trp_id as i64, &TRP_ID)?;
        if let Some(quality) = &self.quality {
            quality.encode_uper(encoder)?;
        }
        if let Some(beams) = &self.beams {
            encoder.encode_sequence_of(beams, &BEAMS)?;
        }
        if let Some(label) = &self.label {
            label.encode_uper(encoder)?;
        }
        if let Some(ie_extensions) = &self.ie_extensions {
            ie_extensions.encode_uper(encoder)?;
        }
        Ok(())
    }

    fn decode_fields(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let [has_quality, has_beams, has_label, has_extensions] = decoder.decode_presence::<4>()?;
        let trp_id = decoder.decode_integer(&TRP_ID)? as u16;
        let quality = if has_quality { Some(EnumValue::decode_uper(decoder)?) } else { None };
        let beams = if has_beams { Some(decoder.decode_sequence_of(&BEAMS)?) } else { None };
        let label = if has_label { Some(Label::decode_uper(decoder)?) } else { None };
        let ie_extensions = if has_extensions {
            Some(ProtocolExtensionContainer::decode_uper(decoder)?)
        } else {
            None
        };
        Ok(Self {
            trp_id,
            quality,
            beams,
            label,
            ie_extensions,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(pub u32);

impl UperEncode for Timestamp {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_integer(self.0 as i64, &TIMESTAMP)
    }
}

impl UperDecode for Timestamp {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        Ok(Timestamp(decoder.decode_integer(&TIMESTAMP)? as u32))
    }
}

/// `[[ arp-r18, los-r18 ]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpGroup {
    pub arp: Vec<u8>,
    pub los: Option<bool>,
}

impl UperEncode for ArpGroup {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_presence(&[self.los.is_some()])?;
        encoder.encode_octet_string(&self.arp, &ARP)?;
        if let Some(los) = self.los {
            encoder.encode_boolean(los)?;
        }
        Ok(())
    }
}

impl UperDecode for ArpGroup {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let [has_los] = decoder.decode_presence::<1>()?;
        let arp = decoder.decode_octet_string(&ARP)?;
        let los = if has_los { Some(decoder.decode_boolean()?) } else { None };
        Ok(ArpGroup { arp, los })
    }
}

/// v2: knows both extension groups.
#[derive(Debug, Clone, PartialEq)]
pub struct TrpMeasurement {
    pub root: TrpRoot<TrpQuality>,
    pub timestamp: Option<Timestamp>,
    pub arp: Option<ArpGroup>,
}

impl UperEncode for TrpMeasurement {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        let groups = ExtensionGroups::new()
            .group(self.timestamp.as_ref())
            .group(self.arp.as_ref());
        encoder.encode_extension_marker(groups.any_present())?;
        self.root.encode_fields(encoder)?;
        groups.encode(encoder)
    }
}

impl UperDecode for TrpMeasurement {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let extended = decoder.decode_extension_marker()?;
        let root = TrpRoot::decode_fields(decoder)?;
        let mut groups = if extended {
            ExtensionGroupsDecoder::decode(decoder)?
        } else {
            ExtensionGroupsDecoder::absent()
        };
        let timestamp = groups.group(decoder)?;
        let arp = groups.group(decoder)?;
        groups.finish(decoder)?;
        Ok(Self { root, timestamp, arp })
    }
}

/// v1: extensible but predates both groups.
#[derive(Debug, Clone, PartialEq)]
pub struct TrpMeasurementV1 {
    pub root: TrpRoot<TrpQualityV1>,
}

impl UperEncode for TrpMeasurementV1 {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_extension_marker(false)?;
        self.root.encode_fields(encoder)
    }
}

impl UperDecode for TrpMeasurementV1 {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let extended = decoder.decode_extension_marker()?;
        let root = TrpRoot::decode_fields(decoder)?;
        if extended {
            ExtensionGroupsDecoder::decode(decoder)?.finish(decoder)?;
        }
        Ok(Self { root })
    }
}

// ============================================================================
// MeasurementReport
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementReport<M> {
    pub measurements: Vec<M>,
    pub trailer: u8,
}

impl<M: UperEncode> UperEncode for MeasurementReport<M> {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_sequence_of(&self.measurements, &MEASUREMENTS)?;
        encoder.encode_integer(self.trailer as i64, &Constraint::new(0, 255))
    }
}

impl<M: UperDecode> UperDecode for MeasurementReport<M> {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        let measurements = decoder.decode_sequence_of(&MEASUREMENTS)?;
        let trailer = decoder.decode_integer(&Constraint::new(0, 255))? as u8;
        Ok(Self { measurements, trailer })
    }
}

pub fn sample_measurement() -> TrpMeasurement {
    TrpMeasurement {
        root: TrpRoot {
            trp_id: 4097,
            quality: Some(EnumValue::Known(TrpQuality::Ultra)),
            beams: Some(vec![Beam(0b1010), Beam(0b0101)]),
            label: Some(Label("TRP-7 (north)".to_string())),
            ie_extensions: Some(ProtocolExtensionContainer::new(TrpMeasurementExtIes {
                tx_power: Some(TxPower(-12)),
                site_name: None,
            })),
        },
        timestamp: Some(Timestamp(1_700_000_000)),
        arp: Some(ArpGroup {
            arp: vec![0x01, 0x02, 0x03],
            los: Some(true),
        }),
    }
}

// ============================================================================
// PositioningExpr
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PositioningExpr {
    Value(ExprValue),
    Negate(Negate),
    Pair(Box<ExprPair>),
    ChoiceExtension(Box<ProtocolIeSingleContainer<ExprExtIes>>),
    Scaled(Scaled),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprTag {
    Value,
    Negate,
    Pair,
    ChoiceExtension,
    Scaled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExprValue(pub u8);

#[derive(Debug, Clone, PartialEq)]
pub struct Negate(pub Box<PositioningExpr>);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scaled(pub u16);

#[derive(Debug, Clone, PartialEq)]
pub struct ExprPair {
    pub left: PositioningExpr,
    pub right: PositioningExpr,
}

const EXPR_VALUE: Constraint = Constraint::new(0, 255);
const EXPR_SCALED: Constraint = Constraint::new(0, 65535);

impl PositioningExpr {
    pub fn value(v: u8) -> Self {
        PositioningExpr::Value(ExprValue(v))
    }

    pub fn negate(inner: PositioningExpr) -> Self {
        PositioningExpr::Negate(Negate(Box::new(inner)))
    }

    /// `depth` levels of `negate` around a value.
    pub fn nested_negations(depth: usize) -> Self {
        (0..depth).fold(Self::value(1), |inner, _| Self::negate(inner))
    }
}

impl Choice for PositioningExpr {
    type Tag = ExprTag;

    const NAME: &'static str = "PositioningExpr";
    const ROOT_ALTERNATIVES: usize = 4;
    const EXTENSIBLE: bool = true;

    fn tag(&self) -> ExprTag {
        match self {
            PositioningExpr::Value(_) => ExprTag::Value,
            PositioningExpr::Negate(_) => ExprTag::Negate,
            PositioningExpr::Pair(_) => ExprTag::Pair,
            PositioningExpr::ChoiceExtension(_) => ExprTag::ChoiceExtension,
            PositioningExpr::Scaled(_) => ExprTag::Scaled,
        }
    }

    fn tag_index(tag: ExprTag) -> usize {
        match tag {
            ExprTag::Value => 0,
            ExprTag::Negate => 1,
            ExprTag::Pair => 2,
            ExprTag::ChoiceExtension => 3,
            ExprTag::Scaled => 4,
        }
    }

    fn tag_from_index(index: usize) -> Option<ExprTag> {
        match index {
            0 => Some(ExprTag::Value),
            1 => Some(ExprTag::Negate),
            2 => Some(ExprTag::Pair),
            3 => Some(ExprTag::ChoiceExtension),
            4 => Some(ExprTag::Scaled),
            _ => None,
        }
    }

    fn with_tag(tag: ExprTag) -> Self {
        match tag {
            ExprTag::Value => PositioningExpr::Value(ExprValue::default()),
            ExprTag::Negate => PositioningExpr::negate(PositioningExpr::value(0)),
            ExprTag::Pair => PositioningExpr::Pair(Box::new(ExprPair {
                left: PositioningExpr::value(0),
                right: PositioningExpr::value(0),
            })),
            ExprTag::ChoiceExtension => PositioningExpr::ChoiceExtension(Box::default()),
            ExprTag::Scaled => PositioningExpr::Scaled(Scaled::default()),
        }
    }

    fn encode_payload(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        match self {
            PositioningExpr::Value(value) => encoder.encode_integer(value.0 as i64, &EXPR_VALUE),
            PositioningExpr::Negate(negate) => negate.0.encode_uper(encoder),
            PositioningExpr::Pair(pair) => {
                pair.left.encode_uper(encoder)?;
                pair.right.encode_uper(encoder)
            }
            PositioningExpr::ChoiceExtension(single) => single.encode_uper(encoder),
            PositioningExpr::Scaled(scaled) => encoder.encode_integer(scaled.0 as i64, &EXPR_SCALED),
        }
    }

    fn decode_payload(tag: ExprTag, decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        Ok(match tag {
            ExprTag::Value => PositioningExpr::value(decoder.decode_integer(&EXPR_VALUE)? as u8),
            ExprTag::Negate => PositioningExpr::negate(PositioningExpr::decode_uper(decoder)?),
            ExprTag::Pair => {
                let left = PositioningExpr::decode_uper(decoder)?;
                let right = PositioningExpr::decode_uper(decoder)?;
                PositioningExpr::Pair(Box::new(ExprPair { left, right }))
            }
            ExprTag::ChoiceExtension => {
                PositioningExpr::ChoiceExtension(Box::new(ProtocolIeSingleContainer::decode_uper(decoder)?))
            }
            ExprTag::Scaled => PositioningExpr::Scaled(Scaled(decoder.decode_integer(&EXPR_SCALED)? as u16)),
        })
    }
}

impl UperEncode for PositioningExpr {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_choice(self)
    }
}

impl UperDecode for PositioningExpr {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        decoder.decode_choice()
    }
}

impl Alternative<PositioningExpr> for ExprValue {
    const TAG: ExprTag = ExprTag::Value;

    fn peek(choice: &PositioningExpr) -> Option<&Self> {
        match choice {
            PositioningExpr::Value(value) => Some(value),
            _ => None,
        }
    }

    fn peek_mut(choice: &mut PositioningExpr) -> Option<&mut Self> {
        match choice {
            PositioningExpr::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl Alternative<PositioningExpr> for Negate {
    const TAG: ExprTag = ExprTag::Negate;

    fn peek(choice: &PositioningExpr) -> Option<&Self> {
        match choice {
            PositioningExpr::Negate(negate) => Some(negate),
            _ => None,
        }
    }

    fn peek_mut(choice: &mut PositioningExpr) -> Option<&mut Self> {
        match choice {
            PositioningExpr::Negate(negate) => Some(negate),
            _ => None,
        }
    }
}

impl Alternative<PositioningExpr> for Scaled {
    const TAG: ExprTag = ExprTag::Scaled;

    fn peek(choice: &PositioningExpr) -> Option<&Self> {
        match choice {
            PositioningExpr::Scaled(scaled) => Some(scaled),
            _ => None,
        }
    }

    fn peek_mut(choice: &mut PositioningExpr) -> Option<&mut Self> {
        match choice {
            PositioningExpr::Scaled(scaled) => Some(scaled),
            _ => None,
        }
    }
}

// ============================================================================
// PositioningExpr-ExtIEs
// ============================================================================

pub const ID_EXPR_LABEL: ProtocolIeId = ProtocolIeId(200);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprExtIes {
    pub label: Option<Label>,
}

fn decode_expr_label(ies: &mut ExprExtIes, decoder: &mut UperDecoder<'_>) -> PerResult<()> {
    ies.label = Some(Label::decode_uper(decoder)?);
    Ok(())
}

static EXPR_EXT_IES: IeRegistry<ExprExtIes> = IeRegistry::new(&[IeDescriptor {
    id: ID_EXPR_LABEL,
    name: "expr-label",
    criticality: Criticality::Reject,
    presence: Presence::Mandatory,
    decode: decode_expr_label,
}]);

impl IeSet for ExprExtIes {
    fn registry() -> &'static IeRegistry<Self> {
        &EXPR_EXT_IES
    }

    fn present(&self) -> Vec<(ProtocolIeId, &dyn UperEncode)> {
        let mut present: Vec<(ProtocolIeId, &dyn UperEncode)> = Vec::new();
        if let Some(label) = &self.label {
            present.push((ID_EXPR_LABEL, label));
        }
        present
    }

    fn remove(&mut self, id: ProtocolIeId) {
        if id == ID_EXPR_LABEL {
            self.label = None;
        }
    }
}
