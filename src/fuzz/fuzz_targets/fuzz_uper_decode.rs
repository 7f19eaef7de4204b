//! UPER Decoder Fuzzer
//!
//! Feeds arbitrary input to the UPER runtime's decode paths: length
//! determinants, open types, extension groups, ProtocolIE containers and a
//! self-referential CHOICE. Runs each under both malformed-extension
//! policies.
//!
//! Run with: cargo +nightly fuzz run fuzz_uper_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use ogs_uper::{
    CodecConfig, Choice, Criticality, EnumValue, ExtensionGroupsDecoder, IeDescriptor, IeRegistry, IeSet,
    MalformedExtensionPolicy, PerResult, Presence, ProtocolExtensionContainer, ProtocolIeContainer, ProtocolIeField,
    ProtocolIeId, ProtocolIeSingleContainer, SizeConstraint, UperDecode, UperDecoder, UperEncode, UperEncoder,
};

fuzz_target!(|data: &[u8]| {
    let strict = CodecConfig {
        max_length: 4096,
        max_depth: 16,
        ..CodecConfig::default()
    };
    let lenient = CodecConfig {
        malformed_extension: MalformedExtensionPolicy::Skip,
        ..strict
    };

    for config in [strict, lenient] {
        decode_all(data, config);
    }
});

fn decode_all(data: &[u8], config: CodecConfig) {
    let _ = ProtocolIeField::decode_uper(&mut UperDecoder::with_config(data, config));
    let _ = ProtocolIeContainer::<FuzzIes>::decode_uper(&mut UperDecoder::with_config(data, config));
    let _ = ProtocolExtensionContainer::<FuzzIes>::decode_uper(&mut UperDecoder::with_config(data, config));
    let _ = ProtocolIeSingleContainer::<FuzzIes>::decode_uper(&mut UperDecoder::with_config(data, config));
    let _ = EnumValue::<Criticality>::decode_uper(&mut UperDecoder::with_config(data, config));
    let _ = Node::decode_uper(&mut UperDecoder::with_config(data, config));

    let mut decoder = UperDecoder::with_config(data, config);
    let _ = decoder.decode_octet_string(&SizeConstraint::unbounded().extensible());

    let mut decoder = UperDecoder::with_config(data, config);
    if let Ok(mut groups) = ExtensionGroupsDecoder::decode(&mut decoder) {
        let _ = groups.group::<Node>(&mut decoder);
        let _ = groups.finish(&mut decoder);
    }

    // Anything that decodes must encode again.
    if let Ok(node) = Node::decode_uper(&mut UperDecoder::with_config(data, config)) {
        let mut encoder = UperEncoder::with_config(config);
        node.encode_uper(&mut encoder).expect("decoded value must re-encode");
    }
}

/// `FuzzIes` with ids 1 (INTEGER (0..255)) and 2 (BOOLEAN)
#[derive(Debug, Default)]
struct FuzzIes {
    byte: Option<Byte>,
    flag: Option<bool>,
}

#[derive(Debug)]
struct Byte(u8);

impl UperEncode for Byte {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.pack(self.0 as u64, 8)
    }
}

fn decode_byte(ies: &mut FuzzIes, decoder: &mut UperDecoder<'_>) -> PerResult<()> {
    ies.byte = Some(Byte(decoder.unpack(8)? as u8));
    Ok(())
}

fn decode_flag(ies: &mut FuzzIes, decoder: &mut UperDecoder<'_>) -> PerResult<()> {
    ies.flag = Some(decoder.decode_boolean()?);
    Ok(())
}

static FUZZ_IES: IeRegistry<FuzzIes> = IeRegistry::new(&[
    IeDescriptor {
        id: ProtocolIeId(1),
        name: "byte",
        criticality: Criticality::Reject,
        presence: Presence::Mandatory,
        decode: decode_byte,
    },
    IeDescriptor {
        id: ProtocolIeId(2),
        name: "flag",
        criticality: Criticality::Ignore,
        presence: Presence::Optional,
        decode: decode_flag,
    },
]);

impl IeSet for FuzzIes {
    fn registry() -> &'static IeRegistry<Self> {
        &FUZZ_IES
    }

    fn present(&self) -> Vec<(ProtocolIeId, &dyn UperEncode)> {
        let mut present: Vec<(ProtocolIeId, &dyn UperEncode)> = Vec::new();
        if let Some(byte) = &self.byte {
            present.push((ProtocolIeId(1), byte));
        }
        if let Some(flag) = &self.flag {
            present.push((ProtocolIeId(2), flag));
        }
        present
    }

    fn remove(&mut self, id: ProtocolIeId) {
        match id.0 {
            1 => self.byte = None,
            2 => self.flag = None,
            _ => {}
        }
    }
}

/// `Node ::= CHOICE { leaf INTEGER (0..15), wrap Node, ..., pair SEQUENCE { a Node, b Node } }`
#[derive(Debug)]
enum Node {
    Leaf(u8),
    Wrap(Box<Node>),
    Pair(Box<(Node, Node)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeTag {
    Leaf,
    Wrap,
    Pair,
}

impl Choice for Node {
    type Tag = NodeTag;

    const NAME: &'static str = "Node";
    const ROOT_ALTERNATIVES: usize = 2;
    const EXTENSIBLE: bool = true;

    fn tag(&self) -> NodeTag {
        match self {
            Node::Leaf(_) => NodeTag::Leaf,
            Node::Wrap(_) => NodeTag::Wrap,
            Node::Pair(_) => NodeTag::Pair,
        }
    }

    fn tag_index(tag: NodeTag) -> usize {
        tag as usize
    }

    fn tag_from_index(index: usize) -> Option<NodeTag> {
        [NodeTag::Leaf, NodeTag::Wrap, NodeTag::Pair].get(index).copied()
    }

    fn with_tag(tag: NodeTag) -> Self {
        match tag {
            NodeTag::Leaf => Node::Leaf(0),
            NodeTag::Wrap => Node::Wrap(Box::new(Node::Leaf(0))),
            NodeTag::Pair => Node::Pair(Box::new((Node::Leaf(0), Node::Leaf(0)))),
        }
    }

    fn encode_payload(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        match self {
            Node::Leaf(value) => encoder.pack(*value as u64, 4),
            Node::Wrap(inner) => inner.encode_uper(encoder),
            Node::Pair(pair) => {
                pair.0.encode_uper(encoder)?;
                pair.1.encode_uper(encoder)
            }
        }
    }

    fn decode_payload(tag: NodeTag, decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        Ok(match tag {
            NodeTag::Leaf => Node::Leaf(decoder.unpack(4)? as u8),
            NodeTag::Wrap => Node::Wrap(Box::new(Node::decode_uper(decoder)?)),
            NodeTag::Pair => {
                let a = Node::decode_uper(decoder)?;
                let b = Node::decode_uper(decoder)?;
                Node::Pair(Box::new((a, b)))
            }
        })
    }
}

impl UperEncode for Node {
    fn encode_uper(&self, encoder: &mut UperEncoder) -> PerResult<()> {
        encoder.encode_choice(self)
    }
}

impl UperDecode for Node {
    fn decode_uper(decoder: &mut UperDecoder<'_>) -> PerResult<Self> {
        decoder.decode_choice()
    }
}
