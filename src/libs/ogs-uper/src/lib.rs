//! NextGCore ASN.1 UPER Codec Runtime
//!
//! This crate provides the Unaligned PER (ITU-T X.691) primitives that
//! generated 3GPP message types (NRPPa, RRC, sidelink pre-configuration ...)
//! are built from.
//!
//! # Modules
//!
//! - `cursor` - bit-granular encoder/decoder cursors
//! - `integer`, `length`, `string`, `enumerated` - primitive codecs
//! - `presence`, `extension` - SEQUENCE preamble, open types, extension groups
//! - `choice` - CHOICE storage and codec
//! - `types`, `registry`, `ies` - ProtocolIE containers and their registries

pub mod choice;     // CHOICE storage and codec
pub mod codec;      // UperEncode/UperDecode and message entry points
pub mod config;     // Decode limits and tolerance policy
pub mod cursor;     // Bit cursors
pub mod enumerated; // ENUMERATED
pub mod error;      // PerError
pub mod extension;  // Open types and extension groups
pub mod ies;        // ProtocolIE containers
pub mod integer;    // INTEGER, BOOLEAN
pub mod length;     // Length determinants
pub mod presence;   // Presence bitmap
pub mod registry;   // Static IE registries
pub mod string;     // Strings and SEQUENCE OF
pub mod types;      // Criticality, Presence, ProtocolIE-ID


// Re-export commonly used types
pub use choice::{Alternative, Choice, WrongAlternative};
pub use codec::{decode, decode_with_config, encode, encode_with_config, UperDecode, UperEncode};
pub use config::{CodecConfig, MalformedExtensionPolicy, UnknownIePolicy};
pub use cursor::{UperDecoder, UperEncoder};
pub use enumerated::{EnumValue, Enumerated};
pub use error::{PerError, PerResult};
pub use extension::{ExtensionGroups, ExtensionGroupsDecoder};
pub use ies::{IeSet, ProtocolExtensionContainer, ProtocolIeContainer, ProtocolIeField, ProtocolIeSingleContainer};
pub use integer::Constraint;
pub use length::SizeConstraint;
pub use registry::{IeDescriptor, IeRegistry};
pub use string::CharacterSet;
pub use types::{Criticality, Presence, ProtocolIeId};
