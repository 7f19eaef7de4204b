//! CHOICE storage and encoding (X.691 clause 23)
//!
//! A generated CHOICE is a Rust enum whose variants own their payloads.
//! Recursive or large alternatives hold a `Box`, one heap slot per live
//! payload, freed when the variant is replaced or dropped. The `Choice`
//! trait adds the tag view the codec and the typed accessors need.

use std::fmt;

use thiserror::Error;

use crate::cursor::{UperDecoder, UperEncoder};
use crate::error::{PerError, PerResult};
use crate::integer::bits_for_span;

/// `get`/`get_mut` asked for an alternative that is not the active one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{choice}: requested alternative {expected}, active alternative is {actual}")]
pub struct WrongAlternative {
    pub choice: &'static str,
    pub expected: String,
    pub actual: String,
}

impl WrongAlternative {
    fn new<C: Choice>(expected: C::Tag, actual: C::Tag) -> Self {
        Self {
            choice: C::NAME,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

/// A generated CHOICE type.
///
/// Alternatives are numbered in declaration order: root alternatives
/// (including any `choice-extension` arm) from 0, additional alternatives
/// after `...` from `ROOT_ALTERNATIVES`.
pub trait Choice: Sized {
    type Tag: Copy + Eq + fmt::Debug;

    const NAME: &'static str;
    const ROOT_ALTERNATIVES: usize;
    const EXTENSIBLE: bool = false;

    fn tag(&self) -> Self::Tag;
    fn tag_index(tag: Self::Tag) -> usize;
    fn tag_from_index(index: usize) -> Option<Self::Tag>;

    /// The value holding a default-constructed payload for `tag`.
    fn with_tag(tag: Self::Tag) -> Self;

    fn encode_payload(&self, encoder: &mut UperEncoder) -> PerResult<()>;
    fn decode_payload(tag: Self::Tag, decoder: &mut UperDecoder<'_>) -> PerResult<Self>;

    /// Keep an additional alternative this build does not know. The default
    /// refuses, making it `InvalidChoiceTag`.
    fn unknown_alternative(_index: usize, _octets: Vec<u8>) -> Option<Self> {
        None
    }

    /// Open type contents of an alternative kept by `unknown_alternative`.
    fn unknown_octets(&self) -> Option<&[u8]> {
        None
    }

    /// Switch to `tag`, dropping the current payload.
    fn set(&mut self, tag: Self::Tag) -> &mut Self {
        *self = Self::with_tag(tag);
        self
    }

    fn is<T: Alternative<Self>>(&self) -> bool {
        T::peek(self).is_some()
    }

    fn get<T: Alternative<Self>>(&self) -> Result<&T, WrongAlternative> {
        let actual = self.tag();
        T::peek(self).ok_or_else(|| WrongAlternative::new::<Self>(T::TAG, actual))
    }

    fn get_mut<T: Alternative<Self>>(&mut self) -> Result<&mut T, WrongAlternative> {
        let actual = self.tag();
        T::peek_mut(self).ok_or_else(|| WrongAlternative::new::<Self>(T::TAG, actual))
    }
}

/// Payload type of one alternative of `C`.
///
/// Each alternative needs a distinct payload type for `get::<T>()` to name
/// it; generated code wraps shared payload types in newtypes.
pub trait Alternative<C: Choice>: Sized {
    const TAG: C::Tag;

    fn peek(choice: &C) -> Option<&Self>;
    fn peek_mut(choice: &mut C) -> Option<&mut Self>;
}

impl UperEncoder {
    /// Encode choice index
    pub fn encode_choice_index(&mut self, index: usize, num_alternatives: usize, extensible: bool) -> PerResult<()> {
        if index < num_alternatives {
            if extensible {
                self.pack_bit(false)?;
            }
            return self.pack(index as u64, bits_for_span((num_alternatives - 1) as u64));
        }
        if !extensible {
            return Err(PerError::InvalidChoiceTag {
                index,
                max: num_alternatives.saturating_sub(1),
            });
        }
        self.pack_bit(true)?;
        self.encode_normally_small_non_negative((index - num_alternatives) as u64)
    }

    /// Encode the active alternative. Additional alternatives are wrapped
    /// in an open type.
    pub fn encode_choice<C: Choice>(&mut self, choice: &C) -> PerResult<()> {
        let index = C::tag_index(choice.tag());
        self.encode_choice_index(index, C::ROOT_ALTERNATIVES, C::EXTENSIBLE)?;
        if index < C::ROOT_ALTERNATIVES {
            return choice.encode_payload(self);
        }
        match choice.unknown_octets() {
            Some(octets) => self.encode_open_type_bytes(octets),
            None => self.encode_open_type(|inner| choice.encode_payload(inner)),
        }
    }
}

impl<'a> UperDecoder<'a> {
    /// Decode choice index. Additional alternatives are returned offset by
    /// `num_alternatives`.
    pub fn decode_choice_index(&mut self, num_alternatives: usize, extensible: bool) -> PerResult<usize> {
        if extensible && self.unpack_bit()? {
            let offset = self.decode_normally_small_non_negative()?;
            return usize::try_from(offset)
                .ok()
                .and_then(|offset| offset.checked_add(num_alternatives))
                .ok_or(PerError::InvalidChoiceTag {
                    index: usize::MAX,
                    max: num_alternatives,
                });
        }
        if num_alternatives == 0 {
            return Err(PerError::InvalidChoiceTag { index: 0, max: 0 });
        }
        let index = self.unpack(bits_for_span((num_alternatives - 1) as u64))? as usize;
        if index >= num_alternatives {
            return Err(PerError::InvalidChoiceTag {
                index,
                max: num_alternatives - 1,
            });
        }
        Ok(index)
    }

    /// Decode a CHOICE one nesting level down.
    pub fn decode_choice<C: Choice>(&mut self) -> PerResult<C> {
        self.nested(|dec| {
            let index = dec.decode_choice_index(C::ROOT_ALTERNATIVES, C::EXTENSIBLE)?;
            let tag = C::tag_from_index(index);

            if index < C::ROOT_ALTERNATIVES {
                let tag = tag.ok_or(PerError::InvalidChoiceTag {
                    index,
                    max: C::ROOT_ALTERNATIVES.saturating_sub(1),
                })?;
                return C::decode_payload(tag, dec);
            }

            match tag {
                Some(tag) => dec.decode_open_type(|inner| C::decode_payload(tag, inner)),
                None => {
                    let octets = dec.decode_open_type_bytes()?;
                    log::debug!(
                        "{}: unknown additional alternative {} ({} octets)",
                        C::NAME,
                        index,
                        octets.len()
                    );
                    C::unknown_alternative(index, octets).ok_or(PerError::InvalidChoiceTag {
                        index,
                        max: C::ROOT_ALTERNATIVES.saturating_sub(1),
                    })
                }
            }
        })
    }
}
